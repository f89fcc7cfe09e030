use super::model::{Dataset, Purpose, Record, TransportMode};

// ---------------------------------------------------------------------------
// Filter criteria: an optional exact value per facet
// ---------------------------------------------------------------------------

/// Partial record of facet values. A `None` field does not constrain the
/// result; every `Some` field must match exactly. Present fields combine
/// with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub year: Option<i32>,
    pub region: Option<String>,
    pub market: Option<String>,
    pub mode: Option<TransportMode>,
    pub purpose: Option<Purpose>,
}

impl Criteria {
    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }

    pub fn mode(mut self, mode: TransportMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn purpose(mut self, purpose: Purpose) -> Self {
        self.purpose = Some(purpose);
        self
    }

    /// Whether `record` satisfies every present criterion.
    pub fn matches(&self, record: &Record) -> bool {
        self.year.is_none_or(|y| record.year == y)
            && self.region.as_deref().is_none_or(|r| record.region == r)
            && self.market.as_deref().is_none_or(|m| record.market == m)
            && self.mode.is_none_or(|m| record.mode == m)
            && self.purpose.is_none_or(|p| record.purpose == p)
    }
}

/// Return indices of rows that pass all present criteria, in dataset order.
pub fn filtered_indices(dataset: &Dataset, criteria: &Criteria) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Return the rows that pass all present criteria, in dataset order.
/// An empty result is a valid answer, not an error.
pub fn filter<'a>(dataset: &'a Dataset, criteria: &Criteria) -> Vec<&'a Record> {
    filtered_indices(dataset, criteria)
        .into_iter()
        .map(|i| &dataset.records[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{record, sample_dataset};

    #[test]
    fn empty_criteria_returns_everything_in_order() {
        let ds = sample_dataset();
        let all = filter(&ds, &Criteria::default());
        assert_eq!(all.len(), ds.len());
        assert!(all.iter().zip(&ds.records).all(|(a, b)| std::ptr::eq(*a, b)));
        assert_eq!(
            filtered_indices(&ds, &Criteria::default()),
            (0..ds.len()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn every_result_matches_every_present_field() {
        let ds = sample_dataset();
        let grid = [
            Criteria::default().year(2016),
            Criteria::default().mode(TransportMode::Sea),
            Criteria::default().purpose(Purpose::Business).market("France"),
            Criteria::default().region("Western Europe").year(2017),
            Criteria::default()
                .year(2016)
                .mode(TransportMode::Air)
                .purpose(Purpose::Holiday)
                .market("Germany"),
        ];
        for criteria in &grid {
            let hits = filtered_indices(&ds, criteria);
            for (i, rec) in ds.records.iter().enumerate() {
                assert_eq!(hits.contains(&i), criteria.matches(rec), "{criteria:?} row {i}");
            }
            for rec in filter(&ds, criteria) {
                assert!(criteria.year.is_none_or(|y| rec.year == y));
                assert!(criteria.mode.is_none_or(|m| rec.mode == m));
                assert!(criteria.purpose.is_none_or(|p| rec.purpose == p));
                assert!(criteria.market.as_deref().is_none_or(|m| rec.market == m));
                assert!(criteria.region.as_deref().is_none_or(|r| rec.region == r));
            }
        }
    }

    #[test]
    fn filters_compose() {
        let ds = sample_dataset();
        let both = filter(&ds, &Criteria::default().mode(TransportMode::Air).purpose(Purpose::Holiday));
        let air = filter(&ds, &Criteria::default().mode(TransportMode::Air));
        assert!(both.len() < air.len());
        assert!(both.iter().all(|r| r.mode == TransportMode::Air && r.purpose == Purpose::Holiday));
    }

    #[test]
    fn absent_tuple_yields_empty_subset() {
        let ds = sample_dataset();
        let none = filter(
            &ds,
            &Criteria::default()
                .year(1999)
                .mode(TransportMode::Tunnel)
                .purpose(Purpose::Vfr)
                .market("Atlantis"),
        );
        assert!(none.is_empty());
    }

    #[test]
    fn duplicate_rows_are_all_returned() {
        let ds = Dataset::from_records(vec![record("France", 2016), record("France", 2016)]);
        assert_eq!(filter(&ds, &Criteria::default().market("France")).len(), 2);
    }

    #[test]
    fn matching_is_exact() {
        let ds = Dataset::from_records(vec![record("France", 2016)]);
        assert!(filter(&ds, &Criteria::default().market("france")).is_empty());
        assert!(filter(&ds, &Criteria::default().market("Fran")).is_empty());
    }
}
