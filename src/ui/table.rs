use eframe::egui::{self, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::views::table::{Column, TableRow, filter_rows, sort_rows, to_csv};

/// Client-side sort order and column filters of the data table. Lives in
/// the UI only; the rendered rows stay in dataset order.
#[derive(Debug, Clone, Default)]
pub struct TableState {
    pub sort: Option<(Column, bool)>,
    /// Filter text per column, indexed like [`Column::ALL`].
    pub filters: [String; Column::ALL.len()],
}

impl TableState {
    /// Column filters with text entered.
    pub fn active_filters(&self) -> Vec<(Column, String)> {
        Column::ALL
            .into_iter()
            .zip(&self.filters)
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(column, text)| (column, text.clone()))
            .collect()
    }

    /// Filtered then sorted copy of `rows`.
    pub fn visible_rows(&self, rows: &[TableRow]) -> Vec<TableRow> {
        let mut visible = filter_rows(rows, &self.active_filters());
        if let Some((column, ascending)) = self.sort {
            sort_rows(&mut visible, column, ascending);
        }
        visible
    }

    /// Clicking a header sorts by it ascending, then descending, then
    /// clears the sort.
    pub fn cycle(&mut self, column: Column) {
        self.sort = match self.sort {
            Some((c, true)) if c == column => Some((column, false)),
            Some((c, false)) if c == column => None,
            _ => Some((column, true)),
        };
    }
}

/// Draw the hover + year filtered rows. Returns a status message when the
/// visible rows were copied to the clipboard.
pub fn data_table(ui: &mut Ui, rows: &[TableRow], state: &mut TableState) -> Option<String> {
    let mut status = None;
    let visible = state.visible_rows(rows);
    let mut clicked = None;

    ui.horizontal(|ui: &mut Ui| {
        ui.strong(format!("{} of {} rows", visible.len(), rows.len()));
        if ui.small_button("Copy as CSV").clicked() {
            status = Some(match to_csv(&visible) {
                Ok(text) => {
                    ui.ctx().copy_text(text);
                    format!("Copied {} rows", visible.len())
                }
                Err(e) => {
                    log::error!("Failed to export table: {e:#}");
                    format!("Error: {e:#}")
                }
            });
        }
        if state.filters.iter().any(|f| !f.is_empty()) && ui.small_button("Clear filters").clicked() {
            state.filters = Default::default();
        }
    });

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(TableColumn::auto().at_least(70.0), Column::ALL.len())
        .min_scrolled_height(0.0)
        .header(46.0, |mut header| {
            let sort = state.sort;
            for (column, filter) in Column::ALL.into_iter().zip(state.filters.iter_mut()) {
                header.col(|ui| {
                    ui.vertical(|ui| {
                        let arrow = match sort {
                            Some((c, true)) if c == column => " ▲",
                            Some((c, false)) if c == column => " ▼",
                            _ => "",
                        };
                        if ui.button(format!("{}{arrow}", column.header())).clicked() {
                            clicked = Some(column);
                        }
                        ui.add(
                            egui::TextEdit::singleline(filter)
                                .hint_text("filter")
                                .desired_width(f32::INFINITY),
                        );
                    });
                });
            }
        })
        .body(|mut body| {
            for row in &visible {
                body.row(18.0, |mut cells| {
                    for column in Column::ALL {
                        cells.col(|ui| {
                            ui.label(row.cell(column));
                        });
                    }
                });
            }
        });

    if let Some(column) = clicked {
        state.cycle(column);
    }

    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample_dataset;

    #[test]
    fn visible_rows_filter_then_sort() {
        let ds = sample_dataset();
        let rows: Vec<TableRow> = ds.records.iter().map(TableRow::from).collect();
        let mut state = TableState::default();
        state.filters[Column::ALL.iter().position(|c| *c == Column::Market).unwrap()] =
            "france".to_string();
        state.cycle(Column::Probability);

        let visible = state.visible_rows(&rows);
        let probs: Vec<Option<f64>> = visible.iter().map(|r| r.probability).collect();
        assert_eq!(probs, vec![Some(0.08), Some(0.10), Some(0.71)]);
        assert_eq!(state.active_filters(), vec![(Column::Market, "france".to_string())]);
        assert_eq!(rows.len(), ds.len());
    }

    #[test]
    fn header_clicks_cycle_sort_order() {
        let mut state = TableState::default();
        state.cycle(Column::Probability);
        assert_eq!(state.sort, Some((Column::Probability, true)));
        state.cycle(Column::Probability);
        assert_eq!(state.sort, Some((Column::Probability, false)));
        state.cycle(Column::Probability);
        assert_eq!(state.sort, None);
        state.cycle(Column::Year);
        state.cycle(Column::Market);
        assert_eq!(state.sort, Some((Column::Market, true)));
    }
}
