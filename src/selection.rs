use crate::data::model::{Dataset, Purpose, TransportMode};
use crate::regions::MapStyle;

/// A single widget interaction: the control that changed and its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    MapStyle(MapStyle),
    Region(String),
    Year(i32),
    Mode(TransportMode),
    Purpose(Purpose),
    /// The pointer moved onto a map marker carrying this market.
    MapHover(String),
}

/// Current values of every control, as one immutable value.
///
/// Renderers receive a `&Selection`; nothing else carries UI state. A new
/// value is produced for each event with [`Selection::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub map_style: MapStyle,
    pub region: String,
    pub year: i32,
    pub mode: TransportMode,
    pub purpose: Purpose,
    /// Market of the last hovered marker; `None` until the first hover.
    pub hovered: Option<String>,
}

impl Selection {
    pub fn new(
        map_style: MapStyle,
        region: impl Into<String>,
        year: i32,
        mode: TransportMode,
        purpose: Purpose,
    ) -> Self {
        Selection {
            map_style,
            region: region.into(),
            year,
            mode,
            purpose,
            hovered: None,
        }
    }

    /// The selection after `event`. Only the field named by the event
    /// changes.
    pub fn apply(&self, event: &ControlEvent) -> Selection {
        let mut next = self.clone();
        match event {
            ControlEvent::MapStyle(style) => next.map_style = *style,
            ControlEvent::Region(region) => next.region = region.clone(),
            ControlEvent::Year(year) => next.year = *year,
            ControlEvent::Mode(mode) => next.mode = *mode,
            ControlEvent::Purpose(purpose) => next.purpose = *purpose,
            ControlEvent::MapHover(market) => next.hovered = Some(market.clone()),
        }
        next
    }

    /// Market the hover-linked views follow: the last hovered one, or the
    /// dataset's first row before any hover. `None` only for an empty
    /// dataset.
    pub fn hover_identity<'a>(&'a self, dataset: &'a Dataset) -> Option<&'a str> {
        self.hovered.as_deref().or_else(|| dataset.default_market())
    }
}
