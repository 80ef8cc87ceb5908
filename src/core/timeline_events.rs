//! Selection and highlight events exchanged with renderers.
//!
//! Plain data only: dates and ride names, no rendering payload.

use chrono::NaiveDate;
use indexmap::IndexSet;

/// Who originated a highlight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HighlightOrigin {
    /// Bar chart (hovering a day bar)
    Timeline,
    /// Map (hovering ride tracks)
    Map,
    /// Build playback trailing window
    Playback,
}

impl std::fmt::Display for HighlightOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HighlightOrigin::Timeline => f.write_str("timeline"),
            HighlightOrigin::Map => f.write_str("map"),
            HighlightOrigin::Playback => f.write_str("playback"),
        }
    }
}

// === Selection ===

/// Resolved selection window changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionChangedEvent {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Rides whose tracks the map should show as active (rate limited).
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveRidesChangedEvent {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub ride_names: Vec<String>,
}

// === Highlight ===

/// Replace the highlight set.
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightSetEvent {
    pub origin: HighlightOrigin,
    pub ride_names: IndexSet<String>,
}

/// Add to the highlight set.
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightAddEvent {
    pub origin: HighlightOrigin,
    pub ride_names: IndexSet<String>,
}

// === Renderer input ===

/// Pointer entered rides. `additive` is the shift-hover mode.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverEnterEvent {
    pub origin: HighlightOrigin,
    pub ride_names: Vec<String>,
    pub additive: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HoverLeaveEvent {
    pub origin: HighlightOrigin,
    pub additive: bool,
}
