//! Timeline engine: day index, cursors, selector, highlight relay, events.
//!
//! Independent of any renderer. A frame clock drives it through
//! [`RangeSelector::advance`](selector::RangeSelector::advance).

pub mod cursor;
pub mod date_index;
pub mod error;
pub mod event_bus;
pub mod highlight;
pub mod selector;
pub mod throttle;
pub mod timeline_events;
pub mod tween;

// Re-exports for convenience
pub use cursor::{Edge, RangeCursor};
pub use date_index::{DateIndex, DayBucket, Ride, RideRecord};
pub use error::TimelineError;
pub use event_bus::EventBus;
pub use highlight::HighlightBroadcaster;
pub use selector::{RangeSelector, SelectorState, SlideRequest, SlideTarget};
pub use throttle::RangeThrottle;
pub use tween::{Easing, Tween};
