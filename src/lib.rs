//! ridemap - ride timeline library
//!
//! Day-bucketed ride index, animated range selection and highlight events
//! for a bar-chart timeline and a map view.

// Core engine (index, selector, events)
pub mod core;

// App modules
pub mod cli;
pub mod config;
pub mod paths;
pub mod shell;

// Re-export commonly used types from core
pub use core::date_index::{DateIndex, RideRecord};
pub use core::event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};
pub use core::selector::{RangeSelector, SlideRequest, SlideTarget};
pub use shell::Shell;
