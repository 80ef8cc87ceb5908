//! One movable edge of the selection window.
//!
//! Position is a fractional day offset from the anchor day, clamped to
//! `[0, N-1]`. The resolved value is the calendar day the position falls on
//! (`anchor + floor(position)`), so two cursors that resolve to the same day
//! compare equal whatever path they took.
//!
//! Cursors are owned by [`RangeSelector`](super::selector::RangeSelector),
//! which is the only code allowed to move them.

use chrono::{Days, NaiveDate};
use log::trace;

use super::date_index::DateIndex;
use super::tween::{Easing, Tween};

/// Which edge of the window a cursor represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    Start,
    End,
}

/// Index bounds of a timeline, copied out of the [`DateIndex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayBounds {
    anchor: NaiveDate,
    last_index: usize,
}

impl DayBounds {
    pub fn of(index: &DateIndex) -> Self {
        Self {
            anchor: index.first_day(),
            last_index: index.last_index(),
        }
    }

    pub fn last_index(&self) -> usize {
        self.last_index
    }

    pub fn clamp(&self, position: f64) -> f64 {
        if position.is_nan() {
            return 0.0;
        }
        position.clamp(0.0, self.last_index as f64)
    }

    /// Position of a date, clamped into the timeline.
    pub fn position_of(&self, date: NaiveDate) -> f64 {
        let offset = (date - self.anchor).num_days() as f64;
        self.clamp(offset)
    }

    pub fn index_of(&self, position: f64) -> usize {
        (self.clamp(position).floor() as usize).min(self.last_index)
    }

    pub fn date_of(&self, position: f64) -> NaiveDate {
        self.anchor + Days::new(self.index_of(position) as u64)
    }
}

/// Result of advancing a cursor by one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CursorStep {
    /// No tick this frame (no tween, or time did not advance).
    Idle,
    Moved { t: f64 },
    Settled { t: f64 },
}

type SettledCallback = Box<dyn FnMut(NaiveDate)>;

pub struct RangeCursor {
    edge: Edge,
    bounds: DayBounds,
    position: f64,
    tween: Option<Tween>,
    settled: Vec<SettledCallback>,
}

impl std::fmt::Debug for RangeCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeCursor")
            .field("edge", &self.edge)
            .field("position", &self.position)
            .field("resolved", &self.resolved_value())
            .field("animating", &self.tween.is_some())
            .field("settled_listeners", &self.settled.len())
            .finish()
    }
}

impl PartialEq for RangeCursor {
    fn eq(&self, other: &Self) -> bool {
        self.resolved_value() == other.resolved_value()
    }
}

impl RangeCursor {
    pub fn new(edge: Edge, bounds: DayBounds, position: f64) -> Self {
        Self {
            edge,
            bounds,
            position: bounds.clamp(position),
            tween: None,
            settled: Vec::new(),
        }
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub fn bounds(&self) -> DayBounds {
        self.bounds
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn resolved_index(&self) -> usize {
        self.bounds.index_of(self.position)
    }

    pub fn resolved_value(&self) -> NaiveDate {
        self.bounds.date_of(self.position)
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Target of the running tween, if any.
    pub fn target(&self) -> Option<f64> {
        self.tween.as_ref().map(Tween::to)
    }

    /// Jump to `position` (clamped). Cancels a running tween and settles.
    pub fn set_immediate(&mut self, position: f64) {
        self.tween = None;
        self.position = self.bounds.clamp(position);
        self.notify_settled();
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.set_immediate(self.bounds.position_of(date));
    }

    /// Start a tween from the current position. Replaces a running one.
    pub fn animate_to(&mut self, target: f64, duration_ms: u64, easing: Easing) {
        let target = self.bounds.clamp(target);
        trace!(
            "{:?} cursor: animate {:.3} -> {:.3} over {}ms ({})",
            self.edge, self.position, target, duration_ms, easing
        );
        self.tween = Some(Tween::new(self.position, target, duration_ms, easing));
    }

    /// Drop the running tween without settling. Returns true if one was running.
    pub fn cancel(&mut self) -> bool {
        self.tween.take().is_some()
    }

    /// Sample the running tween at `now_ms`.
    pub fn advance(&mut self, now_ms: f64) -> CursorStep {
        let Some(tween) = self.tween.as_mut() else {
            return CursorStep::Idle;
        };
        let Some(tick) = tween.sample(now_ms) else {
            return CursorStep::Idle;
        };
        self.position = self.bounds.clamp(tick.value);
        if tick.done {
            self.tween = None;
            self.notify_settled();
            CursorStep::Settled { t: tick.t }
        } else {
            CursorStep::Moved { t: tick.t }
        }
    }

    /// Register a listener called once per settle (tween end or
    /// `set_immediate`), never on intermediate ticks.
    pub fn on_settled<F>(&mut self, callback: F)
    where
        F: FnMut(NaiveDate) + 'static,
    {
        self.settled.push(Box::new(callback));
    }

    /// Move without settling or cancelling; used for ordering clamps.
    pub(crate) fn constrain(&mut self, position: f64) {
        self.position = self.bounds.clamp(position);
    }

    fn notify_settled(&mut self) {
        let value = self.resolved_value();
        for cb in self.settled.iter_mut() {
            cb(value);
        }
    }
}
