//! Rate limiter for the map's active-ride recomputation.
//!
//! When the selection moves rapidly (dragging, playback), we don't want to
//! recompute the map's active layer set on every frame. Instead:
//! 1. The first change passes immediately and opens a quiet interval
//! 2. Changes inside the interval are held; only the latest is kept
//! 3. When the interval elapses, the held change is released and a new
//!    interval opens
//!
//! Time is supplied by the caller's frame clock, in milliseconds.

/// Inclusive day-index span of a selection.
pub type DaySpan = (usize, usize);

/// Leading + trailing edge throttle for selection spans.
///
/// # Usage
/// ```ignore
/// // On selection change:
/// if let Some(span) = throttle.offer(span, now_ms) {
///     show_active(span);
/// }
///
/// // In frame loop:
/// if let Some(span) = throttle.tick(now_ms) {
///     show_active(span);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RangeThrottle {
    interval_ms: f64,
    /// End of the current quiet interval
    window_end: Option<f64>,
    /// Latest span offered inside the interval
    pending: Option<DaySpan>,
}

impl Default for RangeThrottle {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RangeThrottle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms as f64,
            window_end: None,
            pending: None,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms as u64
    }

    /// Offer a new span. Returns it if it may be applied now, otherwise holds it.
    pub fn offer(&mut self, span: DaySpan, now_ms: f64) -> Option<DaySpan> {
        if let Some(end) = self.window_end
            && now_ms < end
        {
            log::trace!("RangeThrottle: holding {:?} until {:.0}ms", span, end);
            self.pending = Some(span);
            return None;
        }
        self.window_end = Some(now_ms + self.interval_ms);
        self.pending = None;
        Some(span)
    }

    /// Release the held span once the interval has elapsed.
    pub fn tick(&mut self, now_ms: f64) -> Option<DaySpan> {
        let end = self.window_end?;
        if now_ms < end {
            return None;
        }
        match self.pending.take() {
            Some(span) => {
                self.window_end = Some(now_ms + self.interval_ms);
                log::trace!("RangeThrottle: releasing {:?}", span);
                Some(span)
            }
            None => {
                self.window_end = None;
                None
            }
        }
    }

    /// Drop any held span
    pub fn cancel(&mut self) {
        if self.pending.is_some() {
            log::trace!("RangeThrottle: cancelled pending span");
        }
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
