//! Dual-cursor range selector.
//!
//! **Architecture**: the selector owns both cursors and at most one motion
//! (a single slide, or a playback sequence of slides and pauses). It does not
//! own a timer: the frame loop calls [`RangeSelector::advance`] with the
//! current time and every tick runs synchronously before the next one.
//!
//! # States
//!
//! `Idle` → `Animating` → `Idle`. Starting a motion while one is in flight
//! drops the old one (last caller wins); its hooks can never run again.
//!
//! # Ordering
//!
//! `start <= end` after every mutation. When a request would cross the edges,
//! the moving edge is clamped to the stationary one; when both edges move,
//! the end edge is applied last and wins.
//!
//! # Notifications
//!
//! `SelectionChanged` goes out through the highlight relay only when the
//! resolved (calendar day) window differs from the last one sent, so drag
//! frames and animation ticks inside a day do not flood renderers.

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use log::{debug, info, trace};

use super::cursor::{CursorStep, DayBounds, Edge, RangeCursor};
use super::date_index::{DateIndex, parse_ride_date};
use super::highlight::HighlightBroadcaster;
use super::timeline_events::HighlightOrigin;
use super::tween::Easing;

/// Initial window length, counted back from the last day
pub const DEFAULT_WINDOW_DAYS: u64 = 90;

/// Build playback defaults
pub const BUILD_DEFAULT_MS: u64 = 60_000;
/// Sliding window playback defaults
pub const SLIDING_DEFAULT_MS: u64 = 20_000;
pub const SLIDING_DEFAULT_DAYS: usize = 30;
/// Shortest allowed playback sequence
pub const MIN_SEQUENCE_MS: u64 = 2_000;
/// Intro slide and pause of both playback sequences
const INTRO_MS: u64 = 500;
const PAUSE_MS: u64 = 500;

/// Where to move one edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SlideTarget {
    /// Leave this edge where it is
    #[default]
    Keep,
    /// Day index; negative counts from the end (`-1` = last day)
    Index(i64),
    Date(NaiveDate),
}

impl SlideTarget {
    pub fn is_keep(&self) -> bool {
        matches!(self, SlideTarget::Keep)
    }
}

impl From<i64> for SlideTarget {
    fn from(index: i64) -> Self {
        SlideTarget::Index(index)
    }
}

impl From<i32> for SlideTarget {
    fn from(index: i32) -> Self {
        SlideTarget::Index(index as i64)
    }
}

impl From<NaiveDate> for SlideTarget {
    fn from(date: NaiveDate) -> Self {
        SlideTarget::Date(date)
    }
}

impl<T: Into<SlideTarget>> From<Option<T>> for SlideTarget {
    fn from(target: Option<T>) -> Self {
        target.map(Into::into).unwrap_or_default()
    }
}

impl FromStr for SlideTarget {
    type Err = String;

    /// Integer → index, `keep`/`-`/empty → keep, anything else → date.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "" | "-" | "keep" => return Ok(SlideTarget::Keep),
            _ => {}
        }
        if let Ok(index) = s.parse::<i64>() {
            return Ok(SlideTarget::Index(index));
        }
        parse_ride_date(s)
            .map(SlideTarget::Date)
            .ok_or_else(|| format!("not a day index or date: {s}"))
    }
}

type TickHook = Box<dyn FnMut(f64)>;
type CompleteHook = Box<dyn FnOnce()>;

/// Parameters of one slide. Build with [`SlideRequest::new`] and the
/// chained setters.
pub struct SlideRequest {
    pub start: SlideTarget,
    pub end: SlideTarget,
    pub duration_ms: u64,
    /// `None` uses the selector's default easing
    pub easing: Option<Easing>,
    on_complete: Option<CompleteHook>,
    on_tick: Option<TickHook>,
}

impl std::fmt::Debug for SlideRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideRequest")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("duration_ms", &self.duration_ms)
            .field("easing", &self.easing)
            .field("on_complete", &self.on_complete.is_some())
            .field("on_tick", &self.on_tick.is_some())
            .finish()
    }
}

impl SlideRequest {
    pub fn new(start: impl Into<SlideTarget>, end: impl Into<SlideTarget>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            duration_ms: 0,
            easing: None,
            on_complete: None,
            on_tick: None,
        }
    }

    pub fn duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Called once when the slide reaches its target.
    pub fn on_complete(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Called every animation frame with linear progress `t` in [0, 1].
    pub fn on_tick(mut self, f: impl FnMut(f64) + 'static) -> Self {
        self.on_tick = Some(Box::new(f));
        self
    }
}

/// Identifies one motion; compare with [`RangeSelector::current_motion`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MotionId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorState {
    Idle,
    Animating,
}

enum MotionStep {
    Slide(SlideRequest),
    Pause { duration_ms: u64 },
}

enum ActiveStep {
    Slide {
        on_tick: Option<TickHook>,
        on_complete: Option<CompleteHook>,
    },
    Pause {
        duration_ms: u64,
        started_at: Option<f64>,
    },
}

struct Motion {
    id: MotionId,
    label: &'static str,
    pending: VecDeque<MotionStep>,
    active: Option<ActiveStep>,
}

pub struct RangeSelector {
    index: Arc<DateIndex>,
    highlights: HighlightBroadcaster,
    start: RangeCursor,
    end: RangeCursor,
    default_easing: Easing,
    last_notified: Option<(NaiveDate, NaiveDate)>,
    motion: Option<Motion>,
    next_motion_id: u64,
}

impl std::fmt::Debug for RangeSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeSelector")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("last_notified", &self.last_notified)
            .field("motion", &self.motion.as_ref().map(|m| (m.id, m.label)))
            .finish()
    }
}

impl RangeSelector {
    /// Selector showing the last [`DEFAULT_WINDOW_DAYS`] days.
    pub fn new(index: Arc<DateIndex>, highlights: HighlightBroadcaster) -> Self {
        Self::with_window(index, highlights, DEFAULT_WINDOW_DAYS)
    }

    /// Selector showing the last `window_days` days (clamped to the first
    /// day). Sends the initial `SelectionChanged`.
    pub fn with_window(
        index: Arc<DateIndex>,
        highlights: HighlightBroadcaster,
        window_days: u64,
    ) -> Self {
        let bounds = DayBounds::of(&index);
        let last_day = index.last_day();
        let window_start = last_day
            .checked_sub_days(Days::new(window_days))
            .unwrap_or(last_day);
        let start = RangeCursor::new(Edge::Start, bounds, bounds.position_of(window_start));
        let end = RangeCursor::new(Edge::End, bounds, bounds.last_index() as f64);

        let mut selector = Self {
            index,
            highlights,
            start,
            end,
            default_easing: Easing::default(),
            last_notified: None,
            motion: None,
            next_motion_id: 1,
        };
        info!(
            "RangeSelector initialized: {} .. {}",
            selector.start.resolved_value(),
            selector.end.resolved_value()
        );
        selector.update_selection();
        selector
    }

    pub fn set_default_easing(&mut self, easing: Easing) {
        self.default_easing = easing;
    }

    pub fn default_easing(&self) -> Easing {
        self.default_easing
    }

    // === Read access ===

    pub fn index(&self) -> &DateIndex {
        &self.index
    }

    pub fn start(&self) -> &RangeCursor {
        &self.start
    }

    pub fn end(&self) -> &RangeCursor {
        &self.end
    }

    pub fn state(&self) -> SelectorState {
        if self.motion.is_some() {
            SelectorState::Animating
        } else {
            SelectorState::Idle
        }
    }

    pub fn is_animating(&self) -> bool {
        self.motion.is_some()
    }

    pub fn current_motion(&self) -> Option<MotionId> {
        self.motion.as_ref().map(|m| m.id)
    }

    /// Resolved window as calendar days.
    pub fn selected_range(&self) -> (NaiveDate, NaiveDate) {
        (self.start.resolved_value(), self.end.resolved_value())
    }

    /// Resolved window as day indices, equal to `DateIndex::day_index` of
    /// each edge's resolved date.
    pub fn selected_day_indices(&self) -> (usize, usize) {
        (self.start.resolved_index(), self.end.resolved_index())
    }

    /// Rides of every day in the window (the map's active set).
    pub fn selected_rides(&self) -> Vec<&str> {
        let (start, end) = self.selected_day_indices();
        self.index.rides_between(start, end)
    }

    /// Register a settle listener on one edge.
    pub fn on_settled<F>(&mut self, edge: Edge, callback: F)
    where
        F: FnMut(NaiveDate) + 'static,
    {
        match edge {
            Edge::Start => self.start.on_settled(callback),
            Edge::End => self.end.on_settled(callback),
        }
    }

    // === Notification ===

    /// Send `SelectionChanged` if the resolved window moved since the last
    /// one. Returns true if an event went out.
    pub fn update_selection(&mut self) -> bool {
        let current = self.selected_range();
        if self.last_notified == Some(current) {
            return false;
        }
        self.last_notified = Some(current);
        self.highlights.selection_changed(current.0, current.1);
        true
    }

    // === Direct manipulation ===

    /// Drag the start handle; it stops at the end handle.
    pub fn drag_start(&mut self, position: f64) {
        self.cancel();
        let position = position.min(self.end.position());
        self.start.set_immediate(position);
        self.update_selection();
    }

    /// Drag the end handle; it stops at the start handle.
    pub fn drag_end(&mut self, position: f64) {
        self.cancel();
        let position = position.max(self.start.position());
        self.end.set_immediate(position);
        self.update_selection();
    }

    /// Drag the whole window by `delta` days, keeping its width. The window
    /// stops at the timeline bounds.
    pub fn drag_window(&mut self, delta: f64) {
        self.cancel();
        let width = self.end.position() - self.start.position();
        let max_start = (self.index.last_index() as f64 - width).max(0.0);
        let new_start = (self.start.position() + delta).clamp(0.0, max_start);
        self.start.set_immediate(new_start);
        self.end.set_immediate(new_start + width);
        self.update_selection();
    }

    /// Stop the current motion where it is. Cursors do not settle.
    pub fn cancel(&mut self) -> Option<MotionId> {
        let motion = self.motion.take()?;
        self.start.cancel();
        self.end.cancel();
        debug!("Motion {:?} ({}) cancelled", motion.id, motion.label);
        Some(motion.id)
    }

    // === Slides ===

    /// Move the window. Zero duration applies synchronously: one
    /// `SelectionChanged` (if anything moved) and `on_complete` before
    /// returning. Otherwise the slide starts on the next [`Self::advance`].
    pub fn slide_to(&mut self, request: SlideRequest) -> MotionId {
        if request.duration_ms == 0 {
            self.cancel();
            let id = self.allocate_motion_id();
            let (start, end) = self.resolve_targets(request.start, request.end);
            debug!("Slide {:?} instant: {:.2} .. {:.2}", id, start, end);
            self.start.set_immediate(start);
            self.end.set_immediate(end);
            self.update_selection();
            if let Some(done) = request.on_complete {
                done();
            }
            return id;
        }
        self.start_motion("slide", vec![MotionStep::Slide(request)])
    }

    /// Playback: collapse to the first day, pause, then sweep the end edge
    /// to the last day while highlighting the rides of the current day and
    /// the `trailing_days` before it.
    ///
    /// `total_ms` of 0 means [`BUILD_DEFAULT_MS`]; shorter than
    /// [`MIN_SEQUENCE_MS`] is raised to it.
    pub fn build_animation(&mut self, total_ms: u64, trailing_days: usize) -> MotionId {
        let total_ms = sequence_duration(total_ms, BUILD_DEFAULT_MS);
        let index = Arc::clone(&self.index);
        let highlights = self.highlights.clone();
        let last_index = index.last_index();
        let mut last_day: Option<usize> = None;

        let sweep = SlideRequest::new(0, -1)
            .duration(total_ms - INTRO_MS - PAUSE_MS)
            .easing(Easing::Linear)
            .on_tick(move |t| {
                let day = (t * last_index as f64).round() as usize;
                // Only when a whole day was crossed
                if last_day == Some(day) {
                    return;
                }
                last_day = Some(day);
                highlights.set_highlight(
                    HighlightOrigin::Playback,
                    index.trailing_rides(day, trailing_days),
                );
            });

        info!(
            "Build playback: {}ms, trailing {} days over {} days",
            total_ms,
            trailing_days,
            last_index + 1
        );
        self.start_motion(
            "build",
            vec![
                MotionStep::Slide(SlideRequest::new(0, 0).duration(INTRO_MS)),
                MotionStep::Pause { duration_ms: PAUSE_MS },
                MotionStep::Slide(sweep),
            ],
        )
    }

    /// Playback: open a `window_days` window at the start, pause, then slide
    /// it at constant width to the end of the timeline.
    ///
    /// Zero arguments mean [`SLIDING_DEFAULT_DAYS`] / [`SLIDING_DEFAULT_MS`].
    pub fn sliding_window_animation(&mut self, window_days: usize, total_ms: u64) -> MotionId {
        let days = if window_days == 0 { SLIDING_DEFAULT_DAYS } else { window_days };
        // Wider than the timeline behaves like the whole timeline
        let days = days.min(self.index.len()) as i64;
        let total_ms = sequence_duration(total_ms, SLIDING_DEFAULT_MS);
        info!("Sliding window playback: {} days, {}ms", days, total_ms);
        self.start_motion(
            "sliding-window",
            vec![
                MotionStep::Slide(SlideRequest::new(0, days).duration(INTRO_MS)),
                MotionStep::Pause { duration_ms: PAUSE_MS },
                MotionStep::Slide(
                    SlideRequest::new(-(days + 1), -1)
                        .duration(total_ms - INTRO_MS - PAUSE_MS)
                        .easing(Easing::Linear),
                ),
            ],
        )
    }

    // === Frame clock ===

    /// Advance the current motion to `now_ms`. Steps that finish in this
    /// frame hand over to the next step within the same frame.
    pub fn advance(&mut self, now_ms: f64) {
        while let Some(mut motion) = self.motion.take() {
            let step_finished = self.drive(&mut motion, now_ms);
            if !step_finished {
                self.motion = Some(motion);
                return;
            }
            if motion.pending.is_empty() {
                debug!("Motion {:?} ({}) finished", motion.id, motion.label);
                return;
            }
            self.motion = Some(motion);
        }
    }

    fn drive(&mut self, motion: &mut Motion, now_ms: f64) -> bool {
        if motion.active.is_none() {
            let Some(step) = motion.pending.pop_front() else {
                return true;
            };
            motion.active = Some(self.activate(step));
        }

        let finished = match motion.active.as_mut() {
            None => true,
            Some(ActiveStep::Pause { duration_ms, started_at }) => {
                let started = *started_at.get_or_insert(now_ms);
                now_ms - started >= *duration_ms as f64
            }
            Some(ActiveStep::Slide { on_tick, on_complete }) => {
                let step_start = self.start.advance(now_ms);
                let step_end = self.end.advance(now_ms);
                let progress = tick_progress(step_start).or(tick_progress(step_end));
                let done = !self.start.is_animating() && !self.end.is_animating();
                if progress.is_some() {
                    self.enforce_order();
                    self.update_selection();
                }
                if let (Some(t), Some(hook)) = (progress, on_tick.as_mut()) {
                    trace!("Motion {:?} tick t={:.3}", motion.id, t);
                    hook(t);
                }
                if done && let Some(hook) = on_complete.take() {
                    hook();
                }
                done
            }
        };

        if finished {
            motion.active = None;
        }
        finished
    }

    fn activate(&mut self, step: MotionStep) -> ActiveStep {
        match step {
            MotionStep::Pause { duration_ms } => ActiveStep::Pause {
                duration_ms,
                started_at: None,
            },
            MotionStep::Slide(request) => {
                let (start, end) = self.resolve_targets(request.start, request.end);
                let easing = request.easing.unwrap_or(self.default_easing);
                debug!(
                    "Slide to {:.2} .. {:.2} over {}ms ({})",
                    start, end, request.duration_ms, easing
                );
                self.start.animate_to(start, request.duration_ms, easing);
                self.end.animate_to(end, request.duration_ms, easing);
                ActiveStep::Slide {
                    on_tick: request.on_tick,
                    on_complete: request.on_complete,
                }
            }
        }
    }

    fn start_motion(&mut self, label: &'static str, steps: Vec<MotionStep>) -> MotionId {
        if let Some(previous) = self.cancel() {
            debug!("Motion {:?} superseded by {}", previous, label);
        }
        let id = self.allocate_motion_id();
        self.motion = Some(Motion {
            id,
            label,
            pending: steps.into(),
            active: None,
        });
        id
    }

    fn allocate_motion_id(&mut self) -> MotionId {
        let id = MotionId(self.next_motion_id);
        self.next_motion_id += 1;
        id
    }

    /// Resolve both targets to clamped positions and apply the ordering
    /// policy.
    fn resolve_targets(&self, start: SlideTarget, end: SlideTarget) -> (f64, f64) {
        let s = self.resolve(start).unwrap_or(self.start.position());
        let e = self.resolve(end).unwrap_or(self.end.position());
        match (start.is_keep(), end.is_keep()) {
            // Only start moves: clamp it to end
            (false, true) => (s.min(e), e),
            // Only end moves: clamp it to start
            (true, false) => (s, e.max(s)),
            // Both move: end applied last, wins
            _ if s > e => (e, e),
            _ => (s, e),
        }
    }

    fn resolve(&self, target: SlideTarget) -> Option<f64> {
        match target {
            SlideTarget::Keep => None,
            SlideTarget::Index(i) => Some(self.index.resolve_index(i) as f64),
            SlideTarget::Date(date) => Some(self.start.bounds().position_of(date)),
        }
    }

    fn enforce_order(&mut self) {
        if self.start.position() > self.end.position() {
            self.start.constrain(self.end.position());
        }
    }
}

fn tick_progress(step: CursorStep) -> Option<f64> {
    match step {
        CursorStep::Moved { t } | CursorStep::Settled { t } => Some(t),
        CursorStep::Idle => None,
    }
}

fn sequence_duration(total_ms: u64, default_ms: u64) -> u64 {
    let total_ms = if total_ms == 0 { default_ms } else { total_ms };
    total_ms.max(MIN_SEQUENCE_MS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::date_index::RideRecord;
    use crate::core::event_bus::{EventBus, downcast_event};
    use crate::core::timeline_events::{HighlightSetEvent, SelectionChangedEvent};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(name: &str, date: &str, length: f64) -> RideRecord {
        RideRecord {
            name: name.into(),
            date: date.into(),
            length,
        }
    }

    fn selector_for(records: Vec<RideRecord>) -> (EventBus, RangeSelector) {
        let index = Arc::new(DateIndex::from_records(records).unwrap());
        let bus = EventBus::new();
        let highlights = HighlightBroadcaster::new(Arc::clone(&index), bus.emitter());
        let selector = RangeSelector::new(index, highlights);
        (bus, selector)
    }

    /// r1 on 2024-01-01, r2 on 2024-01-03
    fn three_days() -> (EventBus, RangeSelector) {
        selector_for(vec![
            record("r1", "2024-01-01", 10.0),
            record("r2", "2024-01-03", 5.0),
        ])
    }

    /// One ride per day for `days` days starting 2024-01-01
    fn daily(days: u64) -> (EventBus, RangeSelector) {
        let start = day("2024-01-01");
        let records = (0..days)
            .map(|i| record(&format!("d{i}"), &(start + Days::new(i)).to_string(), 1.0))
            .collect();
        selector_for(records)
    }

    fn selections(bus: &EventBus) -> Vec<SelectionChangedEvent> {
        bus.poll()
            .iter()
            .filter_map(|e| downcast_event::<SelectionChangedEvent>(e).cloned())
            .collect()
    }

    fn assert_ordered(selector: &RangeSelector) {
        assert!(selector.start().position() <= selector.end().position());
        assert!(selector.start().resolved_value() <= selector.end().resolved_value());
    }

    #[test]
    fn test_initial_window_is_last_90_days() {
        let (bus, selector) = daily(200);
        assert_eq!(selector.selected_day_indices(), (109, 199));
        assert_eq!(selections(&bus).len(), 1);

        // Shorter timeline: clamped to the first day
        let (_bus, selector) = three_days();
        assert_eq!(selector.selected_range(), (day("2024-01-01"), day("2024-01-03")));
    }

    #[test]
    fn test_instant_slide_to_last_day() {
        let (bus, mut selector) = three_days();
        bus.poll();

        selector.slide_to(SlideRequest::new(-1, -1));
        assert_eq!(selector.selected_range(), (day("2024-01-03"), day("2024-01-03")));
        assert_eq!(selector.state(), SelectorState::Idle);
        assert_eq!(
            selections(&bus),
            vec![SelectionChangedEvent { start: day("2024-01-03"), end: day("2024-01-03") }]
        );
    }

    #[test]
    fn test_update_selection_debounces() {
        let (bus, mut selector) = three_days();
        bus.poll();
        selector.drag_start(1.0);
        assert!(!selector.update_selection());
        assert!(!selector.update_selection());
        assert_eq!(selections(&bus).len(), 1);

        // Moving within the same day is not a change
        selector.drag_start(1.5);
        assert!(selections(&bus).is_empty());
    }

    #[test]
    fn test_animated_slide_clamps_and_completes_once() {
        let (_bus, mut selector) = three_days();
        let completed = Rc::new(RefCell::new(0));
        let ticks = Rc::new(RefCell::new(Vec::new()));
        let c = Rc::clone(&completed);
        let t = Rc::clone(&ticks);

        selector.slide_to(
            SlideRequest::new(0, 10)
                .duration(500)
                .easing(Easing::Linear)
                .on_complete(move || *c.borrow_mut() += 1)
                .on_tick(move |p| t.borrow_mut().push(p)),
        );
        assert_eq!(selector.state(), SelectorState::Animating);
        assert_eq!(selector.end().target(), None);

        let mut now = 1000.0;
        while now <= 1600.0 {
            selector.advance(now);
            now += 16.0;
        }

        assert_eq!(*completed.borrow(), 1);
        assert_eq!(selector.selected_day_indices(), (0, 2));
        assert_eq!(selector.state(), SelectorState::Idle);

        let ticks = ticks.borrow();
        assert_eq!(ticks.first(), Some(&0.0));
        assert_eq!(ticks.last(), Some(&1.0));
        assert!(ticks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_new_slide_cancels_running_one() {
        let (_bus, mut selector) = daily(30);
        let a_ticks = Rc::new(RefCell::new(0));
        let a_done = Rc::new(RefCell::new(false));
        let b_ticks = Rc::new(RefCell::new(Vec::new()));
        let b_done = Rc::new(RefCell::new(0));

        let (at, ad) = (Rc::clone(&a_ticks), Rc::clone(&a_done));
        let a = selector.slide_to(
            SlideRequest::new(0, 5)
                .duration(1000)
                .on_tick(move |_| *at.borrow_mut() += 1)
                .on_complete(move || *ad.borrow_mut() = true),
        );
        selector.advance(0.0);
        selector.advance(100.0);
        let a_before = *a_ticks.borrow();
        assert_eq!(selector.current_motion(), Some(a));

        let (bt, bd) = (Rc::clone(&b_ticks), Rc::clone(&b_done));
        let b = selector.slide_to(
            SlideRequest::new(10, 20)
                .duration(300)
                .on_tick(move |p| bt.borrow_mut().push(p))
                .on_complete(move || *bd.borrow_mut() += 1),
        );
        assert_ne!(a, b);
        for now in [100.0, 200.0, 300.0, 400.0, 500.0, 1200.0, 2000.0] {
            selector.advance(now);
        }

        assert_eq!(*a_ticks.borrow(), a_before);
        assert!(!*a_done.borrow());
        assert_eq!(*b_done.borrow(), 1);
        assert_eq!(b_ticks.borrow().first(), Some(&0.0));
        assert_eq!(b_ticks.borrow().last(), Some(&1.0));
        assert_eq!(selector.selected_day_indices(), (10, 20));
    }

    #[test]
    fn test_ordering_policy() {
        let (_bus, mut selector) = daily(20);
        selector.slide_to(SlideRequest::new(5, 10));

        // Only start moves past end: clamped to end
        selector.slide_to(SlideRequest::new(15, SlideTarget::Keep));
        assert_eq!(selector.selected_day_indices(), (10, 10));

        // Only end moves before start: clamped to start
        selector.slide_to(SlideRequest::new(SlideTarget::Keep, 2));
        assert_eq!(selector.selected_day_indices(), (10, 10));

        // Both move and cross: end wins
        selector.slide_to(SlideRequest::new(12, 4));
        assert_eq!(selector.selected_day_indices(), (4, 4));

        selector.drag_end(-5.0);
        assert_ordered(&selector);
        selector.drag_start(100.0);
        assert_ordered(&selector);
        assert_eq!(selector.selected_day_indices(), (4, 4));
    }

    #[test]
    fn test_order_holds_during_animation() {
        let (_bus, mut selector) = daily(40);
        selector.slide_to(SlideRequest::new(0, 3));
        selector.slide_to(SlideRequest::new(30, 35).duration(400).easing(Easing::CubicInOut));
        let mut now = 0.0;
        while selector.is_animating() {
            selector.advance(now);
            assert_ordered(&selector);
            now += 7.0;
        }
        assert_eq!(selector.selected_day_indices(), (30, 35));
    }

    #[test]
    fn test_date_targets_clamp() {
        let (_bus, mut selector) = three_days();
        selector.slide_to(SlideRequest::new(day("2020-01-01"), day("2030-01-01")));
        assert_eq!(selector.selected_day_indices(), (0, 2));
        selector.slide_to(SlideRequest::new(
            SlideTarget::from_str("2024-01-02").unwrap(),
            SlideTarget::from_str("-1").unwrap(),
        ));
        assert_eq!(selector.selected_day_indices(), (1, 2));
        assert_eq!(SlideTarget::from_str("keep"), Ok(SlideTarget::Keep));
        assert!(SlideTarget::from_str("soon").is_err());
        assert_eq!(SlideTarget::from(None::<i64>), SlideTarget::Keep);
    }

    #[test]
    fn test_drag_window_keeps_width() {
        let (_bus, mut selector) = daily(10);
        selector.slide_to(SlideRequest::new(2, 5));
        selector.drag_window(3.0);
        assert_eq!(selector.selected_day_indices(), (5, 8));
        selector.drag_window(10.0);
        assert_eq!(selector.selected_day_indices(), (6, 9));
        selector.drag_window(-50.0);
        assert_eq!(selector.selected_day_indices(), (0, 3));
    }

    #[test]
    fn test_settled_fires_per_settle_not_per_tick() {
        let (_bus, mut selector) = daily(10);
        let settled = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&settled);
        selector.on_settled(Edge::End, move |d| s.borrow_mut().push(d));

        selector.slide_to(SlideRequest::new(SlideTarget::Keep, 4).duration(100));
        for now in [0.0, 25.0, 50.0, 75.0, 100.0, 125.0] {
            selector.advance(now);
        }
        assert_eq!(*settled.borrow(), vec![day("2024-01-05")]);
    }

    #[test]
    fn test_build_animation_sequence() {
        let (bus, mut selector) = daily(11);
        bus.poll();
        selector.build_animation(2_000, 2);

        let mut now = 0.0;
        let mut collapsed_at_pause = false;
        while selector.is_animating() {
            selector.advance(now);
            if (600.0..900.0).contains(&now) {
                collapsed_at_pause = selector.selected_day_indices() == (0, 0);
            }
            now += 10.0;
        }
        assert!(collapsed_at_pause);
        assert_eq!(selector.selected_day_indices(), (0, 10));

        let highlights: Vec<HighlightSetEvent> = bus
            .poll()
            .iter()
            .filter_map(|e| downcast_event::<HighlightSetEvent>(e).cloned())
            .collect();
        // One broadcast per day, each with the trailing window
        assert_eq!(highlights.len(), 11);
        assert!(highlights.iter().all(|h| h.origin == HighlightOrigin::Playback));
        assert_eq!(highlights[0].ride_names.len(), 1);
        let last: Vec<&str> = highlights[10].ride_names.iter().map(String::as_str).collect();
        assert_eq!(last, vec!["d8", "d9", "d10"]);
    }

    #[test]
    fn test_sliding_window_animation() {
        let (_bus, mut selector) = daily(60);
        selector.sliding_window_animation(10, 1_000);

        let mut now = 0.0;
        let mut widths = Vec::new();
        while selector.is_animating() {
            selector.advance(now);
            if now >= 1_000.0 {
                let (s, e) = selector.selected_day_indices();
                widths.push(e - s);
            }
            now += 16.0;
        }
        // Raised to the minimum sequence length, then slid at constant width
        assert_eq!(selector.selected_day_indices(), (49, 59));
        assert!(now >= MIN_SEQUENCE_MS as f64);
        assert!(widths.iter().all(|w| (9..=11).contains(w)));
    }

    #[test]
    fn test_sliding_window_wider_than_timeline() {
        let (_bus, mut selector) = daily(8);
        selector.sliding_window_animation(usize::MAX, 2_000);
        let mut now = 0.0;
        while selector.is_animating() {
            selector.advance(now);
            assert_ordered(&selector);
            now += 16.0;
        }
        assert_eq!(selector.selected_day_indices(), (0, 7));
    }

    #[test]
    fn test_slide_cancels_playback() {
        let (bus, mut selector) = daily(20);
        selector.build_animation(0, 3);
        for now in [0.0, 500.0, 1000.0, 1200.0, 5000.0] {
            selector.advance(now);
        }
        assert!(selector.is_animating());

        selector.slide_to(SlideRequest::new(3, 4));
        bus.poll();
        assert_eq!(selector.state(), SelectorState::Idle);
        for now in [6000.0, 30000.0, 70000.0] {
            selector.advance(now);
        }
        assert!(bus.poll().is_empty());
        assert_eq!(selector.selected_day_indices(), (3, 4));
    }
}
