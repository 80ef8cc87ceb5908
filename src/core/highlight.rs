//! Highlight relay between the timeline core and renderers.
//!
//! The selector feeds selection changes in, playback feeds trailing-window
//! highlights in, renderers feed hover events in. Everything leaves as typed
//! events on the bus; the broadcaster itself draws nothing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use indexmap::IndexSet;
use log::{debug, trace};

use super::date_index::DateIndex;
use super::event_bus::{EventBus, EventEmitter};
use super::timeline_events::{
    ActiveRidesChangedEvent, HighlightAddEvent, HighlightOrigin, HighlightSetEvent,
    HoverEnterEvent, HoverLeaveEvent, SelectionChangedEvent,
};

#[derive(Clone, Debug)]
pub struct HighlightBroadcaster {
    emitter: EventEmitter,
    index: Arc<DateIndex>,
    /// Last hover set per origin, to drop repeated identical hovers
    last_hover: Arc<Mutex<HashMap<HighlightOrigin, Vec<String>>>>,
    /// Day span last announced as the map's active set
    active_span: Arc<Mutex<Option<(usize, usize)>>>,
}

impl HighlightBroadcaster {
    pub fn new(index: Arc<DateIndex>, emitter: EventEmitter) -> Self {
        Self {
            emitter,
            index,
            last_hover: Arc::new(Mutex::new(HashMap::new())),
            active_span: Arc::new(Mutex::new(None)),
        }
    }

    pub fn index(&self) -> &DateIndex {
        &self.index
    }

    /// Route renderer hover events arriving on `bus` into highlight events.
    pub fn attach(&self, bus: &EventBus) {
        let relay = self.clone();
        bus.subscribe::<HoverEnterEvent, _>(move |e| {
            relay.hover(e.origin, e.ride_names.clone(), e.additive);
        });
        let relay = self.clone();
        bus.subscribe::<HoverLeaveEvent, _>(move |e| {
            relay.forget_hover(e.origin);
            relay.hover_leave(e.origin, e.additive);
        });
    }

    pub fn selection_changed(&self, start: NaiveDate, end: NaiveDate) {
        trace!("selection-changed {} .. {}", start, end);
        self.emitter.emit(SelectionChangedEvent { start, end });
    }

    /// Announce the rides of buckets `start..=end` as the map's active set.
    pub fn active_rides_changed(&self, start: usize, end: usize) {
        let (Some(start_date), Some(end_date)) = (self.index.date_at(start), self.index.date_at(end))
        else {
            debug!("active rides: span {}..={} outside index", start, end);
            return;
        };
        let ride_names: Vec<String> = self
            .index
            .rides_between(start, end)
            .into_iter()
            .map(str::to_string)
            .collect();
        trace!("active rides {} .. {}: {}", start_date, end_date, ride_names.len());
        *self.active_span.lock().unwrap_or_else(|e| e.into_inner()) = Some((start, end));
        self.emitter.emit(ActiveRidesChangedEvent {
            start: start_date,
            end: end_date,
            ride_names,
        });
    }

    pub fn set_highlight<I, S>(&self, origin: HighlightOrigin, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ride_names: IndexSet<String> = names.into_iter().map(Into::into).collect();
        trace!("highlight-set [{}] {} rides", origin, ride_names.len());
        self.emitter.emit(HighlightSetEvent { origin, ride_names });
    }

    pub fn add_highlight<I, S>(&self, origin: HighlightOrigin, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ride_names: IndexSet<String> = names.into_iter().map(Into::into).collect();
        trace!("highlight-add [{}] {} rides", origin, ride_names.len());
        self.emitter.emit(HighlightAddEvent { origin, ride_names });
    }

    /// Pointer entered rides. Additive (shift) hovers extend the highlight.
    pub fn hover_enter(&self, origin: HighlightOrigin, names: Vec<String>, additive: bool) {
        if additive {
            self.add_highlight(origin, names);
        } else {
            self.set_highlight(origin, names);
        }
    }

    /// Pointer left. Additive hovers keep what they accumulated.
    pub fn hover_leave(&self, origin: HighlightOrigin, additive: bool) {
        if !additive {
            self.set_highlight(origin, std::iter::empty::<String>());
        }
    }

    /// Hover update from a renderer that reports the full set under the
    /// pointer every frame. Returns false if the set did not change.
    ///
    /// Map hovers only count rides inside the active span; tracks outside
    /// the selection are drawn inactive and cannot be highlighted.
    pub fn hover(&self, origin: HighlightOrigin, names: Vec<String>, additive: bool) -> bool {
        let names = self.hoverable(origin, names);
        {
            let mut last = self.last_hover.lock().unwrap_or_else(|e| e.into_inner());
            let unchanged = match last.get(&origin) {
                Some(previous) => previous == &names,
                None => names.is_empty(),
            };
            if unchanged {
                return false;
            }
            last.insert(origin, names.clone());
        }
        if names.is_empty() {
            self.hover_leave(origin, additive);
        } else {
            self.hover_enter(origin, names, additive);
        }
        true
    }

    fn hoverable(&self, origin: HighlightOrigin, names: Vec<String>) -> Vec<String> {
        if origin != HighlightOrigin::Map {
            return names;
        }
        let span = *self.active_span.lock().unwrap_or_else(|e| e.into_inner());
        let Some((start, end)) = span else {
            trace!("map hover before any active set, ignored");
            return Vec::new();
        };
        names
            .into_iter()
            .filter(|name| {
                self.index
                    .ride_day_index(name)
                    .is_ok_and(|day| (start..=end).contains(&day))
            })
            .collect()
    }

    fn forget_hover(&self, origin: HighlightOrigin) {
        self.last_hover
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&origin);
    }

    /// Day buckets to highlight for `names`. Unknown rides are skipped.
    pub fn highlighted_days<I, S>(&self, names: I) -> Vec<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut days: Vec<usize> = names
            .into_iter()
            .filter_map(|name| match self.index.ride_day_index(name.as_ref()) {
                Ok(day) => Some(day),
                Err(e) => {
                    debug!("no bucket to highlight: {}", e);
                    None
                }
            })
            .collect();
        days.sort_unstable();
        days.dedup();
        days
    }
}
