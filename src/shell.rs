//! Application context shared by the binary and embedders.
//!
//! Owns the day index, the selector, the highlight relay and the event bus,
//! and drives them from one frame clock. Renderers subscribe to the bus and
//! feed hover events back into it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::config::Settings;
use crate::core::date_index::{DateIndex, RideRecord};
use crate::core::event_bus::EventBus;
use crate::core::highlight::HighlightBroadcaster;
use crate::core::selector::{MotionId, RangeSelector};
use crate::core::throttle::{DaySpan, RangeThrottle};

pub struct Shell {
    pub index: Arc<DateIndex>,
    pub selector: RangeSelector,
    pub highlights: HighlightBroadcaster,
    pub event_bus: EventBus,
    pub settings: Settings,
    active_throttle: RangeThrottle,
    /// Last span handed to the throttle
    last_offered: Option<DaySpan>,
}

impl Shell {
    /// Build the context and announce the initial selection and active rides.
    pub fn new(index: DateIndex, settings: Settings) -> Self {
        let index = Arc::new(index);
        let event_bus = EventBus::new();
        let highlights = HighlightBroadcaster::new(Arc::clone(&index), event_bus.emitter());
        highlights.attach(&event_bus);

        let mut selector = RangeSelector::with_window(
            Arc::clone(&index),
            highlights.clone(),
            settings.initial_window_days,
        );
        selector.set_default_easing(settings.default_easing);

        let mut shell = Self {
            index,
            selector,
            highlights,
            event_bus,
            active_throttle: RangeThrottle::new(settings.active_throttle_ms),
            settings,
            last_offered: None,
        };
        shell.offer_active(0.0);
        shell
    }

    pub fn from_records(records: Vec<RideRecord>, settings: Settings) -> Result<Self> {
        let index = DateIndex::from_records(records).context("Failed to build day index")?;
        Ok(Self::new(index, settings))
    }

    pub fn from_file(path: &Path, settings: Settings) -> Result<Self> {
        Self::from_records(load_ride_list(path)?, settings)
    }

    /// Run one frame: advance the motion, then hand the resolved window to
    /// the active-ride throttle.
    pub fn advance(&mut self, now_ms: f64) {
        self.selector.advance(now_ms);
        self.offer_active(now_ms);
        if let Some((start, end)) = self.active_throttle.tick(now_ms) {
            self.highlights.active_rides_changed(start, end);
        }
    }

    /// Something is still moving or waiting to be announced.
    pub fn is_busy(&self) -> bool {
        self.selector.is_animating() || self.active_throttle.is_pending()
    }

    pub fn build_animation(&mut self) -> MotionId {
        let build = &self.settings.build;
        self.selector.build_animation(build.duration_ms, build.trailing_days)
    }

    pub fn sliding_window_animation(&mut self) -> MotionId {
        let window = &self.settings.sliding_window;
        self.selector
            .sliding_window_animation(window.window_days, window.duration_ms)
    }

    fn offer_active(&mut self, now_ms: f64) {
        let span = self.selector.selected_day_indices();
        if self.last_offered == Some(span) {
            return;
        }
        self.last_offered = Some(span);
        if let Some((start, end)) = self.active_throttle.offer(span, now_ms) {
            self.highlights.active_rides_changed(start, end);
        }
    }
}

/// Read a JSON ride list.
pub fn load_ride_list(path: &Path) -> Result<Vec<RideRecord>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ride list: {}", path.display()))?;
    let records: Vec<RideRecord> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse ride list: {}", path.display()))?;
    info!("Loaded {} rides from {}", records.len(), path.display());
    Ok(records)
}

/// Initialize env_logger.
///
/// Verbosity: 0 = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace.
/// With `log_file` set, logs go to that file at the chosen level; otherwise
/// to stderr, respecting `RUST_LOG`.
pub fn init_logging(verbosity: u8, log_file: Option<&PathBuf>) -> Result<()> {
    let log_level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path) = log_file {
        let file = std::fs::File::create(log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;
        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .try_init()
            .context("Logger already initialized")?;
        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        let default_level = log_level.as_str().to_ascii_lowercase();
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .try_init()
            .context("Logger already initialized")?;
        debug!("Console logging at {:?}", log_level);
    }
    Ok(())
}
