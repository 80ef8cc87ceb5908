//! Dense per-day index over a ride list.
//!
//! Index 0 is the anchor day (earliest ride), index `i` is `anchor + i` days.
//! Every day between the first and last ride gets a bucket, empty days
//! included, so renderers can address days by offset without gaps.
//!
//! The index is built once and shared read-only (`Arc<DateIndex>`) by the
//! selector, the highlight layer and renderers.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::error::{Result, TimelineError};

/// Raw ride entry as found in the ride list file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RideRecord {
    pub name: String,
    pub date: String,
    pub length: f64,
}

/// Ride with its date normalized to a calendar day.
#[derive(Clone, Debug, PartialEq)]
pub struct Ride {
    pub name: String,
    pub date: NaiveDate,
    pub length: f64,
}

impl Ride {
    pub fn new(name: impl Into<String>, date: NaiveDate, length: f64) -> Self {
        Self {
            name: name.into(),
            date,
            length,
        }
    }
}

impl TryFrom<RideRecord> for Ride {
    type Error = TimelineError;

    fn try_from(record: RideRecord) -> Result<Self> {
        let Some(date) = parse_ride_date(&record.date) else {
            return Err(TimelineError::InvalidDate {
                ride: record.name,
                value: record.date,
            });
        };
        Ok(Ride::new(record.name, date, record.length))
    }
}

/// Floor a timestamp to midnight of its calendar day.
///
/// Idempotent: flooring an already floored value returns it unchanged.
pub fn normalize_day(dt: NaiveDateTime) -> NaiveDateTime {
    dt.date().and_time(NaiveTime::MIN)
}

/// Parse a ride date string and drop the time of day.
///
/// Accepts `YYYY-MM-DD`, naive `YYYY-MM-DD[T ]HH:MM[:SS[.f]]` and RFC 3339
/// timestamps. For RFC 3339 the day is taken in the timestamp's own offset.
pub fn parse_ride_date(value: &str) -> Option<NaiveDate> {
    let s = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(normalize_day(dt.naive_local()).date());
    }
    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| normalize_day(dt).date())
}

/// One calendar day's aggregate.
#[derive(Clone, Debug, PartialEq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub total_length: f64,
    pub ride_names: Vec<String>,
}

impl DayBucket {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_length: 0.0,
            ride_names: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ride_names.is_empty()
    }
}

/// Gap-free day buckets plus the ride name -> day crosswalk.
#[derive(Clone, Debug)]
pub struct DateIndex {
    buckets: Vec<DayBucket>,
    ride_days: IndexMap<String, NaiveDate>,
    max_total_length: f64,
}

impl DateIndex {
    /// Build from already parsed rides. Input order does not matter: rides
    /// are stably sorted by day first, so same-day rides keep input order.
    pub fn build(rides: impl IntoIterator<Item = Ride>) -> Result<Self> {
        let mut rides: Vec<Ride> = rides.into_iter().collect();
        if rides.is_empty() {
            return Err(TimelineError::EmptyInput);
        }
        rides.sort_by_key(|r| r.date);

        let anchor = rides[0].date;
        let last = rides[rides.len() - 1].date;
        let span = (last - anchor).num_days() as u64 + 1;

        let mut buckets: Vec<DayBucket> = (0..span)
            .map(|i| DayBucket::empty(anchor + Days::new(i)))
            .collect();
        let mut ride_days = IndexMap::with_capacity(rides.len());

        for ride in rides {
            let idx = (ride.date - anchor).num_days() as usize;
            let bucket = &mut buckets[idx];
            bucket.total_length += ride.length;
            bucket.ride_names.push(ride.name.clone());
            if ride_days.insert(ride.name.clone(), ride.date).is_some() {
                warn!("Duplicate ride name {:?}, keeping latest date {}", ride.name, ride.date);
            }
        }

        let max_total_length = buckets
            .iter()
            .map(|b| b.total_length)
            .fold(0.0_f64, f64::max);

        info!(
            "DateIndex built: {} rides over {} days ({} .. {})",
            ride_days.len(),
            buckets.len(),
            anchor,
            last
        );

        Ok(Self {
            buckets,
            ride_days,
            max_total_length,
        })
    }

    /// Parse raw records and build. Any malformed date aborts the whole build.
    pub fn from_records(records: impl IntoIterator<Item = RideRecord>) -> Result<Self> {
        let rides = records
            .into_iter()
            .map(Ride::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::build(rides)
    }

    /// Number of day buckets (N).
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Always false for a built index; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.buckets[0].date
    }

    pub fn last_day(&self) -> NaiveDate {
        self.buckets[self.buckets.len() - 1].date
    }

    pub fn last_index(&self) -> usize {
        self.buckets.len() - 1
    }

    pub fn buckets(&self) -> &[DayBucket] {
        &self.buckets
    }

    pub fn bucket(&self, index: usize) -> Option<&DayBucket> {
        self.buckets.get(index)
    }

    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        self.buckets.get(index).map(|b| b.date)
    }

    /// Largest per-day total (y-scale domain of the bar chart).
    pub fn max_total_length(&self) -> f64 {
        self.max_total_length
    }

    pub fn ride_count(&self) -> usize {
        self.ride_days.len()
    }

    /// Days since the anchor day. Hard error outside `[first_day, last_day]`;
    /// navigation code clamps with [`Self::clamp_date`] first.
    pub fn day_index(&self, date: NaiveDate) -> Result<usize> {
        let (first, last) = (self.first_day(), self.last_day());
        if date < first || date > last {
            return Err(TimelineError::OutOfRange { date, first, last });
        }
        Ok((date - first).num_days() as usize)
    }

    pub fn ride_date(&self, name: &str) -> Result<NaiveDate> {
        self.ride_days
            .get(name)
            .copied()
            .ok_or_else(|| TimelineError::UnknownRide(name.to_string()))
    }

    pub fn ride_day_index(&self, name: &str) -> Result<usize> {
        self.day_index(self.ride_date(name)?)
    }

    pub fn clamp_date(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.first_day(), self.last_day())
    }

    /// Resolve a slice-style index: negatives count from the end (`-1` is the
    /// last day). Out-of-range values clamp to the nearest end.
    pub fn resolve_index(&self, index: i64) -> usize {
        let len = self.buckets.len() as i64;
        let idx = if index >= 0 {
            index.min(len - 1)
        } else {
            (len + index).max(0)
        };
        idx as usize
    }

    /// Ride names of every bucket in `start..=end` (clamped to the index).
    pub fn rides_between(&self, start: usize, end: usize) -> Vec<&str> {
        let end = end.min(self.last_index());
        if start > end {
            return Vec::new();
        }
        self.buckets[start..=end]
            .iter()
            .flat_map(|b| b.ride_names.iter().map(String::as_str))
            .collect()
    }

    /// Rides of day `index` and the `trailing_days` days before it.
    pub fn trailing_rides(&self, index: usize, trailing_days: usize) -> Vec<&str> {
        self.rides_between(index.saturating_sub(trailing_days), index)
    }
}
