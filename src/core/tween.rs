//! Frame-driven tweening.
//!
//! A [`Tween`] interpolates a scalar from `from` to `to` over a duration. It
//! does not own a timer: the frame clock samples it with the current time in
//! milliseconds and gets back at most one tick per distinct instant. The start
//! time is latched on the first sample, so a tween created between frames
//! starts on the next frame.
//!
//! Dropping a tween cancels it; there is no other handle that could tick it.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

/// Easing curves, named after their d3 counterparts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    #[default]
    CubicInOut,
    SinInOut,
}

impl Easing {
    /// Map linear progress in [0, 1] to eased progress in [0, 1].
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                let t2 = t * 2.0;
                if t2 <= 1.0 {
                    t2 * t2 / 2.0
                } else {
                    let u = t2 - 1.0;
                    (u * (2.0 - u) + 1.0) / 2.0
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            Easing::CubicInOut => {
                let t2 = t * 2.0;
                if t2 <= 1.0 {
                    t2 * t2 * t2 / 2.0
                } else {
                    let u = t2 - 2.0;
                    (u * u * u + 2.0) / 2.0
                }
            }
            Easing::SinInOut => (1.0 - (PI * t).cos()) / 2.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::QuadIn => "quad-in",
            Easing::QuadOut => "quad-out",
            Easing::QuadInOut => "quad-in-out",
            Easing::CubicIn => "cubic-in",
            Easing::CubicOut => "cubic-out",
            Easing::CubicInOut => "cubic-in-out",
            Easing::SinInOut => "sin-in-out",
        }
    }
}

impl FromStr for Easing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Bare curve names default to the "-in" variant, as in d3.
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Easing::Linear),
            "quad" | "quad-in" => Ok(Easing::QuadIn),
            "quad-out" => Ok(Easing::QuadOut),
            "quad-in-out" => Ok(Easing::QuadInOut),
            "cubic" | "cubic-in" => Ok(Easing::CubicIn),
            "cubic-out" => Ok(Easing::CubicOut),
            "cubic-in-out" => Ok(Easing::CubicInOut),
            "sin-in-out" => Ok(Easing::SinInOut),
            other => Err(format!("unknown easing: {other}")),
        }
    }
}

impl std::fmt::Display for Easing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One animation frame: linear progress `t`, eased value, completion flag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenTick {
    pub t: f64,
    pub value: f64,
    pub done: bool,
}

#[derive(Clone, Debug)]
pub struct Tween {
    from: f64,
    to: f64,
    duration_ms: f64,
    easing: Easing,
    started_at: Option<f64>,
    last_t: Option<f64>,
    done: bool,
}

impl Tween {
    pub fn new(from: f64, to: f64, duration_ms: u64, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_ms: duration_ms as f64,
            easing,
            started_at: None,
            last_t: None,
            done: false,
        }
    }

    pub fn to(&self) -> f64 {
        self.to
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Sample at `now_ms`. Returns `None` once done, or when time has not
    /// advanced past the previous sample, so `t` is strictly increasing.
    pub fn sample(&mut self, now_ms: f64) -> Option<TweenTick> {
        if self.done {
            return None;
        }
        let start = *self.started_at.get_or_insert(now_ms);
        let t = if self.duration_ms <= 0.0 {
            1.0
        } else {
            ((now_ms - start) / self.duration_ms).clamp(0.0, 1.0)
        };
        if let Some(last) = self.last_t
            && t <= last
        {
            return None;
        }
        self.last_t = Some(t);
        self.done = t >= 1.0;
        let value = if self.done {
            self.to
        } else {
            self.from + (self.to - self.from) * self.easing.apply(t)
        };
        Some(TweenTick {
            t,
            value,
            done: self.done,
        })
    }

    /// Drive the tween with a fixed frame interval, starting at time 0.
    pub fn into_ticks(self, frame_ms: f64) -> TweenTicks {
        TweenTicks {
            tween: self,
            now_ms: 0.0,
            frame_ms: frame_ms.max(f64::EPSILON),
        }
    }
}

/// Iterator over the ticks of a tween driven at a fixed frame rate.
#[derive(Clone, Debug)]
pub struct TweenTicks {
    tween: Tween,
    now_ms: f64,
    frame_ms: f64,
}

impl Iterator for TweenTicks {
    type Item = TweenTick;

    fn next(&mut self) -> Option<TweenTick> {
        if self.tween.is_done() {
            return None;
        }
        let tick = self.tween.sample(self.now_ms);
        self.now_ms += self.frame_ms;
        tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::QuadIn,
            Easing::QuadOut,
            Easing::QuadInOut,
            Easing::CubicIn,
            Easing::CubicOut,
            Easing::CubicInOut,
            Easing::SinInOut,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-12, "{easing}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12, "{easing}");
            assert_eq!(easing.as_str().parse::<Easing>(), Ok(easing));
        }
        assert!((Easing::CubicInOut.apply(0.5) - 0.5).abs() < 1e-12);
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
    }

    #[test]
    fn test_easing_parse() {
        assert_eq!("cubic".parse::<Easing>(), Ok(Easing::CubicIn));
        assert_eq!("Linear".parse::<Easing>(), Ok(Easing::Linear));
        assert!("bounce".parse::<Easing>().is_err());
    }

    #[test]
    fn test_sample_latches_start() {
        let mut tween = Tween::new(0.0, 10.0, 100, Easing::Linear);
        let first = tween.sample(1000.0).unwrap();
        assert_eq!(first.t, 0.0);
        assert_eq!(first.value, 0.0);

        let mid = tween.sample(1050.0).unwrap();
        assert!((mid.value - 5.0).abs() < 1e-9);
        assert!(!mid.done);

        // Same instant: no tick
        assert!(tween.sample(1050.0).is_none());

        let end = tween.sample(1200.0).unwrap();
        assert_eq!(end.value, 10.0);
        assert!(end.done);
        assert!(tween.sample(1300.0).is_none());
    }

    #[test]
    fn test_zero_duration_completes_on_first_sample() {
        let mut tween = Tween::new(3.0, 7.0, 0, Easing::CubicInOut);
        let tick = tween.sample(5.0).unwrap();
        assert!(tick.done);
        assert_eq!(tick.value, 7.0);
    }

    #[test]
    fn test_ticks_monotonic() {
        let ticks: Vec<TweenTick> = Tween::new(0.0, 1.0, 500, Easing::CubicInOut)
            .into_ticks(16.0)
            .collect();
        assert_eq!(ticks.first().map(|t| t.t), Some(0.0));
        assert!(ticks.windows(2).all(|w| w[0].t < w[1].t));
        assert!(ticks.last().unwrap().done);
        assert_eq!(ticks.iter().filter(|t| t.done).count(), 1);
    }
}
