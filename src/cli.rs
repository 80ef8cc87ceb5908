use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::core::selector::SlideTarget;
use crate::core::tween::Easing;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Playback sequences selectable from the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlayMode {
    /// Collapse to the first day, then grow the window to the last day
    Build,
    /// Slide a fixed-width window from the first day to the last
    Window,
}

/// Ride timeline driver: builds the day index from a ride list and runs
/// selections and playback headlessly, printing the events a renderer
/// would receive.
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// JSON ride list: [{"name": ..., "date": ..., "length": ...}, ...]
    #[arg(value_name = "RIDES")]
    pub rides: PathBuf,

    /// Select a range: day index (negative counts from the end), date, or `keep`
    #[arg(
        long = "range",
        value_names = ["START", "END"],
        num_args = 2,
        allow_hyphen_values = true
    )]
    pub range: Option<Vec<SlideTarget>>,

    /// Animate the --range slide over this many milliseconds (0 = instant)
    #[arg(long = "slide-ms", value_name = "MS", default_value_t = 0)]
    pub slide_ms: u64,

    /// Easing for the --range slide (linear, quad-in-out, cubic-in-out, ...)
    #[arg(long = "ease", value_name = "EASING")]
    pub easing: Option<Easing>,

    /// Run a playback sequence after the range is applied
    #[arg(short = 'p', long = "play", value_enum)]
    pub play: Option<PlayMode>,

    /// Playback duration in milliseconds (overrides settings)
    #[arg(short = 'd', long = "duration", value_name = "MS")]
    pub duration_ms: Option<u64>,

    /// Days highlighted behind the current day during build playback
    #[arg(short = 't', long = "trailing", value_name = "N")]
    pub trailing_days: Option<usize>,

    /// Window width in days for window playback
    #[arg(short = 'w', long = "window-days", value_name = "N")]
    pub window_days: Option<usize>,

    /// Frame rate of the playback clock
    #[arg(long = "fps", value_name = "N")]
    pub fps: Option<u32>,

    /// Write the effective settings to ridemap.json and continue
    #[arg(long = "write-config")]
    pub write_config: bool,

    /// Enable debug logging to file (default: ridemap.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_range_and_play() {
        let args = Args::try_parse_from([
            "ridemap", "rides.json", "--range", "-30", "-1", "--play", "build", "-t", "3", "-vv",
        ])
        .unwrap();
        assert_eq!(args.rides, PathBuf::from("rides.json"));
        assert_eq!(
            args.range,
            Some(vec![SlideTarget::Index(-30), SlideTarget::Index(-1)])
        );
        assert_eq!(args.play, Some(PlayMode::Build));
        assert_eq!(args.trailing_days, Some(3));
        assert_eq!(args.verbosity, 2);
        assert!(args.log_file.is_none());
    }

    #[test]
    fn test_parse_dates_and_easing() {
        let args = Args::try_parse_from([
            "ridemap", "rides.json", "--range", "2024-01-02", "keep", "--slide-ms", "400",
            "--ease", "linear", "--log",
        ])
        .unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(args.range, Some(vec![SlideTarget::Date(date), SlideTarget::Keep]));
        assert_eq!(args.slide_ms, 400);
        assert_eq!(args.easing, Some(Easing::Linear));
        assert_eq!(args.log_file, Some(None));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Args::try_parse_from(["ridemap", "r.json", "--play", "loop"]).is_err());
        assert!(Args::try_parse_from(["ridemap", "r.json", "--ease", "bounce"]).is_err());
        assert!(Args::try_parse_from(["ridemap"]).is_err());
    }
}
