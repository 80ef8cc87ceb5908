use ridemap::cli::{Args, PlayMode};
use ridemap::config::Settings;
use ridemap::core::event_bus::{BoxedEvent, downcast_event};
use ridemap::core::selector::SlideRequest;
use ridemap::core::timeline_events::{
    ActiveRidesChangedEvent, HighlightSetEvent, SelectionChangedEvent,
};
use ridemap::paths::{self, PathConfig};
use ridemap::shell::{self, Shell};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    let args = Args::parse();

    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());

    let log_path = args.log_file.as_ref().map(|opt| {
        opt.clone()
            .unwrap_or_else(|| paths::data_file(paths::LOG_FILE, &path_config))
    });
    if log_path.is_some()
        && let Err(e) = paths::ensure_dirs(&path_config)
    {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }
    shell::init_logging(args.verbosity, log_path.as_ref())?;

    info!("ridemap starting...");
    debug!("Command-line args: {:?}", args);
    info!(
        "Config path: {}",
        paths::config_file(paths::SETTINGS_FILE, &path_config).display()
    );

    let mut settings = Settings::load_default(&path_config)?;
    apply_overrides(&mut settings, &args);
    if args.write_config {
        settings.save_default(&path_config)?;
    }

    let mut shell = Shell::from_file(&args.rides, settings)
        .with_context(|| format!("Cannot build timeline from {}", args.rides.display()))?;
    println!(
        "{} rides over {} days ({} .. {})",
        shell.index.ride_count(),
        shell.index.len(),
        shell.index.first_day(),
        shell.index.last_day()
    );
    // Initial selection and active set
    print_events(&shell);

    let clock = Instant::now();

    if let Some(range) = &args.range {
        let [start, end] = range.as_slice() else {
            anyhow::bail!("--range takes exactly two values");
        };
        let mut request = SlideRequest::new(*start, *end).duration(args.slide_ms);
        if let Some(easing) = args.easing {
            request = request.easing(easing);
        }
        shell.selector.slide_to(request);
        run_frames(&mut shell, &clock);
    }

    match args.play {
        Some(PlayMode::Build) => {
            shell.build_animation();
        }
        Some(PlayMode::Window) => {
            shell.sliding_window_animation();
        }
        None => {}
    }
    run_frames(&mut shell, &clock);

    let (start, end) = shell.selector.selected_range();
    let rides = shell.selector.selected_rides();
    println!("selected {} .. {}: {} rides", start, end, rides.len());
    info!("Done after {:.0}ms", elapsed_ms(&clock));
    Ok(())
}

/// CLI flags win over the settings file.
fn apply_overrides(settings: &mut Settings, args: &Args) {
    if let Some(fps) = args.fps {
        settings.fps = fps;
    }
    if let Some(duration) = args.duration_ms {
        settings.build.duration_ms = duration;
        settings.sliding_window.duration_ms = duration;
    }
    if let Some(trailing) = args.trailing_days {
        settings.build.trailing_days = trailing;
    }
    if let Some(days) = args.window_days {
        settings.sliding_window.window_days = days;
    }
}

/// Frame loop: advance the shell at the configured fps until nothing moves.
fn run_frames(shell: &mut Shell, clock: &Instant) {
    let frame = Duration::from_secs_f64(shell.settings.frame_ms() / 1000.0);
    let mut frames = 0u64;
    // First frame always runs so a pending motion can start
    loop {
        shell.advance(elapsed_ms(clock));
        print_events(shell);
        frames += 1;
        if !shell.is_busy() {
            break;
        }
        std::thread::sleep(frame);
    }
    debug!("Frame loop ran {} frames", frames);
}

fn elapsed_ms(clock: &Instant) -> f64 {
    clock.elapsed().as_secs_f64() * 1000.0
}

/// Print the renderer-facing events queued since the last poll.
fn print_events(shell: &Shell) {
    for line in shell.event_bus.poll().iter().filter_map(describe_event) {
        println!("{line}");
    }
}

fn describe_event(event: &BoxedEvent) -> Option<String> {
    if let Some(e) = downcast_event::<SelectionChangedEvent>(event) {
        return Some(format!("selection {} .. {}", e.start, e.end));
    }
    if let Some(e) = downcast_event::<HighlightSetEvent>(event) {
        let names: Vec<&str> = e.ride_names.iter().map(String::as_str).collect();
        return Some(format!("highlight [{}] {}", e.origin, names.join(", ")));
    }
    if let Some(e) = downcast_event::<ActiveRidesChangedEvent>(event) {
        return Some(format!("active {} .. {}: {} rides", e.start, e.end, e.ride_names.len()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridemap::core::date_index::RideRecord;

    fn ride(name: &str, date: &str) -> RideRecord {
        RideRecord {
            name: name.into(),
            date: date.into(),
            length: 1.0,
        }
    }

    #[test]
    fn test_initial_events_are_described() {
        let shell = Shell::from_records(
            vec![ride("a", "2024-05-01"), ride("b", "2024-05-03")],
            Settings::default(),
        )
        .unwrap();
        let lines: Vec<String> = shell.event_bus.poll().iter().filter_map(describe_event).collect();
        assert_eq!(
            lines,
            vec![
                "selection 2024-05-01 .. 2024-05-03".to_string(),
                "active 2024-05-01 .. 2024-05-03: 2 rides".to_string(),
            ]
        );
    }

    #[test]
    fn test_override_precedence() {
        let args = Args::try_parse_from(["ridemap", "r.json", "--duration", "5000", "-w", "4"]).unwrap();
        let mut settings = Settings::default();
        apply_overrides(&mut settings, &args);
        assert_eq!(settings.build.duration_ms, 5000);
        assert_eq!(settings.sliding_window.duration_ms, 5000);
        assert_eq!(settings.sliding_window.window_days, 4);
        assert_eq!(settings.build.trailing_days, 7);
    }
}
