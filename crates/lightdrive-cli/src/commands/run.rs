//! Headless demo run

use crate::demo::BouncingBox;
use anyhow::{bail, Context, Result};
use lightdrive_core::{FaultPolicy, LoopConfig};
use lightdrive_render::{parse_filter, Antialiasing, HeadlessSurface};
use lightdrive_runtime::{InputEvent, KeyCode, LogReporter, Screen};
use std::path::PathBuf;
use std::time::Duration;

pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub tps: Option<f64>,
    pub title: Option<String>,
    pub seconds: f64,
    pub scale: u32,
    pub filters: Vec<String>,
    pub antialias: String,
    pub fps_cap: Option<f64>,
    pub catch_up: Option<u32>,
    pub continue_on_fault: bool,
    pub pause_at: Option<f64>,
    pub screenshot: Option<PathBuf>,
}

fn build_config(args: &RunArgs) -> Result<LoopConfig> {
    let mut config = match &args.config {
        Some(path) => LoopConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => LoopConfig::default(),
    };
    if let Some(w) = args.width {
        config.width = w;
    }
    if let Some(h) = args.height {
        config.height = h;
    }
    if let Some(tps) = args.tps {
        config.target_ticks_per_second = tps;
    }
    if let Some(title) = &args.title {
        config.title = title.clone();
    }
    if args.fps_cap.is_some() {
        config.max_frames_per_second = args.fps_cap;
    }
    if args.catch_up.is_some() {
        config.max_catch_up_ticks = args.catch_up;
    }
    if args.continue_on_fault {
        config.fault_policy = FaultPolicy::Continue;
    }
    Ok(config)
}

/// Time to run before the pause key, and after it when one is sent
fn run_durations(seconds: f64, pause_at: Option<f64>) -> Result<(Duration, Option<Duration>)> {
    let secs = |value: f64| {
        Duration::try_from_secs_f64(value)
            .with_context(|| format!("{}s is not a usable duration", value))
    };
    match pause_at {
        Some(at) if at < seconds => {
            let at = at.max(0.0);
            Ok((secs(at)?, Some(secs(seconds - at)?)))
        }
        _ => Ok((secs(seconds)?, None)),
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    if !args.seconds.is_finite() || args.seconds < 0.0 {
        bail!("--seconds must be a non-negative number");
    }
    if args.scale == 0 {
        bail!("--scale must be at least 1");
    }

    let config = build_config(&args)?;
    let Some(mode) = Antialiasing::parse(&args.antialias) else {
        bail!(
            "Unknown antialiasing mode '{}' (expected none, shapes, text or both)",
            args.antialias
        );
    };

    let (width, height) = (config.width, config.height);
    let (Some(out_w), Some(out_h)) = (width.checked_mul(args.scale), height.checked_mul(args.scale))
    else {
        bail!("{}x{} scaled by {} does not fit a surface", width, height, args.scale);
    };
    let (before_pause, after_pause) = run_durations(args.seconds, args.pause_at)?;
    let mut screen: Screen<BouncingBox> =
        Screen::new(config).context("Invalid loop configuration")?;
    screen.enable_keyboard();
    screen.enable_antialiasing(mode);
    screen.add_reporter(LogReporter);
    for spec in &args.filters {
        let Some(filter) = parse_filter(spec) else {
            bail!("Unknown filter '{}'", spec);
        };
        println!("Filter: {}", filter.name());
        screen.add_filter(filter);
    }

    let surface = HeadlessSurface::new(out_w, out_h);
    let probe = surface.probe();
    let input = screen.input_sender();

    println!(
        "Running {}x{} (presented at {}x{}) for {:.1}s",
        width,
        height,
        out_w,
        out_h,
        args.seconds
    );
    screen
        .open(BouncingBox::new(width, height), surface)
        .context("Failed to open the loop")?;

    std::thread::sleep(before_pause);
    if let Some(after) = after_pause {
        input.send(InputEvent::KeyDown(KeyCode::SPACE));
        input.send(InputEvent::KeyUp(KeyCode::SPACE));
        std::thread::sleep(after);
    }

    let summary = screen.close().context("Loop ended with an error")?;
    if let Some(summary) = summary {
        println!(
            "Ran {} iterations: {} updates, {} frames, {} dropped ticks",
            summary.iterations, summary.total_updates, summary.total_frames, summary.dropped_ticks
        );
    }
    println!("Presented frames: {}", probe.presented());

    if let Some(path) = &args.screenshot {
        let frame = probe
            .last_frame()
            .context("No frame was presented; nothing to save")?;
        frame
            .save_png(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Saved {}x{} screenshot to {}", frame.width(), frame.height(), path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            width: None,
            height: None,
            tps: None,
            title: None,
            seconds: 0.0,
            scale: 1,
            filters: Vec::new(),
            antialias: "none".into(),
            fps_cap: None,
            catch_up: None,
            continue_on_fault: false,
            pause_at: None,
            screenshot: None,
        }
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let config = build_config(&RunArgs {
            width: Some(100),
            tps: Some(30.0),
            catch_up: Some(4),
            continue_on_fault: true,
            ..args()
        })
        .unwrap();
        assert_eq!(config.width, 100);
        assert_eq!(config.height, LoopConfig::default().height);
        assert_eq!(config.target_ticks_per_second, 30.0);
        assert_eq!(config.max_catch_up_ticks, Some(4));
        assert_eq!(config.fault_policy, FaultPolicy::Continue);
    }

    #[test]
    fn unknown_filter_is_rejected() {
        let err = run(RunArgs {
            filters: vec!["sepia".into()],
            ..args()
        })
        .unwrap_err();
        assert!(err.to_string().contains("sepia"));
    }

    #[test]
    fn zero_width_is_a_config_error() {
        let err = run(RunArgs {
            width: Some(0),
            ..args()
        })
        .unwrap_err();
        assert!(err.to_string().contains("Invalid loop configuration"));
    }

    #[test]
    fn oversized_surface_is_rejected() {
        let err = run(RunArgs {
            width: Some(70_000),
            height: Some(10),
            scale: 70_000,
            ..args()
        })
        .unwrap_err();
        assert!(err.to_string().contains("does not fit"));
    }

    #[test]
    fn huge_duration_is_rejected() {
        let err = run(RunArgs {
            seconds: 1e30,
            ..args()
        })
        .unwrap_err();
        assert!(err.to_string().contains("not a usable duration"));
    }

    #[test]
    fn pause_splits_the_run() {
        let (before, after) = run_durations(2.0, Some(0.5)).unwrap();
        assert_eq!(before, Duration::from_millis(500));
        assert_eq!(after, Some(Duration::from_millis(1500)));
        let (before, after) = run_durations(1.0, Some(3.0)).unwrap();
        assert_eq!(before, Duration::from_secs(1));
        assert_eq!(after, None);
    }

    #[test]
    fn short_run_writes_screenshot() {
        let path = std::env::temp_dir().join(format!("lightdrive-run-{}.png", std::process::id()));
        run(RunArgs {
            width: Some(32),
            height: Some(24),
            seconds: 0.2,
            scale: 2,
            filters: vec!["grayscale".into()],
            antialias: "both".into(),
            screenshot: Some(path.clone()),
            ..args()
        })
        .unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_file(path);
    }
}
