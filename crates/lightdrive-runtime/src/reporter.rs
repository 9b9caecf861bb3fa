//! Update/frame rate reporting
//!
//! Once per reporting window the scheduler hands a [`RateReport`] to every
//! registered reporter. Reporting is observational: a failing reporter is
//! logged and skipped, it never affects the loop.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use lightdrive_core::{LightDriveError, Result};

/// Counts for one closed reporting window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateReport {
    pub title: String,
    pub updates: u64,
    pub frames: u64,
    pub window_ms: u64,
}

impl RateReport {
    /// Updates per second over the window
    pub fn ups(&self) -> u64 {
        per_second(self.updates, self.window_ms)
    }

    /// Frames per second over the window
    pub fn fps(&self) -> u64 {
        per_second(self.frames, self.window_ms)
    }

    /// Diagnostic line shown as the surface title, e.g.
    /// `LightDrive  |  UPS: 60, FPS: 144`
    pub fn title_line(&self) -> String {
        format!("{}  |  UPS: {}, FPS: {}", self.title, self.ups(), self.fps())
    }
}

fn per_second(count: u64, window_ms: u64) -> u64 {
    if window_ms == 0 {
        return count;
    }
    (count * 1000 + window_ms / 2) / window_ms
}

/// Per-window counters owned by the loop thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub updates: u64,
    pub frames: u64,
    pub window_start_ms: u64,
}

impl Counters {
    pub fn starting_at(now_ms: u64) -> Self {
        Self {
            window_start_ms: now_ms,
            ..Self::default()
        }
    }

    /// Close the window if `interval_ms` has elapsed since it opened.
    /// The next window starts exactly one interval after this one.
    pub fn roll(&mut self, now_ms: u64, interval_ms: u64, title: &str) -> Option<RateReport> {
        if now_ms.saturating_sub(self.window_start_ms) < interval_ms {
            return None;
        }
        let report = RateReport {
            title: title.to_string(),
            updates: self.updates,
            frames: self.frames,
            window_ms: interval_ms,
        };
        self.updates = 0;
        self.frames = 0;
        self.window_start_ms += interval_ms;
        Some(report)
    }
}

/// Receiver of per-window rate reports.
pub trait RateReporter: Send {
    fn report(&mut self, report: &RateReport) -> Result<()>;
}

/// Logs each report at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl RateReporter for LogReporter {
    fn report(&mut self, report: &RateReport) -> Result<()> {
        log::info!("{}", report.title_line());
        Ok(())
    }
}

/// Forwards reports into a bounded channel without blocking the loop.
pub struct ChannelReporter {
    tx: Sender<RateReport>,
}

impl ChannelReporter {
    pub fn new(tx: Sender<RateReport>) -> Self {
        Self { tx }
    }

    /// Reporter plus the receiving end of a channel holding `capacity` reports
    pub fn bounded(capacity: usize) -> (Self, Receiver<RateReport>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self::new(tx), rx)
    }
}

impl RateReporter for ChannelReporter {
    fn report(&mut self, report: &RateReport) -> Result<()> {
        self.tx.try_send(report.clone()).map_err(|e| match e {
            TrySendError::Full(_) => LightDriveError::Report("report channel full".into()),
            TrySendError::Disconnected(_) => {
                LightDriveError::Report("report receiver dropped".into())
            }
        })
    }
}

/// Adapts a closure into a reporter
pub struct FnReporter<F>(pub F);

impl<F> RateReporter for FnReporter<F>
where
    F: FnMut(&RateReport) + Send,
{
    fn report(&mut self, report: &RateReport) -> Result<()> {
        (self.0)(report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(updates: u64, frames: u64) -> RateReport {
        RateReport {
            title: "Demo".into(),
            updates,
            frames,
            window_ms: 1000,
        }
    }

    #[test]
    fn test_title_line_format() {
        assert_eq!(report(60, 144).title_line(), "Demo  |  UPS: 60, FPS: 144");
    }

    #[test]
    fn test_rates_scale_to_per_second() {
        let r = RateReport {
            window_ms: 500,
            ..report(30, 61)
        };
        assert_eq!(r.ups(), 60);
        assert_eq!(r.fps(), 122);
    }

    #[test]
    fn test_counters_roll_once_per_window() {
        let mut counters = Counters::starting_at(0);
        counters.updates = 60;
        counters.frames = 10;
        assert!(counters.roll(999, 1000, "t").is_none());

        let r = counters.roll(1000, 1000, "t").unwrap();
        assert_eq!((r.updates, r.frames), (60, 10));
        assert_eq!(counters, Counters::starting_at(1000));
    }

    #[test]
    fn test_window_advances_by_interval() {
        let mut counters = Counters::starting_at(0);
        counters.roll(1250, 1000, "t").unwrap();
        assert_eq!(counters.window_start_ms, 1000);
        assert!(counters.roll(1999, 1000, "t").is_none());
    }

    #[test]
    fn test_channel_reporter_full_is_error() {
        let (mut reporter, rx) = ChannelReporter::bounded(1);
        reporter.report(&report(1, 1)).unwrap();
        let err = reporter.report(&report(2, 2)).unwrap_err();
        assert!(matches!(err, LightDriveError::Report(_)));
        assert_eq!(rx.try_recv().unwrap().updates, 1);
    }

    #[test]
    fn test_fn_reporter() {
        let mut seen = Vec::new();
        FnReporter(|r: &RateReport| seen.push(r.frames))
            .report(&report(0, 7))
            .unwrap();
        assert_eq!(seen, vec![7]);
    }
}
