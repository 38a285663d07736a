//! Progress reporting for the long pipeline loops.
//!
//! Components
//! -----------------
//! * [`IterTimer`] – Per-iteration durations and their **exponential moving average**
//!   (`ema ← α·dt + (1–α)·ema`, the first tick initialises the average).
//! * [`fmt_dur`] – Human-readable duration (`"253µs"`, `"42ms"`, `"3.14s"`).
//! * [`Progress`] – A progress bar (`indicatif`, `progress` feature) whose message reports
//!   the last and average iteration times. Disabled bars, or builds without the feature,
//!   do nothing.
use std::time::{Duration, Instant};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

pub struct IterTimer {
    last: Instant,
    ema_ns: f64,
    alpha: f64,
    count: u64,
}

impl IterTimer {
    pub fn new(alpha: f64) -> Self {
        Self {
            last: Instant::now(),
            ema_ns: 0.0,
            alpha,
            count: 0,
        }
    }

    #[inline]
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;
        self.count += 1;

        let dt_ns = dt.as_nanos() as f64;
        self.ema_ns = if self.count == 1 {
            dt_ns
        } else {
            self.alpha * dt_ns + (1.0 - self.alpha) * self.ema_ns
        };

        dt
    }

    #[inline]
    pub fn avg(&self) -> Duration {
        if self.count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.ema_ns as u64)
        }
    }
}

#[inline]
pub fn fmt_dur(d: Duration) -> String {
    let us = d.as_micros();
    if us < 1_000 {
        format!("{us}µs")
    } else {
        let ms = d.as_millis();
        if ms < 1_000 {
            format!("{ms}ms")
        } else {
            let s = d.as_secs_f32();
            format!("{s:.2}s")
        }
    }
}

/// Optional progress bar over a known number of iterations.
pub struct Progress {
    #[cfg(feature = "progress")]
    bar: Option<ProgressBar>,
    timer: IterTimer,
}

impl Progress {
    /// A bar of `total` steps prefixed by `label`, shown only when `enabled`.
    #[cfg(feature = "progress")]
    pub fn new(total: usize, enabled: bool, label: &str) -> Self {
        let bar = enabled.then(|| {
            let pb = ProgressBar::new((total as u64).max(1));
            if let Ok(style) = ProgressStyle::with_template(
                "{prefix:>12} {bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) \
                 | ETA {eta_precise} | {msg}",
            ) {
                pb.set_style(style);
            }
            pb.set_prefix(label.to_string());
            pb.enable_steady_tick(Duration::from_millis(200));
            pb
        });
        Progress {
            bar,
            timer: IterTimer::new(0.2),
        }
    }

    #[cfg(not(feature = "progress"))]
    pub fn new(_total: usize, _enabled: bool, _label: &str) -> Self {
        Progress {
            timer: IterTimer::new(0.2),
        }
    }

    /// Mark one iteration as done.
    pub fn inc(&mut self) {
        let last = self.timer.tick();
        let avg = self.timer.avg();
        #[cfg(feature = "progress")]
        if let Some(pb) = &self.bar {
            pb.set_message(format!("last: {}, avg: {}", fmt_dur(last), fmt_dur(avg)));
            pb.inc(1);
        }
        tracing::trace!(last = %fmt_dur(last), avg = %fmt_dur(avg), "iteration done");
    }

    pub fn finish(self) {
        #[cfg(feature = "progress")]
        if let Some(pb) = self.bar {
            pb.finish_and_clear();
        }
    }
}
