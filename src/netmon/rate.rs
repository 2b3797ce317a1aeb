//! Bits-per-second rates from cumulative byte counters.

use std::time::Instant;

/// The single most recent counter reading.
#[derive(Debug, Clone, Copy)]
struct RateSample {
    at: Instant,
    input_bytes: u64,
    output_bytes: u64,
}

/// Derives per-direction bit rates from successive byte-counter readings.
///
/// The first reading after construction, or after a detected counter
/// reset, only establishes a baseline; rates are unavailable until the
/// following reading. A counter that went backwards (interface bounce,
/// counter rollover) re-baselines both directions rather than producing
/// a negative rate.
#[derive(Debug, Default)]
pub struct RateTracker {
    previous: Option<RateSample>,
}

impl RateTracker {
    /// Create a tracker with no baseline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a counter reading, returning `(input_bps, output_bps)`.
    ///
    /// Either side is `None` whenever a rate cannot be derived: first
    /// sample, zero elapsed time, or a counter reset. The reading always
    /// becomes the baseline for the next call.
    pub fn update(
        &mut self,
        input_bytes: u64,
        output_bytes: u64,
        now: Instant,
    ) -> (Option<f64>, Option<f64>) {
        let sample = RateSample {
            at: now,
            input_bytes,
            output_bytes,
        };
        let Some(previous) = self.previous.replace(sample) else {
            return (None, None);
        };

        let elapsed = now.saturating_duration_since(previous.at).as_secs_f64();
        if elapsed <= 0.0
            || input_bytes < previous.input_bytes
            || output_bytes < previous.output_bytes
        {
            // Counter reset or no usable elapsed time: the stored sample
            // becomes the new baseline and this reading yields nothing.
            return (None, None);
        }

        let input_bps = (input_bytes - previous.input_bytes) as f64 * 8.0 / elapsed;
        let output_bps = (output_bytes - previous.output_bytes) as f64 * 8.0 / elapsed;
        (Some(input_bps), Some(output_bps))
    }

    /// Drop the baseline, e.g. after the monitored interface changed.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

/// Render a bit rate for humans.
///
/// `None` becomes `N/A`; otherwise the rate is scaled to bps, Kbps, Mbps
/// or Gbps with one decimal above the bps range.
#[must_use]
pub fn format_bps(rate: Option<f64>) -> String {
    let Some(bps) = rate else {
        return "N/A".to_string();
    };

    if bps < 1000.0 {
        format!("{bps:.0}bps")
    } else if bps < 1_000_000.0 {
        format!("{:.1}Kbps", bps / 1000.0)
    } else if bps < 1_000_000_000.0 {
        format!("{:.1}Mbps", bps / 1_000_000.0)
    } else {
        format!("{:.1}Gbps", bps / 1_000_000_000.0)
    }
}
