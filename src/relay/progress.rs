use async_trait::async_trait;

use crate::constants::messages;

/// Coarse stages of a relay, reported alongside percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    /// Download running with no known total size.
    Downloading,
    Uploading,
}

impl Phase {
    /// Text shown to the user for this phase.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Starting => messages::STARTING,
            Self::Downloading => messages::DOWNLOADING,
            Self::Uploading => messages::UPLOADING,
        }
    }
}

/// Receiver of relay progress.
///
/// Implementations swallow their own failures: progress is informational and
/// must never abort a transfer.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, percent: u8);

    async fn report_phase(&self, phase: Phase);
}

/// Decides which byte counts are worth reporting.
///
/// Emits once each time the completed percentage reaches the next multiple
/// of `step`. Nothing is emitted while the total size is unknown.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    step: u16,
    next: u16,
}

impl ProgressThrottle {
    #[must_use]
    pub fn new(step: u8) -> Self {
        let step = u16::from(step.clamp(1, 100));
        Self { step, next: step }
    }

    /// Feed the running byte count; returns a percentage when one is due.
    pub fn observe(&mut self, downloaded: u64, total: Option<u64>) -> Option<u8> {
        let total = total.filter(|&t| t > 0)?;
        let percent = (u128::from(downloaded.min(total)) * 100 / u128::from(total)) as u16;

        if percent < self.next {
            return None;
        }
        self.next = (percent / self.step + 1) * self.step;
        Some(percent as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emits_on_each_step() {
        let mut throttle = ProgressThrottle::new(5);
        let total = Some(100);

        assert_eq!(throttle.observe(1, total), None);
        assert_eq!(throttle.observe(4, total), None);
        assert_eq!(throttle.observe(5, total), Some(5));
        assert_eq!(throttle.observe(7, total), None);
        assert_eq!(throttle.observe(10, total), Some(10));
        assert_eq!(throttle.observe(100, total), Some(100));
        assert_eq!(throttle.observe(100, total), None);
    }

    #[test]
    fn test_large_jumps_emit_once() {
        let mut throttle = ProgressThrottle::new(5);
        assert_eq!(throttle.observe(37, Some(100)), Some(37));
        assert_eq!(throttle.observe(39, Some(100)), None);
        assert_eq!(throttle.observe(40, Some(100)), Some(40));
    }

    #[test]
    fn test_unknown_total_is_silent() {
        let mut throttle = ProgressThrottle::new(5);
        assert_eq!(throttle.observe(1_000_000, None), None);
        assert_eq!(throttle.observe(1_000_000, Some(0)), None);
    }

    #[test]
    fn test_overshoot_is_capped() {
        let mut throttle = ProgressThrottle::new(5);
        assert_eq!(throttle.observe(150, Some(100)), Some(100));
    }

    #[test]
    fn test_byte_scale_totals() {
        let total = 3_000_000_000_u64;
        let mut throttle = ProgressThrottle::new(5);
        let emitted: Vec<u8> = (1..=100)
            .filter_map(|i| throttle.observe(total / 100 * i, Some(total)))
            .collect();
        assert_eq!(emitted.len(), 20);
        assert_eq!(emitted.first(), Some(&5));
    }

    #[test]
    fn test_zero_step_is_clamped() {
        let mut throttle = ProgressThrottle::new(0);
        assert_eq!(throttle.observe(1, Some(100)), Some(1));
        assert_eq!(throttle.observe(2, Some(100)), Some(2));
    }
}
