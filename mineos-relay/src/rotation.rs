use std::time::Duration;

/// Which of the two fixed credentials a cycle uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Primary,
    Secondary,
}

/// Alternates between two fixed credentials, once per reconnect cycle.
///
/// The two split windows are derived from the configured share but nothing
/// schedules against them; rotation is driven purely by `connect()` calls.
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    primary: String,
    secondary: String,
    use_primary: bool,
    primary_window: Duration,
    secondary_window: Duration,
}

impl RotationPolicy {
    pub fn new(
        primary: impl Into<String>,
        secondary: impl Into<String>,
        primary_share: f64,
        cycle: Duration,
    ) -> Self {
        let share = primary_share.clamp(0.0, 1.0);
        let primary_ms = (cycle.as_millis() as f64 * share).round() as u64;
        let primary_window = Duration::from_millis(primary_ms);

        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            use_primary: true,
            primary_window,
            secondary_window: cycle.saturating_sub(primary_window),
        }
    }

    pub fn slot(&self) -> Slot {
        if self.use_primary {
            Slot::Primary
        } else {
            Slot::Secondary
        }
    }

    /// Credential the next `connect()` will use
    pub fn current(&self) -> &str {
        match self.slot() {
            Slot::Primary => &self.primary,
            Slot::Secondary => &self.secondary,
        }
    }

    /// Only the router's `connect()` may call this
    pub(crate) fn flip(&mut self) {
        self.use_primary = !self.use_primary;
    }

    /// Nominal (primary, secondary) split of one cycle
    pub fn windows(&self) -> (Duration, Duration) {
        (self.primary_window, self.secondary_window)
    }
}
