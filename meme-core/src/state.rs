//! Export button state machine.
//!
//! Exports are serialized at the UI level: while one is running the button
//! refuses to start another.

use std::time::{Duration, Instant};

/// How long the success confirmation stays visible.
pub const SUCCESS_DISPLAY: Duration = Duration::from_secs(3);

/// What the export button currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    /// Ready to export.
    Idle,
    /// Export in flight; button disabled, spinner shown.
    Exporting,
    /// Last export succeeded; confirmation shown until the deadline.
    Success {
        /// When the confirmation clears.
        until: Instant,
    },
}

/// State holder for the export button.
#[derive(Debug, Clone)]
pub struct ExportButton {
    status: ExportStatus,
}

impl ExportButton {
    /// A button in the idle state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: ExportStatus::Idle,
        }
    }

    /// Try to start an export.
    ///
    /// Returns `false` (and changes nothing) if one is already running.
    pub fn begin(&mut self) -> bool {
        if self.is_exporting() {
            tracing::debug!("Export already in progress, ignoring trigger");
            return false;
        }
        self.status = ExportStatus::Exporting;
        true
    }

    /// Record the outcome of the running export.
    ///
    /// Success shows the confirmation; failure silently returns to idle.
    pub fn finish(&mut self, success: bool, now: Instant) {
        if !self.is_exporting() {
            return;
        }
        self.status = if success {
            ExportStatus::Success {
                until: now + SUCCESS_DISPLAY,
            }
        } else {
            ExportStatus::Idle
        };
    }

    /// Advance the clock: clears an expired confirmation.
    pub fn tick(&mut self, now: Instant) {
        if let ExportStatus::Success { until } = self.status {
            if now >= until {
                self.status = ExportStatus::Idle;
            }
        }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> ExportStatus {
        self.status
    }

    /// Whether an export is in flight.
    #[must_use]
    pub fn is_exporting(&self) -> bool {
        self.status == ExportStatus::Exporting
    }
}

impl Default for ExportButton {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_flow_auto_clears() {
        let start = Instant::now();
        let mut button = ExportButton::new();

        assert!(button.begin());
        assert!(!button.begin());

        button.finish(true, start);
        assert!(matches!(button.status(), ExportStatus::Success { .. }));

        button.tick(start + Duration::from_secs(1));
        assert!(matches!(button.status(), ExportStatus::Success { .. }));

        button.tick(start + SUCCESS_DISPLAY);
        assert_eq!(button.status(), ExportStatus::Idle);
    }

    #[test]
    fn test_failure_returns_to_idle() {
        let mut button = ExportButton::new();
        assert!(button.begin());
        button.finish(false, Instant::now());
        assert_eq!(button.status(), ExportStatus::Idle);
        assert!(button.begin());
    }

    #[test]
    fn test_finish_without_begin_is_ignored() {
        let mut button = ExportButton::new();
        button.finish(true, Instant::now());
        assert_eq!(button.status(), ExportStatus::Idle);
    }
}
