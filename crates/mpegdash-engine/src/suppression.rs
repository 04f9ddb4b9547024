//! Resume suppression after adapter-anticipated seeks
//!
//! Some surfaces start playing on their own after a programmatic seek. When
//! the host autoplays and the surface is paused at the moment a seek is
//! announced, the next native `play` is swallowed and the surface is paused
//! again, so no `resume` reaches the host.

use serde::Serialize;

/// Suppression state of one adapter instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeSuppression {
    /// Nothing anticipated
    #[default]
    Idle,
    /// The next native `play` is swallowed
    Armed,
    /// A `play` was swallowed since the last seek announcement
    Consumed,
}

impl ResumeSuppression {
    /// Recompute the state on a host "about to seek" notification
    pub fn before_seek(&mut self, autoplay: bool, surface_paused: bool) {
        *self = if autoplay && surface_paused {
            ResumeSuppression::Armed
        } else {
            ResumeSuppression::Idle
        };
    }

    /// Feed a native `play`; returns true when it must be swallowed
    pub fn on_play(&mut self) -> bool {
        if *self == ResumeSuppression::Armed {
            *self = ResumeSuppression::Consumed;
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        *self == ResumeSuppression::Armed
    }
}

impl std::fmt::Display for ResumeSuppression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResumeSuppression::Idle => write!(f, "Idle"),
            ResumeSuppression::Armed => write!(f, "Armed"),
            ResumeSuppression::Consumed => write!(f, "Consumed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arms_only_with_autoplay_and_paused() {
        let mut state = ResumeSuppression::default();

        state.before_seek(true, true);
        assert!(state.is_armed());

        state.before_seek(true, false);
        assert_eq!(state, ResumeSuppression::Idle);

        state.before_seek(false, true);
        assert_eq!(state, ResumeSuppression::Idle);
    }

    #[test]
    fn test_consumed_at_most_once() {
        let mut state = ResumeSuppression::default();
        state.before_seek(true, true);

        assert!(state.on_play());
        assert_eq!(state, ResumeSuppression::Consumed);
        assert!(!state.on_play());
        assert_eq!(state, ResumeSuppression::Consumed);
    }

    #[test]
    fn test_stale_armed_is_overwritten() {
        let mut state = ResumeSuppression::default();
        state.before_seek(true, true);
        // No play followed; the next seek announcement recomputes.
        state.before_seek(true, false);
        assert!(!state.on_play());
    }
}
