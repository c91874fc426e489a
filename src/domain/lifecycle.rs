//! Lifecycle session state machine

use std::fmt;
use thiserror::Error;

/// Lifecycle states of a waiting invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    #[default]
    Starting,
    WaitingForInteraction,
    Interacted,
    TimedOut,
    SignalTerminated,
    ShuttingDown,
    Terminated,
}

impl LifecycleState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::WaitingForInteraction => "waiting",
            Self::Interacted => "interacted",
            Self::TimedOut => "timed-out",
            Self::SignalTerminated => "signal-terminated",
            Self::ShuttingDown => "shutting-down",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: LifecycleState,
    pub action: String,
}

/// Lifecycle session entity.
/// Tracks one invocation from startup to termination.
///
/// State machine:
///   STARTING -> WAITING (begin_waiting)
///   WAITING -> INTERACTED (interaction_received)
///   WAITING -> TIMED_OUT (timer_elapsed)
///   STARTING | WAITING | INTERACTED -> SIGNAL_TERMINATED (signal_received)
///   INTERACTED | TIMED_OUT | SIGNAL_TERMINATED | WAITING -> SHUTTING_DOWN (begin_shutdown)
///   SHUTTING_DOWN -> TERMINATED (terminate)
#[derive(Debug, Default)]
pub struct LifecycleSession {
    state: LifecycleState,
}

impl LifecycleSession {
    /// Create a new session in starting state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_waiting(&self) -> bool {
        self.state == LifecycleState::WaitingForInteraction
    }

    pub fn is_terminated(&self) -> bool {
        self.state == LifecycleState::Terminated
    }

    fn transition(
        &mut self,
        allowed: &[LifecycleState],
        next: LifecycleState,
        action: &str,
    ) -> Result<(), InvalidStateTransition> {
        if !allowed.contains(&self.state) {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: action.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    /// Transition from STARTING to WAITING
    pub fn begin_waiting(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            &[LifecycleState::Starting],
            LifecycleState::WaitingForInteraction,
            "begin waiting",
        )
    }

    /// Transition from WAITING to INTERACTED
    pub fn interaction_received(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            &[LifecycleState::WaitingForInteraction],
            LifecycleState::Interacted,
            "receive interaction",
        )
    }

    /// Transition from WAITING to TIMED_OUT
    pub fn timer_elapsed(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            &[LifecycleState::WaitingForInteraction],
            LifecycleState::TimedOut,
            "time out",
        )
    }

    /// Transition to SIGNAL_TERMINATED from any live state
    pub fn signal_received(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            &[
                LifecycleState::Starting,
                LifecycleState::WaitingForInteraction,
                LifecycleState::Interacted,
            ],
            LifecycleState::SignalTerminated,
            "handle signal",
        )
    }

    /// Transition to SHUTTING_DOWN.
    /// Waiting is accepted for an explicit quit.
    pub fn begin_shutdown(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            &[
                LifecycleState::WaitingForInteraction,
                LifecycleState::Interacted,
                LifecycleState::TimedOut,
                LifecycleState::SignalTerminated,
            ],
            LifecycleState::ShuttingDown,
            "shut down",
        )
    }

    /// Transition from SHUTTING_DOWN to TERMINATED
    pub fn terminate(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            &[LifecycleState::ShuttingDown],
            LifecycleState::Terminated,
            "terminate",
        )
    }
}
