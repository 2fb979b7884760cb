use std::fmt;

use serde::{Deserialize, Serialize};

use super::job::{JobStatus, PollSession};

/// States of a polling session.
///
/// A session starts in `Polling` and ends in one of `Completed`, `Failed` or
/// `TimedOut`. `TransientError` is entered when a status query could not be
/// read and left on the next readable answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollState {
    Polling,
    TransientError,
    Completed,
    Failed,
    TimedOut,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollState::Completed | PollState::Failed | PollState::TimedOut
        )
    }
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollState::Polling => write!(f, "POLLING"),
            PollState::TransientError => write!(f, "TRANSIENT_ERROR"),
            PollState::Completed => write!(f, "COMPLETED"),
            PollState::Failed => write!(f, "FAILED"),
            PollState::TimedOut => write!(f, "TIMED_OUT"),
        }
    }
}

/// What a single status query produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Status(JobStatus),
    /// Transport or decoding failure, already rendered for logging.
    Error(String),
}

/// Why the session keeps polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitReason {
    Pending(String),
    Transient(String),
}

/// The result of feeding one observation to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Sleep the poll interval, then query again.
    Wait(WaitReason),
    /// The job is done; fetch the result file.
    Fetch,
    /// Terminal failure (`Failed` or `TimedOut`).
    Stop(PollState),
}

/// Drives a [`PollSession`] one status query at a time.
pub struct StateMachine;

impl StateMachine {
    /// Records `observation` as one attempt and computes the next step.
    ///
    /// In-progress answers and unreadable answers share the attempt budget;
    /// once it is spent without a terminal status the session times out.
    /// Terminal sessions are left untouched.
    pub fn next(session: &mut PollSession, observation: Observation) -> Transition {
        if session.state.is_terminal() {
            return match session.state {
                PollState::Completed => Transition::Fetch,
                state => Transition::Stop(state),
            };
        }

        session.attempts += 1;

        let (next_state, transition) = match observation {
            Observation::Status(JobStatus::Completed) => (PollState::Completed, Transition::Fetch),
            Observation::Status(JobStatus::Failed) => {
                (PollState::Failed, Transition::Stop(PollState::Failed))
            }
            Observation::Status(JobStatus::InProgress(status)) => (
                PollState::Polling,
                Transition::Wait(WaitReason::Pending(status)),
            ),
            Observation::Error(reason) => {
                session.transient_errors += 1;
                (
                    PollState::TransientError,
                    Transition::Wait(WaitReason::Transient(reason)),
                )
            }
        };

        let (next_state, transition) =
            if matches!(transition, Transition::Wait(_)) && session.budget_exhausted() {
                (PollState::TimedOut, Transition::Stop(PollState::TimedOut))
            } else {
                (next_state, transition)
            };

        session.state_history.push(session.state);
        session.state = next_state;
        transition
    }
}
