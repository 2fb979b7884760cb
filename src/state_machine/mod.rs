mod job;
mod state;

pub use job::{JobHandle, JobStatus, PollConfig, PollReport, PollSession};
pub use state::{Observation, PollState, StateMachine, Transition, WaitReason};
