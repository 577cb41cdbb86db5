//! Docchat backend engine: typed HTTP client, job polling and session access.
mod client;
mod handle;
mod poll;
mod runner;
mod sessions;
mod types;

pub use client::{ApiClient, ClientSettings};
pub use handle::{BackendCommander, BackendEvent, BackendHandle};
pub use poll::{PollError, PollSettings, StatusPoller};
pub use runner::{JobError, JobRunner, JobSink};
pub use sessions::{split_sources_section, ReplayMessage, Role, SessionReplay, SessionRepository};
pub use types::{
    ApiError, AskOutcome, JobEvent, JobKind, JobOutcome, JobStatus, SessionDetail, SessionEntry,
    SessionMessage, StagedUpload,
};
