//! Docchat core: pure conversation state machine and view-model helpers.
mod effect;
mod files;
mod gate;
mod msg;
mod state;
mod transcript;
mod update;
mod view_model;

pub use effect::Effect;
pub use files::{FileBuffer, SelectedFile};
pub use gate::ExclusionGate;
pub use msg::Msg;
pub use state::{
    ChatState, LoadedSession, Notice, NoticeLevel, PendingJobKind, SessionId, SessionSummary,
};
pub use transcript::{ChatTurn, ReplayedTurn, SourceKind, SourceRef, Sources, Speaker};
pub use update::{derive_title, update, TITLE_MAX_CHARS};
pub use view_model::{ChatViewModel, FileChipView, DEFAULT_TITLE};
