use crate::state::{Notice, SessionSummary};
use crate::transcript::ChatTurn;

/// Title shown before a conversation has earned one.
pub const DEFAULT_TITLE: &str = "New conversation";

/// Render-ready projection of `ChatState`; the platform layer paints this
/// and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatViewModel {
    pub title: String,
    pub welcome_visible: bool,
    pub busy: bool,
    pub staged_files: Vec<FileChipView>,
    pub transcript: Vec<ChatTurn>,
    pub sessions: Vec<SessionSummary>,
    pub activity: Option<String>,
    pub notice: Option<Notice>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChipView {
    pub name: String,
    pub is_pdf: bool,
}
