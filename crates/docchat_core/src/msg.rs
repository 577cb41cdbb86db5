#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the question input (debounced text).
    InputChanged(String),
    /// User submitted the current input as a question.
    AskSubmitted,
    /// User picked files to stage for ingestion.
    FilesSelected(Vec<crate::SelectedFile>),
    /// User removed one staged file by its position in the chip list.
    FileRemoved { index: usize },
    /// User asked to ingest the staged files without a question.
    ProcessFilesClicked,
    /// User submitted a website to crawl into the index.
    WebsiteSubmitted {
        url: String,
        max_pages: Option<u32>,
    },
    /// User started a fresh conversation.
    NewChatClicked,
    /// User picked a session from the sidebar list.
    SessionSelected { id: crate::SessionId },
    /// User asked to delete a session.
    SessionDeleteRequested { id: crate::SessionId },
    /// First tick of the app: probe the index and fetch the session list.
    AppStarted,
    /// Startup fully completed; arms auto-resume of the most recent session.
    StartupComplete,
    /// Ingestion progress from the backend poller.
    JobProgress { processed: u32, total: u32, chunks: u32 },
    /// Ingestion reached its terminal status.
    JobCompleted { processed: u32, chunks: u32 },
    /// Ingestion failed at submission or while polling.
    JobFailed { message: String },
    /// Answer for the in-flight question.
    AnswerReceived {
        answer: String,
        sources: Vec<String>,
        session_id: Option<crate::SessionId>,
    },
    /// The in-flight question failed.
    AskFailed { message: String },
    /// Fresh session list from the backend.
    SessionsListed {
        sessions: Vec<crate::SessionSummary>,
    },
    /// A session transcript arrived for replay.
    SessionLoaded { session: crate::LoadedSession },
    /// Loading a session transcript failed.
    SessionLoadFailed { message: String },
    /// A session was deleted server-side.
    SessionDeleted { id: crate::SessionId },
    /// Deleting a session failed.
    SessionDeleteFailed { message: String },
    /// Initial index probe result.
    StatusProbed { chunks_created: u32 },
    /// Fallback for placeholder wiring.
    NoOp,
}
