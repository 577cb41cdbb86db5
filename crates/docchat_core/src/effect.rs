/// IO requests produced by `update`; executed by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Submit the staged files for ingestion and poll to completion.
    RunUploadJob { files: Vec<crate::SelectedFile> },
    /// Submit a website crawl and poll to completion.
    RunCrawlJob { base_url: String, max_pages: u32 },
    /// Submit the question, with the active session id when one is held.
    SubmitQuestion {
        question: String,
        session_id: Option<crate::SessionId>,
    },
    /// Re-fetch the sidebar session list.
    RefreshSessions,
    /// Fetch one session transcript for replay.
    LoadSession { id: crate::SessionId },
    /// Delete a session server-side.
    DeleteSession { id: crate::SessionId },
    /// One-shot index probe at startup.
    ProbeStatus,
}
