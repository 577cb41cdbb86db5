use url::Url;

use crate::state::{ChatState, PendingJobKind};
use crate::transcript::{ChatTurn, SourceRef, Sources, Speaker};
use crate::{Effect, LoadedSession, Msg, NoticeLevel, SessionId, SessionSummary};

/// Maximum conversation-title length derived from the first question.
pub const TITLE_MAX_CHARS: usize = 40;

/// Crawl page budget when the user does not supply one.
const DEFAULT_MAX_PAGES: u32 = 50;

const ACTIVITY_PROCESSING: &str = "Processing documents...";
const ACTIVITY_CRAWLING: &str = "Exploring the website...";
const ACTIVITY_GENERATING: &str = "Generating response...";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ChatState, msg: Msg) -> (ChatState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::AskSubmitted => ask_submitted(&mut state),
        Msg::FilesSelected(picked) => {
            state.stage_files(picked);
            if !state.staged_is_empty() {
                let count = state.staged_len();
                state.set_notice(NoticeLevel::Info, format!("{count} file(s) selected"));
            }
            Vec::new()
        }
        Msg::FileRemoved { index } => {
            state.remove_staged(index);
            Vec::new()
        }
        Msg::ProcessFilesClicked => process_files(&mut state),
        Msg::WebsiteSubmitted { url, max_pages } => website_submitted(&mut state, url, max_pages),
        Msg::NewChatClicked => {
            // A held gate means a job or question still owns the transcript.
            if !state.is_busy() {
                state.reset_conversation();
            }
            Vec::new()
        }
        Msg::SessionSelected { id } => vec![Effect::LoadSession { id }],
        Msg::SessionDeleteRequested { id } => vec![Effect::DeleteSession { id }],
        Msg::AppStarted => vec![Effect::RefreshSessions, Effect::ProbeStatus],
        Msg::StartupComplete => {
            state.set_startup_complete();
            vec![Effect::RefreshSessions]
        }
        Msg::JobProgress {
            processed,
            total,
            chunks,
        } => {
            job_progress(&mut state, processed, total, chunks);
            Vec::new()
        }
        Msg::JobCompleted { processed, chunks } => job_completed(&mut state, processed, chunks),
        Msg::JobFailed { message } => {
            job_failed(&mut state, message);
            Vec::new()
        }
        Msg::AnswerReceived {
            answer,
            sources,
            session_id,
        } => answer_received(&mut state, answer, sources, session_id),
        Msg::AskFailed { message } => {
            ask_failed(&mut state, message);
            Vec::new()
        }
        Msg::SessionsListed { sessions } => sessions_listed(&mut state, sessions),
        Msg::SessionLoaded { session } => {
            session_loaded(&mut state, session);
            Vec::new()
        }
        Msg::SessionLoadFailed { message } => {
            state.set_notice(NoticeLevel::Error, message);
            Vec::new()
        }
        Msg::SessionDeleted { id } => session_deleted(&mut state, id),
        Msg::SessionDeleteFailed { message } => {
            state.set_notice(NoticeLevel::Error, message);
            Vec::new()
        }
        Msg::StatusProbed { chunks_created } => {
            // The index already holds documents from an earlier run; a first
            // ask must not wait for a redundant upload.
            if chunks_created > 0 {
                state.mark_ingested();
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn ask_submitted(state: &mut ChatState) -> Vec<Effect> {
    let question = state.input().trim().to_string();
    if question.is_empty() {
        return Vec::new();
    }
    if !state.try_acquire_gate() {
        return Vec::new();
    }

    state.clear_input();
    state.begin_conversation();
    state.push_turn(ChatTurn::user(question.clone()));

    if !state.staged_is_empty() && !state.has_ingested_files() {
        // Staged files must reach the index before the question does.
        state.set_activity(Some(ACTIVITY_PROCESSING.to_string()));
        state.set_pending_job(PendingJobKind::Upload {
            staged: state.staged_len(),
        });
        state.park_question(question);
        return vec![Effect::RunUploadJob {
            files: state.staged_snapshot(),
        }];
    }

    state.set_activity(Some(ACTIVITY_GENERATING.to_string()));
    let session_id = state.active_session_id().map(str::to_string);
    state.submit_question(question.clone());
    vec![Effect::SubmitQuestion {
        question,
        session_id,
    }]
}

fn process_files(state: &mut ChatState) -> Vec<Effect> {
    if state.staged_is_empty() {
        state.set_notice(NoticeLevel::Error, "No files selected".to_string());
        return Vec::new();
    }
    if !state.try_acquire_gate() {
        return Vec::new();
    }

    state.begin_conversation();
    state.set_activity(Some(ACTIVITY_PROCESSING.to_string()));
    state.set_pending_job(PendingJobKind::Upload {
        staged: state.staged_len(),
    });
    vec![Effect::RunUploadJob {
        files: state.staged_snapshot(),
    }]
}

fn website_submitted(state: &mut ChatState, url: String, max_pages: Option<u32>) -> Vec<Effect> {
    let trimmed = url.trim();
    if trimmed.is_empty() || Url::parse(trimmed).is_err() {
        state.set_notice(NoticeLevel::Error, "Please enter a valid URL".to_string());
        return Vec::new();
    }
    if !state.try_acquire_gate() {
        return Vec::new();
    }

    state.begin_conversation();
    state.set_activity(Some(ACTIVITY_CRAWLING.to_string()));
    state.set_pending_job(PendingJobKind::Crawl);
    vec![Effect::RunCrawlJob {
        base_url: trimmed.to_string(),
        max_pages: max_pages.unwrap_or(DEFAULT_MAX_PAGES),
    }]
}

fn job_progress(state: &mut ChatState, processed: u32, total: u32, chunks: u32) {
    let unit = match state.pending_job() {
        Some(PendingJobKind::Crawl) => "pages",
        _ => "files",
    };
    state.set_activity(Some(format!(
        "Processing: {processed}/{total} {unit}, {chunks} segments created"
    )));
}

fn job_completed(state: &mut ChatState, processed: u32, chunks: u32) -> Vec<Effect> {
    let job = state.take_pending_job();
    if matches!(job, Some(PendingJobKind::Upload { .. })) {
        state.mark_ingested();
        state.clear_staged();
    }

    if let Some(ask) = state.take_pending_ask() {
        // Ingestion ran as the prelude to a question: keep holding the gate
        // and move straight on to submission.
        state.set_activity(Some(ACTIVITY_GENERATING.to_string()));
        let session_id = state.active_session_id().map(str::to_string);
        let question = ask.question;
        state.submit_question(question.clone());
        return vec![Effect::SubmitQuestion {
            question,
            session_id,
        }];
    }

    state.set_activity(None);
    let summary = match job {
        Some(PendingJobKind::Upload { staged }) => format!(
            "Documents processed successfully.\n{staged} document(s) analyzed, {chunks} segments created."
        ),
        Some(PendingJobKind::Crawl) => format!(
            "Website indexed successfully.\n{processed} page(s) analyzed, {chunks} segments created.\nYou can now ask questions about the website content."
        ),
        None => format!("{processed} item(s) analyzed, {chunks} segments created."),
    };
    state.push_turn(ChatTurn::assistant(summary));
    state.release_gate();
    Vec::new()
}

fn job_failed(state: &mut ChatState, message: String) {
    state.take_pending_job();
    // A question parked behind this ingestion aborts with it; it is never
    // submitted.
    state.take_pending_ask();
    state.set_activity(None);
    state.push_turn(ChatTurn::assistant(format!("Error: {message}")));
    state.set_notice(NoticeLevel::Error, message);
    state.release_gate();
}

fn answer_received(
    state: &mut ChatState,
    answer: String,
    sources: Vec<String>,
    session_id: Option<SessionId>,
) -> Vec<Effect> {
    let ask = state.take_pending_ask();
    state.set_activity(None);

    let sources = if sources.is_empty() {
        None
    } else {
        Some(Sources::Listed(
            sources.into_iter().map(SourceRef::new).collect(),
        ))
    };
    state.push_turn(ChatTurn {
        speaker: Speaker::Assistant,
        body: answer,
        sources,
    });

    let mut effects = Vec::new();
    if let Some(id) = session_id {
        if state.active_session_id().is_none() {
            state.adopt_session_id(id);
            effects.push(Effect::RefreshSessions);
            // First exchange only: the question becomes the title.
            if state.transcript_len() <= 2 {
                if let Some(ask) = &ask {
                    state.set_title(derive_title(&ask.question));
                }
            }
        }
    }

    state.release_gate();
    effects
}

fn ask_failed(state: &mut ChatState, message: String) {
    state.take_pending_ask();
    state.set_activity(None);
    state.push_turn(ChatTurn::assistant(format!("Error: {message}")));
    state.release_gate();
}

fn sessions_listed(state: &mut ChatState, sessions: Vec<SessionSummary>) -> Vec<Effect> {
    state.set_sessions(sessions);
    if state.should_auto_resume() {
        if let Some(id) = state.most_recent_session_id() {
            state.mark_auto_resumed();
            return vec![Effect::LoadSession { id }];
        }
    }
    Vec::new()
}

fn session_loaded(state: &mut ChatState, session: LoadedSession) {
    state.apply_loaded_session(session);
}

fn session_deleted(state: &mut ChatState, id: SessionId) -> Vec<Effect> {
    if state.active_session_id() == Some(id.as_str()) && !state.is_busy() {
        // The transcript on screen no longer exists server-side.
        state.reset_conversation();
    }
    state.set_notice(NoticeLevel::Info, "Conversation deleted".to_string());
    vec![Effect::RefreshSessions]
}

/// Sidebar title for a new conversation: the question, truncated to
/// `TITLE_MAX_CHARS` characters with an ellipsis suffix when longer.
pub fn derive_title(question: &str) -> String {
    let mut chars = question.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
