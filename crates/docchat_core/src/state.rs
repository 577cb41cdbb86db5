use crate::files::{FileBuffer, SelectedFile};
use crate::gate::ExclusionGate;
use crate::transcript::{ChatTurn, ReplayedTurn, Sources};
use crate::view_model::{ChatViewModel, FileChipView, DEFAULT_TITLE};

pub type SessionId = String;

/// Sidebar projection of a server-held session; not the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: SessionId,
    pub title: String,
    pub last_activity: String,
}

/// A full transcript fetched for replay, messages already split by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSession {
    pub id: SessionId,
    pub title: String,
    pub last_activity: String,
    pub turns: Vec<ReplayedTurn>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient status banner shown outside the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Which kind of ingestion currently holds the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingJobKind {
    Upload { staged: usize },
    Crawl,
}

/// A question that has acquired the gate and not yet been answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingAsk {
    pub question: String,
    /// True while staged files must be ingested before the question may be
    /// submitted.
    pub awaiting_ingest: bool,
}

/// One instance per process lifetime; mutated only through `update`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatState {
    gate: ExclusionGate,
    files: FileBuffer,
    transcript: Vec<ChatTurn>,
    sessions: Vec<SessionSummary>,
    active_session_id: Option<SessionId>,
    title: Option<String>,
    input: String,
    has_ingested_files: bool,
    conversation_started: bool,
    startup_complete: bool,
    auto_resumed: bool,
    pending_job: Option<PendingJobKind>,
    pending_ask: Option<PendingAsk>,
    activity: Option<String>,
    notice: Option<Notice>,
    dirty: bool,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ChatViewModel {
        ChatViewModel {
            title: self
                .title
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            welcome_visible: !self.conversation_started,
            busy: self.gate.is_held(),
            staged_files: self
                .files
                .as_slice()
                .iter()
                .map(|file| FileChipView {
                    name: file.name.clone(),
                    is_pdf: file.name.ends_with(".pdf"),
                })
                .collect(),
            transcript: self.transcript.clone(),
            sessions: self.sessions.clone(),
            activity: self.activity.clone(),
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        let was = self.dirty;
        self.dirty = false;
        was
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    // Read accessors.

    pub fn is_busy(&self) -> bool {
        self.gate.is_held()
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.active_session_id.as_deref()
    }

    pub fn has_ingested_files(&self) -> bool {
        self.has_ingested_files
    }

    pub fn conversation_started(&self) -> bool {
        self.conversation_started
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn sessions(&self) -> &[SessionSummary] {
        &self.sessions
    }

    pub fn staged_files(&self) -> &[SelectedFile] {
        self.files.as_slice()
    }

    pub fn activity(&self) -> Option<&str> {
        self.activity.as_deref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    // Mutators used by `update`.

    pub(crate) fn try_acquire_gate(&mut self) -> bool {
        let acquired = self.gate.try_acquire();
        if acquired {
            self.mark_dirty();
        }
        acquired
    }

    pub(crate) fn release_gate(&mut self) {
        self.gate.release();
        self.mark_dirty();
    }

    pub(crate) fn set_input(&mut self, text: String) {
        if self.input != text {
            self.input = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn clear_input(&mut self) {
        self.set_input(String::new());
    }

    pub(crate) fn stage_files(&mut self, picked: Vec<SelectedFile>) {
        let mut accepted = 0;
        for file in picked {
            if self.files.add(file) {
                accepted += 1;
            }
        }
        if accepted > 0 {
            self.mark_dirty();
        }
    }

    pub(crate) fn remove_staged(&mut self, index: usize) {
        if self.files.remove(index).is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn clear_staged(&mut self) {
        if !self.files.is_empty() {
            self.files.clear();
            self.mark_dirty();
        }
    }

    pub(crate) fn staged_is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub(crate) fn staged_len(&self) -> usize {
        self.files.len()
    }

    pub(crate) fn staged_snapshot(&self) -> Vec<SelectedFile> {
        self.files.as_slice().to_vec()
    }

    pub(crate) fn begin_conversation(&mut self) {
        if !self.conversation_started {
            self.conversation_started = true;
            self.mark_dirty();
        }
    }

    pub(crate) fn push_turn(&mut self, turn: ChatTurn) {
        self.transcript.push(turn);
        self.mark_dirty();
    }

    pub(crate) fn transcript_len(&self) -> usize {
        self.transcript.len()
    }

    pub(crate) fn set_activity(&mut self, label: Option<String>) {
        if self.activity != label {
            self.activity = label;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_notice(&mut self, level: NoticeLevel, text: String) {
        self.notice = Some(Notice { level, text });
        self.mark_dirty();
    }

    pub(crate) fn set_pending_job(&mut self, kind: PendingJobKind) {
        self.pending_job = Some(kind);
    }

    pub(crate) fn pending_job(&self) -> Option<PendingJobKind> {
        self.pending_job
    }

    pub(crate) fn take_pending_job(&mut self) -> Option<PendingJobKind> {
        self.pending_job.take()
    }

    pub(crate) fn park_question(&mut self, question: String) {
        self.pending_ask = Some(PendingAsk {
            question,
            awaiting_ingest: true,
        });
    }

    pub(crate) fn submit_question(&mut self, question: String) {
        self.pending_ask = Some(PendingAsk {
            question,
            awaiting_ingest: false,
        });
    }

    pub(crate) fn take_pending_ask(&mut self) -> Option<PendingAsk> {
        self.pending_ask.take()
    }

    pub(crate) fn mark_ingested(&mut self) {
        self.has_ingested_files = true;
    }

    pub(crate) fn adopt_session_id(&mut self, id: SessionId) {
        self.active_session_id = Some(id);
        self.mark_dirty();
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = Some(title);
        self.mark_dirty();
    }

    pub(crate) fn set_sessions(&mut self, sessions: Vec<SessionSummary>) {
        if self.sessions != sessions {
            self.sessions = sessions;
            self.mark_dirty();
        }
    }

    pub(crate) fn most_recent_session_id(&self) -> Option<SessionId> {
        self.sessions.first().map(|entry| entry.id.clone())
    }

    pub(crate) fn set_startup_complete(&mut self) {
        self.startup_complete = true;
    }

    /// Auto-resume precondition: startup done, nothing active, nothing
    /// started by the user, and not already fired this process.
    pub(crate) fn should_auto_resume(&self) -> bool {
        self.startup_complete
            && !self.auto_resumed
            && self.active_session_id.is_none()
            && !self.conversation_started
    }

    pub(crate) fn mark_auto_resumed(&mut self) {
        self.auto_resumed = true;
    }

    /// Replace the active transcript with a server-held session.
    pub(crate) fn apply_loaded_session(&mut self, session: LoadedSession) {
        self.active_session_id = Some(session.id);
        self.title = Some(session.title);
        self.conversation_started = true;
        self.transcript = session
            .turns
            .into_iter()
            .map(|turn| ChatTurn {
                speaker: turn.speaker,
                body: turn.body,
                sources: turn.sources_markup.map(Sources::Markup),
            })
            .collect();
        self.notice = None;
        self.mark_dirty();
    }

    /// Back to the welcome screen. The session list, the ingestion flag and
    /// the auto-resume latch survive; the gate must not be held.
    pub(crate) fn reset_conversation(&mut self) {
        self.active_session_id = None;
        self.title = None;
        self.transcript.clear();
        self.conversation_started = false;
        self.files.clear();
        self.input.clear();
        self.pending_job = None;
        self.pending_ask = None;
        self.activity = None;
        self.notice = None;
        self.mark_dirty();
    }
}
