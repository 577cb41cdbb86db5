use std::sync::{mpsc, Arc};
use std::thread;

use client_logging::client_warn;

use crate::client::{ApiClient, ClientSettings};
use crate::poll::PollSettings;
use crate::runner::{JobRunner, JobSink};
use crate::sessions::{SessionReplay, SessionRepository};
use crate::types::{ApiError, AskOutcome, JobEvent, JobKind, JobStatus, SessionEntry};

enum BackendCommand {
    RunJob {
        kind: JobKind,
    },
    Ask {
        question: String,
        session_id: Option<String>,
    },
    ListSessions,
    LoadSession {
        id: String,
    },
    DeleteSession {
        id: String,
    },
    ProbeStatus,
}

/// Results surfaced to the platform layer.
#[derive(Debug)]
pub enum BackendEvent {
    Job(JobEvent),
    Answer {
        result: Result<AskOutcome, ApiError>,
    },
    Sessions {
        result: Result<Vec<SessionEntry>, ApiError>,
    },
    Session {
        result: Result<SessionReplay, ApiError>,
    },
    SessionDeleted {
        id: String,
        result: Result<(), ApiError>,
    },
    Status {
        result: Result<JobStatus, ApiError>,
    },
}

/// Owns the backend runtime thread; commands in, events out.
///
/// Commands run concurrently on the runtime. Mutual exclusion between jobs
/// and questions is the state machine's responsibility, not this handle's;
/// session reads are free to interleave with a running job's polling.
pub struct BackendHandle {
    commander: BackendCommander,
    event_rx: mpsc::Receiver<BackendEvent>,
}

/// Cloneable command half of a `BackendHandle`.
#[derive(Clone)]
pub struct BackendCommander {
    cmd_tx: mpsc::Sender<BackendCommand>,
}

impl BackendHandle {
    pub fn new(settings: ClientSettings, poll: PollSettings) -> Result<Self, ApiError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let client = Arc::new(ApiClient::new(settings)?);

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(client.as_ref(), poll, command, event_tx).await;
                });
            }
        });

        Ok(Self {
            commander: BackendCommander { cmd_tx },
            event_rx,
        })
    }

    pub fn commander(&self) -> BackendCommander {
        self.commander.clone()
    }

    pub fn try_recv(&self) -> Option<BackendEvent> {
        self.event_rx.try_recv().ok()
    }
}

impl BackendCommander {
    pub fn run_job(&self, kind: JobKind) {
        self.send(BackendCommand::RunJob { kind });
    }

    pub fn ask(&self, question: impl Into<String>, session_id: Option<String>) {
        self.send(BackendCommand::Ask {
            question: question.into(),
            session_id,
        });
    }

    pub fn list_sessions(&self) {
        self.send(BackendCommand::ListSessions);
    }

    pub fn load_session(&self, id: impl Into<String>) {
        self.send(BackendCommand::LoadSession { id: id.into() });
    }

    pub fn delete_session(&self, id: impl Into<String>) {
        self.send(BackendCommand::DeleteSession { id: id.into() });
    }

    pub fn probe_status(&self) {
        self.send(BackendCommand::ProbeStatus);
    }

    fn send(&self, command: BackendCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

struct ChannelJobSink {
    tx: mpsc::Sender<BackendEvent>,
}

impl JobSink for ChannelJobSink {
    fn emit(&self, event: JobEvent) {
        let _ = self.tx.send(BackendEvent::Job(event));
    }
}

async fn handle_command(
    client: &ApiClient,
    poll: PollSettings,
    command: BackendCommand,
    event_tx: mpsc::Sender<BackendEvent>,
) {
    match command {
        BackendCommand::RunJob { kind } => {
            let sink = ChannelJobSink { tx: event_tx };
            let runner = JobRunner::new(client, poll);
            // Terminal events reach the UI through the sink.
            if let Err(err) = runner.run(kind, &sink).await {
                client_warn!("Ingestion job failed: {}", err);
            }
        }
        BackendCommand::Ask {
            question,
            session_id,
        } => {
            let result = client.ask(&question, session_id.as_deref()).await;
            let _ = event_tx.send(BackendEvent::Answer { result });
        }
        BackendCommand::ListSessions => {
            let result = SessionRepository::new(client).list().await;
            let _ = event_tx.send(BackendEvent::Sessions { result });
        }
        BackendCommand::LoadSession { id } => {
            let result = SessionRepository::new(client).load(&id).await;
            let _ = event_tx.send(BackendEvent::Session { result });
        }
        BackendCommand::DeleteSession { id } => {
            let result = SessionRepository::new(client).delete(&id).await;
            let _ = event_tx.send(BackendEvent::SessionDeleted { id, result });
        }
        BackendCommand::ProbeStatus => {
            let result = client.status().await;
            let _ = event_tx.send(BackendEvent::Status { result });
        }
    }
}
