use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use client_logging::{client_info, client_warn};
use docchat_backend::{
    BackendCommander, BackendEvent, BackendHandle, ClientSettings, JobEvent, JobKind, PollSettings,
    Role, SessionReplay, StagedUpload,
};
use docchat_core::{
    Effect, LoadedSession, Msg, ReplayedTurn, SelectedFile, SessionSummary, Speaker,
};

use super::app::AppEvent;
use super::persistence::AppConfig;

/// Executes core effects against the backend and feeds backend events back
/// into the message loop.
pub(crate) struct EffectRunner {
    backend: BackendCommander,
}

impl EffectRunner {
    pub fn new(config: &AppConfig, tx: mpsc::Sender<AppEvent>) -> anyhow::Result<Self> {
        let settings = ClientSettings {
            base_url: config.backend_url.clone(),
            connect_timeout: config.connect_timeout,
            request_timeout: config.request_timeout,
        };
        let poll = PollSettings {
            interval: config.poll_interval,
            max_ticks: config.max_poll_ticks,
        };
        let handle = BackendHandle::new(settings, poll)?;
        let backend = handle.commander();
        spawn_event_loop(handle, tx);
        Ok(Self { backend })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RunUploadJob { files } => {
                    client_info!("RunUploadJob files={}", files.len());
                    self.backend.run_job(JobKind::Upload {
                        files: files.into_iter().map(staged_upload).collect(),
                    });
                }
                Effect::RunCrawlJob {
                    base_url,
                    max_pages,
                } => {
                    client_info!("RunCrawlJob url={} max_pages={}", base_url, max_pages);
                    self.backend.run_job(JobKind::Crawl {
                        base_url,
                        max_pages,
                    });
                }
                Effect::SubmitQuestion {
                    question,
                    session_id,
                } => {
                    client_info!(
                        "SubmitQuestion len={} session={:?}",
                        question.len(),
                        session_id
                    );
                    self.backend.ask(question, session_id);
                }
                Effect::RefreshSessions => self.backend.list_sessions(),
                Effect::LoadSession { id } => self.backend.load_session(id),
                Effect::DeleteSession { id } => self.backend.delete_session(id),
                Effect::ProbeStatus => self.backend.probe_status(),
            }
        }
    }
}

fn staged_upload(file: SelectedFile) -> StagedUpload {
    StagedUpload {
        name: file.name,
        path: file.path,
        content_type: file.content_type,
    }
}

fn spawn_event_loop(handle: BackendHandle, tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        if let Some(event) = handle.try_recv() {
            if let Some(msg) = map_event(event) {
                if tx.send(AppEvent::Core(msg)).is_err() {
                    break;
                }
            }
        } else {
            thread::sleep(Duration::from_millis(20));
        }
    });
}

fn map_event(event: BackendEvent) -> Option<Msg> {
    match event {
        BackendEvent::Job(JobEvent::Started) => {
            client_info!("Ingestion job started");
            None
        }
        BackendEvent::Job(JobEvent::Progress {
            processed,
            total,
            chunks,
        }) => Some(Msg::JobProgress {
            processed,
            total,
            chunks,
        }),
        BackendEvent::Job(JobEvent::Completed { processed, chunks }) => {
            Some(Msg::JobCompleted { processed, chunks })
        }
        BackendEvent::Job(JobEvent::Failed { message }) => Some(Msg::JobFailed { message }),
        BackendEvent::Answer { result } => Some(match result {
            Ok(outcome) => Msg::AnswerReceived {
                answer: outcome.answer,
                sources: outcome.sources,
                session_id: outcome.session_id,
            },
            Err(err) => Msg::AskFailed {
                message: err.to_string(),
            },
        }),
        BackendEvent::Sessions { result } => match result {
            Ok(entries) => Some(Msg::SessionsListed {
                sessions: entries
                    .into_iter()
                    .map(|entry| SessionSummary {
                        id: entry.id,
                        title: entry.title,
                        last_activity: entry.last_activity,
                    })
                    .collect(),
            }),
            Err(err) => {
                client_warn!("Failed to fetch sessions: {}", err);
                None
            }
        },
        BackendEvent::Session { result } => Some(match result {
            Ok(replay) => Msg::SessionLoaded {
                session: loaded_session(replay),
            },
            Err(err) => {
                client_warn!("Failed to load session: {}", err);
                Msg::SessionLoadFailed {
                    message: "Error loading conversation".to_string(),
                }
            }
        }),
        BackendEvent::SessionDeleted { id, result } => Some(match result {
            Ok(()) => Msg::SessionDeleted { id },
            Err(err) => Msg::SessionDeleteFailed {
                message: err.to_string(),
            },
        }),
        BackendEvent::Status { result } => match result {
            Ok(status) => Some(Msg::StatusProbed {
                chunks_created: status.chunks_created,
            }),
            Err(err) => {
                client_warn!("Initial status probe failed: {}", err);
                None
            }
        },
    }
}

fn loaded_session(replay: SessionReplay) -> LoadedSession {
    LoadedSession {
        id: replay.id,
        title: replay.title,
        last_activity: replay.last_activity,
        turns: replay
            .messages
            .into_iter()
            .map(|message| ReplayedTurn {
                speaker: match message.role {
                    Role::User => Speaker::User,
                    Role::Assistant => Speaker::Assistant,
                },
                body: message.body,
                sources_markup: message.sources_markup,
            })
            .collect(),
    }
}
