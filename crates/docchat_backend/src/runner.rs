use client_logging::{client_info, client_warn};

use crate::client::ApiClient;
use crate::poll::{PollError, PollSettings, StatusPoller};
use crate::types::{ApiError, JobEvent, JobKind, JobOutcome};

/// Receives job lifecycle events as they happen.
pub trait JobSink: Send + Sync {
    fn emit(&self, event: JobEvent);
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("{0}")]
    Submission(ApiError),
    #[error("{0}")]
    Poll(PollError),
    #[error("status polling ended unexpectedly")]
    Interrupted,
}

/// Drives one ingestion unit: a single submission request, then the shared
/// status endpoint polled to its terminal state.
pub struct JobRunner<'a> {
    client: &'a ApiClient,
    poll: PollSettings,
}

impl<'a> JobRunner<'a> {
    pub fn new(client: &'a ApiClient, poll: PollSettings) -> Self {
        Self { client, poll }
    }

    pub async fn run(&self, kind: JobKind, sink: &dyn JobSink) -> Result<JobOutcome, JobError> {
        sink.emit(JobEvent::Started);

        let submitted = match &kind {
            JobKind::Upload { files } => self.client.upload(files).await,
            JobKind::Crawl {
                base_url,
                max_pages,
            } => self.client.index_website(base_url, *max_pages).await,
        };
        if let Err(err) = submitted {
            client_warn!("Job submission failed: {}", err);
            sink.emit(JobEvent::Failed {
                message: err.to_string(),
            });
            return Err(JobError::Submission(err));
        }

        let mut poller = StatusPoller::new(self.client, self.poll);
        let mut last_counts = None;
        let outcome = loop {
            match poller.next_status().await {
                Some(Ok(status)) if status.is_processing => {
                    let counts = (
                        status.processed_files,
                        status.total_files,
                        status.chunks_created,
                    );
                    // Identical consecutive counts are suppressed.
                    if last_counts != Some(counts) {
                        last_counts = Some(counts);
                        sink.emit(JobEvent::Progress {
                            processed: status.processed_files,
                            total: status.total_files,
                            chunks: status.chunks_created,
                        });
                    }
                }
                Some(Ok(status)) => {
                    break JobOutcome {
                        processed: status.processed_files,
                        chunks: status.chunks_created,
                    };
                }
                Some(Err(err)) => {
                    client_warn!("Status polling aborted the job: {}", err);
                    sink.emit(JobEvent::Failed {
                        message: err.to_string(),
                    });
                    return Err(JobError::Poll(err));
                }
                None => {
                    sink.emit(JobEvent::Failed {
                        message: JobError::Interrupted.to_string(),
                    });
                    return Err(JobError::Interrupted);
                }
            }
        };

        client_info!(
            "Job finished: {} processed, {} chunks",
            outcome.processed,
            outcome.chunks
        );
        sink.emit(JobEvent::Completed {
            processed: outcome.processed,
            chunks: outcome.chunks,
        });
        Ok(outcome)
    }
}
