use std::time::Duration;

use crate::client::ApiClient;
use crate::types::{ApiError, JobStatus};

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Suspension between consecutive status fetches.
    pub interval: Duration,
    /// Upper bound on fetches; `None` polls until the backend turns idle.
    pub max_ticks: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_ticks: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("job did not finish after {ticks} status checks")]
    DeadlineExceeded { ticks: u32 },
}

/// Lazy status sequence with an explicit terminal state.
///
/// Each call to `next_status` issues one fetch and yields the result. The
/// first status with `is_processing` false is terminal; so is any error.
/// Once terminal, further calls return `None` without touching the network.
#[derive(Debug)]
pub struct StatusPoller<'a> {
    client: &'a ApiClient,
    settings: PollSettings,
    ticks: u32,
    finished: bool,
}

impl<'a> StatusPoller<'a> {
    pub fn new(client: &'a ApiClient, settings: PollSettings) -> Self {
        Self {
            client,
            settings,
            ticks: 0,
            finished: false,
        }
    }

    pub async fn next_status(&mut self) -> Option<Result<JobStatus, PollError>> {
        if self.finished {
            return None;
        }
        if let Some(max) = self.settings.max_ticks {
            if self.ticks >= max {
                self.finished = true;
                return Some(Err(PollError::DeadlineExceeded { ticks: max }));
            }
        }
        if self.ticks > 0 {
            tokio::time::sleep(self.settings.interval).await;
        }
        self.ticks += 1;

        match self.client.status().await {
            Ok(status) => {
                if !status.is_processing {
                    self.finished = true;
                }
                Some(Ok(status))
            }
            Err(err) => {
                // Polling transport errors abort the owning job, no retry.
                self.finished = true;
                Some(Err(PollError::Api(err)))
            }
        }
    }
}
