use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::features::sessions::services::SessionService;

/// Background worker closing sessions whose client went away without
/// deleting them
pub struct SessionSweeper {
    service: Arc<SessionService>,
    every: Duration,
}

impl SessionSweeper {
    pub fn new(service: Arc<SessionService>) -> Self {
        let every = service.config().sweep_interval;
        Self { service, every }
    }

    /// Run the sweeper in a background loop
    pub async fn run(&self) {
        tracing::info!(
            "Starting session sweeper (every {}s, idle timeout {}s)",
            self.every.as_secs(),
            self.service.config().idle_timeout.as_secs()
        );

        let mut interval = interval(self.every);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            self.service.sweep_idle().await;
        }
    }
}
