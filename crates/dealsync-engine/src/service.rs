//! Entry points for route handlers and maintenance tooling.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::engine::{SweepReport, SyncDirection, SyncEngine, SyncError, SyncStatus, VinSyncReport};
use crate::scheduler::{ReconciliationScheduler, SchedulerStatus};
use crate::SyncConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum SchedulerCommand {
    Start,
    Stop,
    SetInterval { minutes: u64 },
    Status,
}

#[derive(Clone)]
pub struct SyncService {
    engine: Arc<SyncEngine>,
    scheduler: ReconciliationScheduler,
}

impl SyncService {
    pub fn new(engine: Arc<SyncEngine>, period: Duration) -> Self {
        let scheduler = ReconciliationScheduler::new(engine.clone(), period);
        Self { engine, scheduler }
    }

    pub fn from_config(engine: SyncEngine, config: &SyncConfig) -> Self {
        let engine = Arc::new(engine.with_policy(config.conflict_policy));
        Self::new(engine, config.sync_interval())
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn scheduler(&self) -> &ReconciliationScheduler {
        &self.scheduler
    }

    /// Starts periodic sweeps only when the deployment opted in.
    pub fn maybe_start_scheduler(&self, config: &SyncConfig) -> bool {
        if !config.scheduler_enabled {
            info!("reconciliation scheduler disabled by configuration");
            return false;
        }
        self.scheduler.start()
    }

    pub async fn trigger_targeted_sync(
        &self,
        vin: &str,
        direction: SyncDirection,
    ) -> Result<VinSyncReport, SyncError> {
        info!(vin, %direction, "targeted sync requested");
        self.engine.sync_deal_by_vin(vin, direction).await
    }

    pub async fn trigger_full_sync(&self) -> Result<SweepReport, SyncError> {
        info!("full sync requested");
        self.engine.sync_all_deals().await
    }

    pub async fn query_status(&self, vin: &str) -> Result<SyncStatus, SyncError> {
        self.engine.get_sync_status(vin).await
    }

    /// Applies `command` and reports the resulting scheduler state.
    pub fn scheduler_control(&self, command: SchedulerCommand) -> Result<SchedulerStatus, SyncError> {
        match command {
            SchedulerCommand::Start => {
                self.scheduler.start();
            }
            SchedulerCommand::Stop => {
                self.scheduler.stop();
            }
            SchedulerCommand::SetInterval { minutes } => {
                let period = Duration::from_secs(minutes.saturating_mul(60));
                self.scheduler.update_interval(period)?;
            }
            SchedulerCommand::Status => {}
        }
        Ok(self.scheduler.status())
    }
}
