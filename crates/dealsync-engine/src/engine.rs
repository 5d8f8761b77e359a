//! Pairwise stage propagation between the finance and sales ledgers.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use chrono::{DateTime, Utc};
use dealsync_core::{FinanceRecord, SalesRecord, Stage};
use dealsync_storage::{FinanceLedger, SalesLedger, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

pub const FINANCE_SYNC_NOTE: &str = "auto-synced from finance";
pub const ONE_SIDED_ISSUE: &str = "Deal exists in only one system";

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no deals found for VIN {vin}")]
    NoDealsForVin { vin: String },
    #[error("unknown sync direction {0:?} (expected both, finance-to-sales or sales-to-finance)")]
    UnknownDirection(String),
    #[error("unknown conflict policy {0:?} (expected last-pass-wins or newest-wins)")]
    UnknownPolicy(String),
    #[error("sync interval must be greater than zero")]
    InvalidInterval,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Decides which side may overwrite the other when both hold a canonical stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// No gate: every propagation is applied in pass order.
    #[default]
    LastPassWins,
    /// Propagate only when the source was updated no earlier than the target.
    NewestWins,
}

impl ConflictPolicy {
    fn allows(self, source_updated: DateTime<Utc>, target_updated: DateTime<Utc>) -> bool {
        match self {
            ConflictPolicy::LastPassWins => true,
            ConflictPolicy::NewestWins => source_updated >= target_updated,
        }
    }
}

impl FromStr for ConflictPolicy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last-pass-wins" => Ok(ConflictPolicy::LastPassWins),
            "newest-wins" => Ok(ConflictPolicy::NewestWins),
            other => Err(SyncError::UnknownPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncDirection {
    Both,
    FinanceToSales,
    SalesToFinance,
}

impl SyncDirection {
    fn includes_finance_to_sales(self) -> bool {
        matches!(self, SyncDirection::Both | SyncDirection::FinanceToSales)
    }

    fn includes_sales_to_finance(self) -> bool {
        matches!(self, SyncDirection::Both | SyncDirection::SalesToFinance)
    }
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncDirection::Both => "both",
            SyncDirection::FinanceToSales => "finance-to-sales",
            SyncDirection::SalesToFinance => "sales-to-finance",
        })
    }
}

impl FromStr for SyncDirection {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "both" => Ok(SyncDirection::Both),
            "finance-to-sales" => Ok(SyncDirection::FinanceToSales),
            "sales-to-finance" => Ok(SyncDirection::SalesToFinance),
            other => Err(SyncError::UnknownDirection(other.to_string())),
        }
    }
}

/// Result of a single-direction sync once the counterpart record was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum SyncOutcome<T> {
    Updated { record: T },
    AlreadyInSync { record: T },
    /// The source stage is outside the vocabulary; the counterpart was left untouched.
    InvalidStage { stage: String, record: T },
    /// The conflict policy kept the counterpart's value.
    Deferred { record: T },
}

impl<T> SyncOutcome<T> {
    pub fn record(&self) -> &T {
        match self {
            SyncOutcome::Updated { record }
            | SyncOutcome::AlreadyInSync { record }
            | SyncOutcome::InvalidStage { record, .. }
            | SyncOutcome::Deferred { record } => record,
        }
    }

    pub fn into_record(self) -> T {
        match self {
            SyncOutcome::Updated { record }
            | SyncOutcome::AlreadyInSync { record }
            | SyncOutcome::InvalidStage { record, .. }
            | SyncOutcome::Deferred { record } => record,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, SyncOutcome::Updated { .. })
    }
}

/// Counters for one full sweep.
///
/// `finance_to_sales` and `sales_to_finance` count operations that found a
/// counterpart, whether or not anything changed; `updated` counts actual writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SweepReport {
    pub finance_to_sales: usize,
    pub sales_to_finance: usize,
    pub updated: usize,
    pub failures: usize,
    pub duration_ms: u64,
}

impl SweepReport {
    pub fn synced(&self) -> usize {
        self.finance_to_sales + self.sales_to_finance
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VinSyncReport {
    pub vin: String,
    pub finance_to_sales: Option<SyncOutcome<SalesRecord>>,
    pub sales_to_finance: Option<SyncOutcome<FinanceRecord>>,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub vin: String,
    pub finance_deal: Option<FinanceRecord>,
    pub sales_deal: Option<SalesRecord>,
    pub in_sync: bool,
    pub sync_issues: Vec<String>,
}

pub struct SyncEngine {
    finance: FinanceLedger,
    sales: SalesLedger,
    policy: ConflictPolicy,
}

impl SyncEngine {
    pub fn new(finance: FinanceLedger, sales: SalesLedger) -> Self {
        Self {
            finance,
            sales,
            policy: ConflictPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Copies the finance stage onto the paired sales deal, logging the change in
    /// the sales history. `Ok(None)` when either side is missing.
    pub async fn sync_finance_to_sales(
        &self,
        finance_id: Uuid,
    ) -> Result<Option<SyncOutcome<SalesRecord>>, SyncError> {
        let Some(finance) = self.finance.find_by_id(finance_id).await? else {
            warn!(%finance_id, "finance deal not found");
            return Ok(None);
        };
        let Some(mut sales) = self.sales.find_by_vin(&finance.vin).await? else {
            warn!(vin = %finance.vin, "no sales deal for VIN");
            return Ok(None);
        };

        let Some(stage) = Stage::parse(&finance.current_stage) else {
            warn!(vin = %finance.vin, stage = %finance.current_stage, "finance deal has a non-canonical stage, not propagating");
            return Ok(Some(SyncOutcome::InvalidStage {
                stage: finance.current_stage,
                record: sales,
            }));
        };

        if sales.current_stage == stage.as_str() {
            return Ok(Some(SyncOutcome::AlreadyInSync { record: sales }));
        }

        if !self.policy.allows(finance.updated_at, sales.updated_at) {
            debug!(vin = %finance.vin, "sales deal changed more recently, keeping its stage");
            return Ok(Some(SyncOutcome::Deferred { record: sales }));
        }

        let from = sales.current_stage.clone();
        sales.enter_stage(stage, Utc::now(), Some(FINANCE_SYNC_NOTE.to_string()));
        let saved = self.sales.save(sales).await?;
        info!(vin = %saved.vin, %from, to = %stage, "synced finance stage to sales");
        Ok(Some(SyncOutcome::Updated { record: saved }))
    }

    /// Copies the sales stage onto the paired finance deal. Finance keeps no history,
    /// so only `current_stage` and `updated_at` change.
    pub async fn sync_sales_to_finance(
        &self,
        sales_id: Uuid,
    ) -> Result<Option<SyncOutcome<FinanceRecord>>, SyncError> {
        let Some(sales) = self.sales.find_by_id(sales_id).await? else {
            warn!(%sales_id, "sales deal not found");
            return Ok(None);
        };
        let Some(mut finance) = self.finance.find_by_vin(&sales.vin).await? else {
            warn!(vin = %sales.vin, "no finance deal for VIN");
            return Ok(None);
        };

        let Some(stage) = Stage::parse(&sales.current_stage) else {
            warn!(vin = %sales.vin, stage = %sales.current_stage, "sales deal has a non-canonical stage, not propagating");
            return Ok(Some(SyncOutcome::InvalidStage {
                stage: sales.current_stage,
                record: finance,
            }));
        };

        if finance.current_stage == stage.as_str() {
            return Ok(Some(SyncOutcome::AlreadyInSync { record: finance }));
        }

        if !self.policy.allows(sales.updated_at, finance.updated_at) {
            debug!(vin = %sales.vin, "finance deal changed more recently, keeping its stage");
            return Ok(Some(SyncOutcome::Deferred { record: finance }));
        }

        let from = finance.current_stage.clone();
        finance.set_stage(stage, Utc::now());
        let saved = self.finance.save(finance).await?;
        info!(vin = %saved.vin, %from, to = %stage, "synced sales stage to finance");
        Ok(Some(SyncOutcome::Updated { record: saved }))
    }

    /// Runs finance-to-sales over every finance deal, then sales-to-finance over every
    /// sales deal. A failing record is logged and counted; the sweep carries on.
    #[instrument(skip(self), fields(policy = ?self.policy))]
    pub async fn sync_all_deals(&self) -> Result<SweepReport, SyncError> {
        let started = Instant::now();
        let mut report = SweepReport::default();

        for finance in self.finance.find_all().await? {
            match self.sync_finance_to_sales(finance.id).await {
                Ok(Some(outcome)) => {
                    report.finance_to_sales += 1;
                    if outcome.is_updated() {
                        report.updated += 1;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    report.failures += 1;
                    error!(finance_id = %finance.id, vin = %finance.vin, error = %err, "finance-to-sales sync failed");
                }
            }
        }

        for sales in self.sales.find_all().await? {
            match self.sync_sales_to_finance(sales.id).await {
                Ok(Some(outcome)) => {
                    report.sales_to_finance += 1;
                    if outcome.is_updated() {
                        report.updated += 1;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    report.failures += 1;
                    error!(sales_id = %sales.id, vin = %sales.vin, error = %err, "sales-to-finance sync failed");
                }
            }
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            synced = report.synced(),
            updated = report.updated,
            failures = report.failures,
            duration_ms = report.duration_ms,
            "sweep finished"
        );
        Ok(report)
    }

    /// Targeted sync for one VIN. Both ledgers must hold a deal for it.
    pub async fn sync_deal_by_vin(
        &self,
        vin: &str,
        direction: SyncDirection,
    ) -> Result<VinSyncReport, SyncError> {
        let finance = self.finance.find_by_vin(vin).await?;
        let sales = self.sales.find_by_vin(vin).await?;
        let (Some(finance), Some(sales)) = (finance, sales) else {
            return Err(SyncError::NoDealsForVin {
                vin: vin.to_string(),
            });
        };

        let finance_to_sales = if direction.includes_finance_to_sales() {
            self.sync_finance_to_sales(finance.id).await?
        } else {
            None
        };
        let sales_to_finance = if direction.includes_sales_to_finance() {
            self.sync_sales_to_finance(sales.id).await?
        } else {
            None
        };

        let success = finance_to_sales.is_some() || sales_to_finance.is_some();
        Ok(VinSyncReport {
            vin: vin.to_string(),
            finance_to_sales,
            sales_to_finance,
            success,
        })
    }

    /// Read-only comparison of both sides of a VIN.
    pub async fn get_sync_status(&self, vin: &str) -> Result<SyncStatus, SyncError> {
        let finance_deal = self.finance.find_by_vin(vin).await?;
        let sales_deal = self.sales.find_by_vin(vin).await?;

        let (in_sync, sync_issues) = match (&finance_deal, &sales_deal) {
            (None, None) => {
                return Err(SyncError::NoDealsForVin {
                    vin: vin.to_string(),
                })
            }
            (Some(finance), Some(sales)) => {
                let mut issues = Vec::new();
                let in_sync = finance.current_stage == sales.current_stage;
                if !in_sync {
                    issues.push(format!(
                        "Stage mismatch: finance={}, sales={}",
                        finance.current_stage, sales.current_stage
                    ));
                    if finance.priority != sales.priority {
                        issues.push(format!(
                            "Priority mismatch: finance={}, sales={}",
                            finance.priority, sales.priority
                        ));
                    }
                }
                (in_sync, issues)
            }
            _ => (false, vec![ONE_SIDED_ISSUE.to_string()]),
        };

        Ok(SyncStatus {
            vin: vin.to_string(),
            finance_deal,
            sales_deal,
            in_sync,
            sync_issues,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};
    use dealsync_core::Priority;
    use dealsync_storage::{LedgerStore, MemoryLedger};

    const VIN: &str = "1HGCM82633A004352";

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 9, minute, 0).single().unwrap()
    }

    struct Fixture {
        finance: Arc<MemoryLedger<FinanceRecord>>,
        sales: Arc<MemoryLedger<SalesRecord>>,
        engine: SyncEngine,
    }

    fn fixture(policy: ConflictPolicy) -> Fixture {
        let finance = Arc::new(MemoryLedger::<FinanceRecord>::new("finance"));
        let sales = Arc::new(MemoryLedger::<SalesRecord>::new("sales"));
        let engine = SyncEngine::new(finance.clone(), sales.clone()).with_policy(policy);
        Fixture {
            finance,
            sales,
            engine,
        }
    }

    #[tokio::test]
    async fn finance_stage_propagates_to_sales_with_history() {
        let fx = fixture(ConflictPolicy::LastPassWins);
        let finance = fx
            .finance
            .insert(FinanceRecord::new(VIN, Stage::TitleProcessing, ts(0)))
            .await;
        fx.sales
            .insert(SalesRecord::new(VIN, Stage::ContractReceived, ts(0)))
            .await;

        let outcome = fx
            .engine
            .sync_finance_to_sales(finance.id)
            .await
            .unwrap()
            .expect("paired");
        assert!(outcome.is_updated());

        let sales = fx.sales.find_by_vin(VIN).await.unwrap().unwrap();
        assert_eq!(sales.current_stage, "title-processing");
        assert_eq!(sales.previous_stage.as_deref(), Some("contract-received"));
        let last = sales.stage_history.last().unwrap();
        assert_eq!(last.stage, "title-processing");
        assert_eq!(last.notes.as_deref(), Some(FINANCE_SYNC_NOTE));
        assert_eq!(outcome.record(), &sales);
    }

    #[tokio::test]
    async fn matching_stages_are_left_alone() {
        let fx = fixture(ConflictPolicy::LastPassWins);
        let finance = fx
            .finance
            .insert(FinanceRecord::new(VIN, Stage::DocsSigned, ts(0)))
            .await;
        let sales = fx
            .sales
            .insert(SalesRecord::new(VIN, Stage::DocsSigned, ts(0)))
            .await;

        for _ in 0..3 {
            let outcome = fx.engine.sync_finance_to_sales(finance.id).await.unwrap();
            assert!(matches!(outcome, Some(SyncOutcome::AlreadyInSync { .. })));
        }

        let after = fx.sales.find_by_id(sales.id).await.unwrap().unwrap();
        assert_eq!(after, sales);
        assert_eq!(after.stage_history.len(), 1);
    }

    #[tokio::test]
    async fn non_canonical_stages_never_propagate() {
        for bogus in ["", "Funded", "title_processing", "deal-complete ", "archived"] {
            let fx = fixture(ConflictPolicy::LastPassWins);
            let mut finance = FinanceRecord::new(VIN, Stage::DocsSigned, ts(0));
            finance.current_stage = bogus.to_string();
            let finance = fx.finance.insert(finance).await;
            let sales = fx
                .sales
                .insert(SalesRecord::new(VIN, Stage::ContractReceived, ts(0)))
                .await;

            let outcome = fx.engine.sync_finance_to_sales(finance.id).await.unwrap();
            assert!(
                matches!(outcome, Some(SyncOutcome::InvalidStage { ref stage, .. }) if stage == bogus)
            );
            assert_eq!(fx.sales.find_by_id(sales.id).await.unwrap().unwrap(), sales);

            let mut sales = sales;
            sales.current_stage = bogus.to_string();
            let sales = fx.sales.insert(sales).await;
            let outcome = fx.engine.sync_sales_to_finance(sales.id).await.unwrap();
            assert!(matches!(outcome, Some(SyncOutcome::InvalidStage { .. })));
            assert_eq!(
                fx.finance.find_by_id(finance.id).await.unwrap().unwrap(),
                finance
            );
        }
    }

    #[tokio::test]
    async fn sales_to_finance_does_not_touch_history() {
        let fx = fixture(ConflictPolicy::LastPassWins);
        fx.finance
            .insert(FinanceRecord::new(VIN, Stage::DocsSigned, ts(0)))
            .await;
        let mut sales = SalesRecord::new(VIN, Stage::DocsSigned, ts(0));
        sales.enter_stage(Stage::FundsDisbursed, ts(3), None);
        let sales = fx.sales.insert(sales).await;

        let outcome = fx
            .engine
            .sync_sales_to_finance(sales.id)
            .await
            .unwrap()
            .unwrap();
        let finance = outcome.into_record();
        assert_eq!(finance.current_stage, "funds-disbursed");
        assert!(finance.updated_at > ts(3));
        assert_eq!(finance.version, 1);

        let untouched = fx.sales.find_by_id(sales.id).await.unwrap().unwrap();
        assert_eq!(untouched, sales);
    }

    #[tokio::test]
    async fn missing_records_return_none() {
        let fx = fixture(ConflictPolicy::LastPassWins);
        let finance = fx
            .finance
            .insert(FinanceRecord::new(VIN, Stage::DocsSigned, ts(0)))
            .await;

        assert!(fx.engine.sync_finance_to_sales(finance.id).await.unwrap().is_none());
        assert!(fx.engine.sync_finance_to_sales(Uuid::new_v4()).await.unwrap().is_none());
        assert!(fx.engine.sync_sales_to_finance(Uuid::new_v4()).await.unwrap().is_none());

        let status = fx.engine.get_sync_status(VIN).await.unwrap();
        assert!(!status.in_sync);
        assert_eq!(status.sync_issues, vec![ONE_SIDED_ISSUE.to_string()]);
        assert!(status.sales_deal.is_none());
    }

    #[tokio::test]
    async fn status_reports_mismatches() {
        let fx = fixture(ConflictPolicy::LastPassWins);
        fx.finance
            .insert(FinanceRecord::new(VIN, Stage::DocsSigned, ts(0)).with_priority(Priority::High))
            .await;
        fx.sales
            .insert(SalesRecord::new(VIN, Stage::DocsSigned, ts(0)).with_priority(Priority::High))
            .await;

        let status = fx.engine.get_sync_status(VIN).await.unwrap();
        assert!(status.in_sync);
        assert!(status.sync_issues.is_empty());

        // Priority is only compared once the stages disagree.
        let mut sales = fx.sales.find_by_vin(VIN).await.unwrap().unwrap();
        sales.priority = Priority::Low;
        let mut sales = fx.sales.insert(sales).await;

        let status = fx.engine.get_sync_status(VIN).await.unwrap();
        assert!(status.in_sync);
        assert!(status.sync_issues.is_empty());

        sales.enter_stage(Stage::TitleProcessing, ts(1), None);
        fx.sales.insert(sales).await;

        let status = fx.engine.get_sync_status(VIN).await.unwrap();
        assert!(!status.in_sync);
        assert_eq!(
            status.sync_issues,
            vec![
                "Stage mismatch: finance=docs-signed, sales=title-processing".to_string(),
                "Priority mismatch: finance=high, sales=low".to_string(),
            ]
        );

        let err = fx.engine.get_sync_status("NOPE").await.unwrap_err();
        assert!(matches!(err, SyncError::NoDealsForVin { .. }));
    }

    #[tokio::test]
    async fn targeted_sync_requires_both_sides() {
        let fx = fixture(ConflictPolicy::LastPassWins);
        fx.sales
            .insert(SalesRecord::new(VIN, Stage::DocsSigned, ts(0)))
            .await;

        let err = fx
            .engine
            .sync_deal_by_vin(VIN, SyncDirection::Both)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("no deals found for VIN {VIN}"));
    }

    #[tokio::test]
    async fn targeted_sync_honours_direction() {
        let fx = fixture(ConflictPolicy::LastPassWins);
        fx.finance
            .insert(FinanceRecord::new(VIN, Stage::FundsDisbursed, ts(0)))
            .await;
        fx.sales
            .insert(SalesRecord::new(VIN, Stage::DocsSigned, ts(0)))
            .await;

        let report = fx
            .engine
            .sync_deal_by_vin(VIN, SyncDirection::SalesToFinance)
            .await
            .unwrap();
        assert!(report.success);
        assert!(report.finance_to_sales.is_none());
        assert!(report.sales_to_finance.as_ref().unwrap().is_updated());
        let finance = fx.finance.find_by_vin(VIN).await.unwrap().unwrap();
        assert_eq!(finance.current_stage, "docs-signed");

        let report = fx
            .engine
            .sync_deal_by_vin(VIN, SyncDirection::Both)
            .await
            .unwrap();
        assert!(matches!(report.finance_to_sales, Some(SyncOutcome::AlreadyInSync { .. })));
        assert!(matches!(report.sales_to_finance, Some(SyncOutcome::AlreadyInSync { .. })));
    }

    #[tokio::test]
    async fn sweep_converges_on_the_first_pass_by_default() {
        let fx = fixture(ConflictPolicy::LastPassWins);
        fx.finance
            .insert(FinanceRecord::new(VIN, Stage::TitleReceived, ts(30)))
            .await;
        fx.sales
            .insert(SalesRecord::new(VIN, Stage::DocsSigned, ts(0)))
            .await;

        let report = fx.engine.sync_all_deals().await.unwrap();
        // finance-to-sales writes title-received, sales-to-finance then agrees.
        assert_eq!(report.synced(), 2);
        assert_eq!(report.updated, 1);
        assert_eq!(report.failures, 0);

        let finance = fx.finance.find_by_vin(VIN).await.unwrap().unwrap();
        let sales = fx.sales.find_by_vin(VIN).await.unwrap().unwrap();
        assert_eq!(finance.current_stage, "title-received");
        assert_eq!(sales.current_stage, "title-received");
    }

    #[tokio::test]
    async fn newest_wins_keeps_the_fresher_side() {
        let fx = fixture(ConflictPolicy::NewestWins);
        let finance = fx
            .finance
            .insert(FinanceRecord::new(VIN, Stage::DocsSigned, ts(0)))
            .await;
        let mut sales = SalesRecord::new(VIN, Stage::ContractReceived, ts(0));
        sales.enter_stage(Stage::FundsDisbursed, ts(0) + Duration::minutes(10), None);
        let sales = fx.sales.insert(sales).await;

        let outcome = fx.engine.sync_finance_to_sales(finance.id).await.unwrap();
        assert!(matches!(outcome, Some(SyncOutcome::Deferred { .. })));
        assert_eq!(fx.sales.find_by_id(sales.id).await.unwrap().unwrap(), sales);

        let report = fx.engine.sync_all_deals().await.unwrap();
        assert_eq!(report.updated, 1);
        let finance = fx.finance.find_by_vin(VIN).await.unwrap().unwrap();
        assert_eq!(finance.current_stage, "funds-disbursed");
    }

    #[test]
    fn direction_and_policy_parse_from_wire_names() {
        assert_eq!("both".parse::<SyncDirection>().unwrap(), SyncDirection::Both);
        assert_eq!(
            "finance-to-sales".parse::<SyncDirection>().unwrap(),
            SyncDirection::FinanceToSales
        );
        assert!(matches!(
            "sideways".parse::<SyncDirection>(),
            Err(SyncError::UnknownDirection(_))
        ));
        assert_eq!(
            "newest-wins".parse::<ConflictPolicy>().unwrap(),
            ConflictPolicy::NewestWins
        );
        assert_eq!(SyncDirection::SalesToFinance.to_string(), "sales-to-finance");
    }
}
