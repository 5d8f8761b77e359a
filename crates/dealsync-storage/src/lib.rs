//! Ledger persistence for the finance and sales sides of a deal.
//!
//! Both ledgers sit behind the same narrow [`LedgerStore`] capability. Writes are
//! version-checked: a `save` only lands if the caller read the latest version, so
//! concurrent targeted and scheduled syncs cannot silently overwrite each other.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dealsync_core::{FinanceRecord, LedgerRecord, Priority, SalesRecord, StageHistoryEntry};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub const CRATE_NAME: &str = "dealsync-storage";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{ledger} record {id} was modified concurrently (expected version {expected})")]
    Conflict {
        ledger: &'static str,
        id: Uuid,
        expected: i64,
    },
    #[error("could not decode column {column}: {message}")]
    Decode { column: &'static str, message: String },
    /// Failure reported by a `LedgerStore` implementation outside this crate.
    #[error("{0}")]
    Backend(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Persistence capability for one ledger. A missing row is `Ok(None)`, not an error.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    type Record: LedgerRecord;

    fn ledger_name(&self) -> &'static str;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Self::Record>, StoreError>;

    /// Earliest-created record for `vin` when duplicates exist.
    async fn find_by_vin(&self, vin: &str) -> Result<Option<Self::Record>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Self::Record>, StoreError>;

    /// Conditional write: fails with [`StoreError::Conflict`] unless the stored
    /// version still equals `record.version()`. Returns the record at its new version.
    async fn save(&self, record: Self::Record) -> Result<Self::Record, StoreError>;
}

pub type FinanceLedger = Arc<dyn LedgerStore<Record = FinanceRecord>>;
pub type SalesLedger = Arc<dyn LedgerStore<Record = SalesRecord>>;

/// In-process ledger keyed by record id.
#[derive(Debug)]
pub struct MemoryLedger<R> {
    name: &'static str,
    rows: RwLock<BTreeMap<Uuid, R>>,
}

impl<R: LedgerRecord> MemoryLedger<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    /// Seeds a record as-is, bypassing the version check.
    pub async fn insert(&self, record: R) -> R {
        self.rows.write().await.insert(record.id(), record.clone());
        record
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn creation_order<R: LedgerRecord>(a: &R, b: &R) -> std::cmp::Ordering {
    a.created_at()
        .cmp(&b.created_at())
        .then_with(|| a.id().cmp(&b.id()))
}

#[async_trait]
impl<R: LedgerRecord> LedgerStore for MemoryLedger<R> {
    type Record = R;

    fn ledger_name(&self) -> &'static str {
        self.name
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<R>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_vin(&self, vin: &str) -> Result<Option<R>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|r| r.vin() == vin)
            .min_by(|a, b| creation_order(*a, *b))
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<R>, StoreError> {
        let mut all = self.rows.read().await.values().cloned().collect::<Vec<_>>();
        all.sort_by(creation_order);
        Ok(all)
    }

    async fn save(&self, mut record: R) -> Result<R, StoreError> {
        let mut rows = self.rows.write().await;
        if let Some(existing) = rows.get(&record.id()) {
            if existing.version() != record.version() {
                return Err(StoreError::Conflict {
                    ledger: self.name,
                    id: record.id(),
                    expected: record.version(),
                });
            }
        }
        record.set_version(record.version() + 1);
        rows.insert(record.id(), record.clone());
        debug!(ledger = self.name, id = %record.id(), version = record.version(), "saved ledger record");
        Ok(record)
    }
}

pub async fn connect(database_url: &str) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

fn decode_priority(row: &PgRow) -> Result<Priority, StoreError> {
    let raw: String = row.try_get("priority")?;
    raw.parse().map_err(|err: dealsync_core::UnknownValue| StoreError::Decode {
        column: "priority",
        message: err.to_string(),
    })
}

fn finance_from_row(row: &PgRow) -> Result<FinanceRecord, StoreError> {
    Ok(FinanceRecord {
        id: row.try_get("id")?,
        vin: row.try_get("vin")?,
        current_stage: row.try_get("current_stage")?,
        priority: decode_priority(row)?,
        version: row.try_get("version")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn sales_from_row(row: &PgRow) -> Result<SalesRecord, StoreError> {
    let history: Json<Vec<StageHistoryEntry>> = row.try_get("stage_history")?;
    Ok(SalesRecord {
        id: row.try_get("id")?,
        vin: row.try_get("vin")?,
        current_stage: row.try_get("current_stage")?,
        previous_stage: row.try_get("previous_stage")?,
        priority: decode_priority(row)?,
        stage_history: history.0,
        version: row.try_get("version")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

const FINANCE_COLUMNS: &str = "id, vin, current_stage, priority, version, created_at, updated_at";
const SALES_COLUMNS: &str = "id, vin, current_stage, previous_stage, priority, stage_history, version, created_at, updated_at";

/// Finance ledger backed by the `finance_deals` table.
#[derive(Debug, Clone)]
pub struct PgFinanceLedger {
    pool: PgPool,
}

impl PgFinanceLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgFinanceLedger {
    type Record = FinanceRecord;

    fn ledger_name(&self) -> &'static str {
        "finance"
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FinanceRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {FINANCE_COLUMNS} FROM finance_deals WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(finance_from_row).transpose()
    }

    async fn find_by_vin(&self, vin: &str) -> Result<Option<FinanceRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {FINANCE_COLUMNS} FROM finance_deals WHERE vin = $1 ORDER BY created_at, id LIMIT 1"
        ))
        .bind(vin)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(finance_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<FinanceRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {FINANCE_COLUMNS} FROM finance_deals ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(finance_from_row).collect()
    }

    async fn save(&self, mut record: FinanceRecord) -> Result<FinanceRecord, StoreError> {
        let next_version = record.version + 1;
        let updated = sqlx::query(
            r#"
            UPDATE finance_deals
               SET vin = $2,
                   current_stage = $3,
                   priority = $4,
                   updated_at = $5,
                   version = $6
             WHERE id = $1
               AND version = $7
            "#,
        )
        .bind(record.id)
        .bind(&record.vin)
        .bind(&record.current_stage)
        .bind(record.priority.as_str())
        .bind(record.updated_at)
        .bind(next_version)
        .bind(record.version)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            let inserted = sqlx::query(
                r#"
                INSERT INTO finance_deals (id, vin, current_stage, priority, version, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(record.id)
            .bind(&record.vin)
            .bind(&record.current_stage)
            .bind(record.priority.as_str())
            .bind(next_version)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await?;

            if inserted.rows_affected() == 0 {
                return Err(StoreError::Conflict {
                    ledger: "finance",
                    id: record.id,
                    expected: record.version,
                });
            }
        }

        record.version = next_version;
        Ok(record)
    }
}

/// Sales ledger backed by the `sales_deals` table; history is a JSONB array.
#[derive(Debug, Clone)]
pub struct PgSalesLedger {
    pool: PgPool,
}

impl PgSalesLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgSalesLedger {
    type Record = SalesRecord;

    fn ledger_name(&self) -> &'static str {
        "sales"
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SalesRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {SALES_COLUMNS} FROM sales_deals WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(sales_from_row).transpose()
    }

    async fn find_by_vin(&self, vin: &str) -> Result<Option<SalesRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {SALES_COLUMNS} FROM sales_deals WHERE vin = $1 ORDER BY created_at, id LIMIT 1"
        ))
        .bind(vin)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(sales_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<SalesRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {SALES_COLUMNS} FROM sales_deals ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(sales_from_row).collect()
    }

    async fn save(&self, mut record: SalesRecord) -> Result<SalesRecord, StoreError> {
        let next_version = record.version + 1;
        let updated = sqlx::query(
            r#"
            UPDATE sales_deals
               SET vin = $2,
                   current_stage = $3,
                   previous_stage = $4,
                   priority = $5,
                   stage_history = $6,
                   updated_at = $7,
                   version = $8
             WHERE id = $1
               AND version = $9
            "#,
        )
        .bind(record.id)
        .bind(&record.vin)
        .bind(&record.current_stage)
        .bind(&record.previous_stage)
        .bind(record.priority.as_str())
        .bind(Json(&record.stage_history))
        .bind(record.updated_at)
        .bind(next_version)
        .bind(record.version)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            let inserted = sqlx::query(
                r#"
                INSERT INTO sales_deals
                    (id, vin, current_stage, previous_stage, priority, stage_history, version, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(record.id)
            .bind(&record.vin)
            .bind(&record.current_stage)
            .bind(&record.previous_stage)
            .bind(record.priority.as_str())
            .bind(Json(&record.stage_history))
            .bind(next_version)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await?;

            if inserted.rows_affected() == 0 {
                return Err(StoreError::Conflict {
                    ledger: "sales",
                    id: record.id,
                    expected: record.version,
                });
            }
        }

        record.version = next_version;
        Ok(record)
    }
}
