#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use dealsync_core::{FinanceRecord, LedgerRecord, SalesRecord};
use dealsync_engine::SyncEngine;
use dealsync_storage::{LedgerStore, MemoryLedger, StoreError};
use tokio::sync::Semaphore;
use uuid::Uuid;

pub fn ts(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 6, 8, minute, 0).single().unwrap()
}

/// Wraps a ledger, counting `find_all` calls and optionally holding them until
/// permits are released, panicking in them, or failing writes for chosen ids.
pub struct InstrumentedLedger<R> {
    inner: Arc<MemoryLedger<R>>,
    find_all_calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
    panic_on_find_all: bool,
    failing_saves: HashSet<Uuid>,
}

impl<R: LedgerRecord> InstrumentedLedger<R> {
    pub fn new(inner: Arc<MemoryLedger<R>>) -> Self {
        Self {
            inner,
            find_all_calls: AtomicUsize::new(0),
            gate: None,
            panic_on_find_all: false,
            failing_saves: HashSet::new(),
        }
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn panicking_find_all(mut self) -> Self {
        self.panic_on_find_all = true;
        self
    }

    pub fn failing_save_for(mut self, id: Uuid) -> Self {
        self.failing_saves.insert(id);
        self
    }

    pub fn find_all_calls(&self) -> usize {
        self.find_all_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<R: LedgerRecord> LedgerStore for InstrumentedLedger<R> {
    type Record = R;

    fn ledger_name(&self) -> &'static str {
        self.inner.ledger_name()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<R>, StoreError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_vin(&self, vin: &str) -> Result<Option<R>, StoreError> {
        self.inner.find_by_vin(vin).await
    }

    async fn find_all(&self) -> Result<Vec<R>, StoreError> {
        self.find_all_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_find_all {
            panic!("{} ledger unavailable", self.inner.ledger_name());
        }
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| StoreError::Backend("gate closed".into()))?;
            permit.forget();
        }
        self.inner.find_all().await
    }

    async fn save(&self, record: R) -> Result<R, StoreError> {
        if self.failing_saves.contains(&record.id()) {
            return Err(StoreError::Backend(format!("write rejected for {}", record.id())));
        }
        self.inner.save(record).await
    }
}

pub struct Ledgers {
    pub finance: Arc<MemoryLedger<FinanceRecord>>,
    pub sales: Arc<MemoryLedger<SalesRecord>>,
}

impl Ledgers {
    pub fn new() -> Self {
        Self {
            finance: Arc::new(MemoryLedger::new("finance")),
            sales: Arc::new(MemoryLedger::new("sales")),
        }
    }

    pub fn engine(&self) -> SyncEngine {
        SyncEngine::new(self.finance.clone(), self.sales.clone())
    }
}
