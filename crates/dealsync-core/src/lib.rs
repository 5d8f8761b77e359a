//! Core ledger model shared by the finance and sales sides of a deal.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const CRATE_NAME: &str = "dealsync-core";

/// Workflow stage of a deal, in the order a deal normally moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    ContractReceived,
    DocsSigned,
    TitleProcessing,
    FundsDisbursed,
    TitleReceived,
    DealComplete,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::ContractReceived,
        Stage::DocsSigned,
        Stage::TitleProcessing,
        Stage::FundsDisbursed,
        Stage::TitleReceived,
        Stage::DealComplete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::ContractReceived => "contract-received",
            Stage::DocsSigned => "docs-signed",
            Stage::TitleProcessing => "title-processing",
            Stage::FundsDisbursed => "funds-disbursed",
            Stage::TitleReceived => "title-received",
            Stage::DealComplete => "deal-complete",
        }
    }

    /// Exact match against the canonical names. Anything else is not a stage.
    pub fn parse(raw: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| stage.as_str() == raw)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Stage {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::parse(s).ok_or_else(|| UnknownValue {
            kind: "stage",
            value: s.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(UnknownValue {
                kind: "priority",
                value: other.to_string(),
            }),
        }
    }
}

/// One entry of the sales-side stage log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageHistoryEntry {
    pub stage: String,
    pub entered_at: DateTime<Utc>,
    #[serde(default)]
    pub exited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Common accessors the stores need, regardless of which ledger a record lives in.
pub trait LedgerRecord: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    fn vin(&self) -> &str;
    fn current_stage(&self) -> &str;
    fn version(&self) -> i64;
    fn set_version(&mut self, version: i64);
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
}

/// Finance-side view of a deal. Carries no stage history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceRecord {
    pub id: Uuid,
    pub vin: String,
    pub current_stage: String,
    pub priority: Priority,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinanceRecord {
    pub fn new(vin: impl Into<String>, stage: Stage, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            vin: vin.into(),
            current_stage: stage.as_str().to_string(),
            priority: Priority::default(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn set_stage(&mut self, stage: Stage, at: DateTime<Utc>) {
        self.current_stage = stage.as_str().to_string();
        self.updated_at = at;
    }
}

/// Sales-side view of a deal, with its append-only stage log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub id: Uuid,
    pub vin: String,
    pub current_stage: String,
    pub previous_stage: Option<String>,
    pub priority: Priority,
    pub stage_history: Vec<StageHistoryEntry>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SalesRecord {
    pub fn new(vin: impl Into<String>, stage: Stage, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            vin: vin.into(),
            current_stage: stage.as_str().to_string(),
            previous_stage: None,
            priority: Priority::default(),
            stage_history: vec![StageHistoryEntry {
                stage: stage.as_str().to_string(),
                entered_at: now,
                exited_at: None,
                duration_ms: None,
                notes: None,
            }],
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Moves the deal into `stage`: shifts the current stage into `previous_stage`,
    /// closes the open history entry and appends a new one.
    pub fn enter_stage(&mut self, stage: Stage, at: DateTime<Utc>, notes: Option<String>) {
        if let Some(open) = self
            .stage_history
            .last_mut()
            .filter(|entry| entry.exited_at.is_none())
        {
            open.exited_at = Some(at);
            open.duration_ms = Some((at - open.entered_at).num_milliseconds().max(0));
        }

        let previous = std::mem::replace(&mut self.current_stage, stage.as_str().to_string());
        self.previous_stage = Some(previous);
        self.stage_history.push(StageHistoryEntry {
            stage: stage.as_str().to_string(),
            entered_at: at,
            exited_at: None,
            duration_ms: None,
            notes,
        });
        self.updated_at = at;
    }
}

macro_rules! impl_ledger_record {
    ($ty:ty) => {
        impl LedgerRecord for $ty {
            fn id(&self) -> Uuid {
                self.id
            }

            fn vin(&self) -> &str {
                &self.vin
            }

            fn current_stage(&self) -> &str {
                &self.current_stage
            }

            fn version(&self) -> i64 {
                self.version
            }

            fn set_version(&mut self, version: i64) {
                self.version = version;
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }

            fn updated_at(&self) -> DateTime<Utc> {
                self.updated_at
            }
        }
    };
}

impl_ledger_record!(FinanceRecord);
impl_ledger_record!(SalesRecord);
