use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle stage of an escrow transaction. The serialized names match the
/// values persisted by existing deployments, do not rename them.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum TransactionStage {
    Initiated,
    Pending,
    Completed,
    Cancelled,
}

impl std::fmt::Display for TransactionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransactionStage::Initiated => "Initiated",
            TransactionStage::Pending => "Pending",
            TransactionStage::Completed => "Completed",
            TransactionStage::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}

impl TransactionStage {
    /// Completed and Cancelled transactions accept no further confirmations
    /// or disputes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStage::Completed | TransactionStage::Cancelled)
    }
}

/// A proposed value transfer between two users, settled onto their balances
/// only once both parties have confirmed.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct EscrowTransaction {
    pub transaction_id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub amount: Decimal,
    pub stage: TransactionStage,

    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,

    // Whether/when the balances were mutated, kept for accountability.
    pub updated_on_users: bool,
    pub time_updated_on_users: Option<DateTime<Utc>>,

    pub from_user_confirmed: bool,
    pub from_user_confirmed_date: Option<DateTime<Utc>>,
    pub to_user_confirmed: bool,
    pub to_user_confirmed_date: Option<DateTime<Utc>>,
}

impl EscrowTransaction {
    pub fn new(from_user: Uuid, to_user: Uuid, amount: Decimal) -> Self {
        let now = Utc::now();
        EscrowTransaction {
            transaction_id: Uuid::new_v4(),
            from_user,
            to_user,
            amount,
            stage: TransactionStage::Initiated,
            created_date: now,
            modified_date: now,
            updated_on_users: false,
            time_updated_on_users: None,
            from_user_confirmed: false,
            from_user_confirmed_date: None,
            to_user_confirmed: false,
            to_user_confirmed_date: None,
        }
    }

    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.from_user == user_id || self.to_user == user_id
    }

    pub fn both_confirmed(&self) -> bool {
        self.from_user_confirmed && self.to_user_confirmed
    }
}
