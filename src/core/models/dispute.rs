use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Serialized names match the persisted values, do not rename them.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum DisputeStage {
    Disputed,
    Resolved,
    Pending,
}

/// Record of a party unilaterally withdrawing from a pending transaction.
/// Resolution of disputes is handled outside this service.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Dispute {
    pub dispute_id: Uuid,
    pub transaction_id: Uuid,
    pub user_initiated: Uuid,
    pub reason: String,
    pub stage: DisputeStage,
}

impl Dispute {
    pub fn new(transaction_id: Uuid, user_initiated: Uuid, reason: String) -> Self {
        Dispute {
            dispute_id: Uuid::new_v4(),
            transaction_id,
            user_initiated,
            reason,
            stage: DisputeStage::Disputed,
        }
    }
}
