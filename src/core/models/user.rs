use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String, // bcrypt hash at rest
    /// Internal ledger balance. Mutated only by the settlement engine.
    pub balance: Decimal,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, email: String, password: String) -> Self {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username,
            email,
            password,
            balance: Decimal::ZERO,
            created_date: now,
            modified_date: now,
        }
    }
}
