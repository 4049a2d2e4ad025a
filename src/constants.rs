// Application log action names.
pub const USER_REGISTERED: &str = "user_registered";
pub const USER_LOGGED_IN: &str = "user_logged_in";
pub const TRANSACTION_CREATED: &str = "transaction_created";
pub const TRANSACTION_CONFIRMED: &str = "transaction_confirmed";
pub const TRANSACTION_SETTLED: &str = "transaction_settled";
pub const TRANSACTION_DISPUTED: &str = "transaction_disputed";
pub const TRANSACTIONS_QUERIED: &str = "transactions_queried";
