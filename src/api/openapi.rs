use utoipa::OpenApi;

use crate::{
    api::models::{
        AuthResponse, CreateTransactionRequest, DisputeTransactionRequest, ErrorResponse, LoginRequest,
        RegisterUserRequest,
    },
    core::{
        models::{
            audit::AppLog,
            dispute::{Dispute, DisputeStage},
            transaction::{EscrowTransaction, TransactionStage},
            user::User,
        },
        services::UserTransactionsResponse,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::register_user,
        super::handlers::login,
        super::handlers::view_transactions,
        super::handlers::create_transaction,
        super::handlers::get_transaction,
        super::handlers::confirm_transaction,
        super::handlers::dispute_transaction,
        super::handlers::get_disputes,
        super::handlers::get_app_logs
    ),
    components(schemas(
        RegisterUserRequest,
        LoginRequest,
        AuthResponse,
        CreateTransactionRequest,
        DisputeTransactionRequest,
        ErrorResponse,
        User,
        EscrowTransaction,
        TransactionStage,
        Dispute,
        DisputeStage,
        AppLog,
        UserTransactionsResponse
    )),
    info(
        title = "Esgrow API",
        description = "API for escrow transactions settled on bilateral confirmation",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
