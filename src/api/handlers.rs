use crate::{
    api::models::*,
    auth::jwt::Claims,
    core::{
        errors::EsgrowError,
        models::{audit::AppLog, dispute::Dispute, transaction::EscrowTransaction, user::User},
        services::{EsgrowService, UserTransactionsResponse},
    },
    infrastructure::{logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryStorage},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
};
use http::header;
use uuid::Uuid;

use std::sync::Arc;

// Middleware to validate JWT
async fn auth_middleware(
    State(service): State<Arc<EsgrowService<InMemoryLogging, InMemoryStorage>>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| EsgrowError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| EsgrowError::Unauthorized("Invalid Authorization header".to_string()))?;

    let claims = service.validate_token(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

// Resolve the authenticated user from the validated claims.
async fn current_user(
    service: &EsgrowService<InMemoryLogging, InMemoryStorage>,
    claims: &Claims,
) -> Result<User, ApiError> {
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|e| EsgrowError::Unauthorized(format!("Invalid token subject: {}", e)))?;
    let user = service
        .get_user(user_id)
        .await?
        .ok_or_else(|| EsgrowError::UserNotFound(claims.sub.clone()))?;
    Ok(user)
}

// Define API routes
pub fn api_routes(service: Arc<EsgrowService<InMemoryLogging, InMemoryStorage>>) -> Router {
    let protected_routes = Router::new()
        .route("/transactions/view", axum::routing::get(view_transactions))
        .route("/transactions/create", axum::routing::post(create_transaction))
        .route("/transactions/{transaction_id}", axum::routing::get(get_transaction))
        .route(
            "/transactions/{transaction_id}/confirm",
            axum::routing::post(confirm_transaction),
        )
        .route(
            "/transactions/{transaction_id}/dispute",
            axum::routing::post(dispute_transaction),
        )
        .route(
            "/transactions/{transaction_id}/disputes",
            axum::routing::get(get_disputes),
        )
        .route("/logs", axum::routing::get(get_app_logs))
        .route_layer(middleware::from_fn_with_state(service.clone(), auth_middleware));

    Router::new()
        .route("/users/register", axum::routing::post(register_user))
        .route("/users/login", axum::routing::post(login))
        .merge(protected_routes)
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 409, description = "Username already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn register_user(
    State(service): State<Arc<EsgrowService<InMemoryLogging, InMemoryStorage>>>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (user, token) = service.register_user(req.username, req.email, req.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            id: user.id,
            username: user.username,
            email: user.email,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn login(
    State(service): State<Arc<EsgrowService<InMemoryLogging, InMemoryStorage>>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (user, token) = service.authenticate(&req.username, &req.password).await?;
    Ok(Json(AuthResponse {
        token,
        id: user.id,
        username: user.username,
        email: user.email,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/transactions/view",
    responses(
        (status = 200, description = "Transactions for the authenticated user, partitioned by role", body = UserTransactionsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn view_transactions(
    State(service): State<Arc<EsgrowService<InMemoryLogging, InMemoryStorage>>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserTransactionsResponse>, ApiError> {
    let user = current_user(&service, &claims).await?;
    let transactions = service.list_transactions_for_user(&user).await?;
    Ok(Json(transactions))
}

#[utoipa::path(
    post,
    path = "/api/v1/transactions/create",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Escrow transaction created", body = EscrowTransaction),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 403, description = "Caller is not a party", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn create_transaction(
    State(service): State<Arc<EsgrowService<InMemoryLogging, InMemoryStorage>>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<EscrowTransaction>), ApiError> {
    let user = current_user(&service, &claims).await?;
    let transaction = service
        .create_transaction(req.from_user_id, req.to_user_id, req.amount, &user)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

#[utoipa::path(
    get,
    path = "/api/v1/transactions/{transaction_id}",
    params(
        ("transaction_id" = Uuid, Path, description = "ID of the transaction")
    ),
    responses(
        (status = 200, description = "Transaction retrieved", body = EscrowTransaction),
        (status = 403, description = "Caller is not a party", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn get_transaction(
    State(service): State<Arc<EsgrowService<InMemoryLogging, InMemoryStorage>>>,
    Extension(claims): Extension<Claims>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<EscrowTransaction>, ApiError> {
    let user = current_user(&service, &claims).await?;
    let transaction = service.get_transaction(transaction_id, &user).await?;
    Ok(Json(transaction))
}

#[utoipa::path(
    post,
    path = "/api/v1/transactions/{transaction_id}/confirm",
    params(
        ("transaction_id" = Uuid, Path, description = "ID of the transaction")
    ),
    responses(
        (status = 200, description = "Confirmation recorded, possibly settled", body = EscrowTransaction),
        (status = 403, description = "Caller is not a party", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 409, description = "Transaction is closed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn confirm_transaction(
    State(service): State<Arc<EsgrowService<InMemoryLogging, InMemoryStorage>>>,
    Extension(claims): Extension<Claims>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<EscrowTransaction>, ApiError> {
    let user = current_user(&service, &claims).await?;
    let transaction = service.confirm_transaction(transaction_id, &user).await?;
    Ok(Json(transaction))
}

#[utoipa::path(
    post,
    path = "/api/v1/transactions/{transaction_id}/dispute",
    params(
        ("transaction_id" = Uuid, Path, description = "ID of the transaction")
    ),
    request_body = DisputeTransactionRequest,
    responses(
        (status = 200, description = "Transaction cancelled", body = EscrowTransaction),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 403, description = "Caller is not a party", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 409, description = "Transaction already completed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn dispute_transaction(
    State(service): State<Arc<EsgrowService<InMemoryLogging, InMemoryStorage>>>,
    Extension(claims): Extension<Claims>,
    Path(transaction_id): Path<Uuid>,
    Json(req): Json<DisputeTransactionRequest>,
) -> Result<Json<EscrowTransaction>, ApiError> {
    let user = current_user(&service, &claims).await?;
    let transaction = service.dispute_transaction(transaction_id, req.reason, &user).await?;
    Ok(Json(transaction))
}

#[utoipa::path(
    get,
    path = "/api/v1/transactions/{transaction_id}/disputes",
    params(
        ("transaction_id" = Uuid, Path, description = "ID of the transaction")
    ),
    responses(
        (status = 200, description = "Disputes recorded against the transaction", body = [Dispute]),
        (status = 403, description = "Caller is not a party", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn get_disputes(
    State(service): State<Arc<EsgrowService<InMemoryLogging, InMemoryStorage>>>,
    Extension(claims): Extension<Claims>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<Vec<Dispute>>, ApiError> {
    let user = current_user(&service, &claims).await?;
    let disputes = service.get_disputes(transaction_id, &user).await?;
    Ok(Json(disputes))
}

#[utoipa::path(
    get,
    path = "/api/v1/logs",
    responses(
        (status = 200, description = "Application logs", body = [AppLog]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn get_app_logs(
    State(service): State<Arc<EsgrowService<InMemoryLogging, InMemoryStorage>>>,
) -> Result<Json<Vec<AppLog>>, ApiError> {
    let logs = service.get_app_logs().await?;
    Ok(Json(logs))
}
