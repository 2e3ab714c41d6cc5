//! HTTP layer: axum handlers, status mapping, and router assembly.

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde_json::json;
use shared::{
    CreateBudgetRequest, CreateTransactionRequest, ErrorResponse, LoginRequest, LoginResponse,
    RegisterRequest, RegisterResponse,
};
use tracing::{error, info};

use crate::auth::{self, AuthUser};
use crate::config::Config;
use crate::db::DbConnection;
use crate::domain::{
    BudgetService, DomainError, ReportService, TransactionService, UserService,
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub transaction_service: TransactionService,
    pub budget_service: BudgetService,
    pub report_service: ReportService,
    pub config: Config,
}

impl AppState {
    pub fn new(db: DbConnection, config: Config) -> Self {
        Self {
            user_service: UserService::new(db.clone()),
            transaction_service: TransactionService::new(db.clone()),
            budget_service: BudgetService::new(db.clone()),
            report_service: ReportService::new(db),
            config,
        }
    }
}

/// Assemble the application router: public auth routes plus the protected
/// API behind the bearer-token guard.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/profile", get(profile))
        .route("/auth/logout", post(logout))
        .route("/transactions/add", post(add_transaction))
        .route("/transactions/get", get(get_transactions))
        .route("/budgets/add", post(add_budget))
        .route("/budgets/get", get(get_budgets))
        .route("/dashboard", get(dashboard))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    let api = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .merge(protected);

    Router::new()
        .route("/", get(root))
        .nest("/api", api)
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to the Expenses & Income API" }))
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> impl IntoResponse {
    info!("POST /api/auth/register - email: {}", request.email);

    match state.user_service.register(request).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(RegisterResponse { user_id: user.id }),
        )
            .into_response(),
        Err(e) => domain_error_response(e).into_response(),
    }
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    info!("POST /api/auth/login - email: {}", request.email);

    let user = match state.user_service.login(request).await {
        Ok(user) => user,
        Err(e) => return domain_error_response(e).into_response(),
    };

    match auth::encode_jwt(user.id, &state.config.jwt_secret) {
        Ok(token) => (
            StatusCode::OK,
            Json(LoginResponse {
                token,
                user_id: user.id,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to issue token: {:?}", e);
            server_error().into_response()
        }
    }
}

async fn profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> impl IntoResponse {
    info!("GET /api/auth/profile - user: {}", user.user_id);

    match state.user_service.profile(user.user_id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => domain_error_response(e).into_response(),
    }
}

/// Tokens are stateless, so logout is an acknowledgement; clients discard
/// the token.
async fn logout(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    info!("POST /api/auth/logout - user: {}", user.user_id);
    Json(json!({ "message": "Logged out" }))
}

async fn add_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    info!("POST /api/transactions/add - user: {}", user.user_id);

    match state
        .transaction_service
        .create_transaction(user.user_id, request)
        .await
    {
        Ok(transaction) => (StatusCode::CREATED, Json(transaction)).into_response(),
        Err(e) => domain_error_response(e).into_response(),
    }
}

async fn get_transactions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> impl IntoResponse {
    info!("GET /api/transactions/get - user: {}", user.user_id);

    match state
        .transaction_service
        .list_transactions(user.user_id)
        .await
    {
        Ok(transactions) => (StatusCode::OK, Json(transactions)).into_response(),
        Err(e) => domain_error_response(e).into_response(),
    }
}

async fn add_budget(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateBudgetRequest>,
) -> impl IntoResponse {
    info!("POST /api/budgets/add - user: {}", user.user_id);

    match state.budget_service.create_budget(user.user_id, request).await {
        Ok(budget) => (StatusCode::CREATED, Json(budget)).into_response(),
        Err(e) => domain_error_response(e).into_response(),
    }
}

async fn get_budgets(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> impl IntoResponse {
    info!("GET /api/budgets/get - user: {}", user.user_id);

    match state.budget_service.list_budgets(user.user_id).await {
        Ok(budgets) => (StatusCode::OK, Json(budgets)).into_response(),
        Err(e) => domain_error_response(e).into_response(),
    }
}

/// The monthly dashboard for the calendar month containing the server
/// clock's now. An empty month is a 200 with a zeroed report; only a store
/// failure becomes a 500.
async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> impl IntoResponse {
    info!("GET /api/dashboard - user: {}", user.user_id);

    match state
        .report_service
        .monthly_report(user.user_id, Utc::now())
        .await
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => domain_error_response(e).into_response(),
    }
}

fn domain_error_response(error: DomainError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &error {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        DomainError::EmailTaken => StatusCode::CONFLICT,
        DomainError::UserNotFound => StatusCode::NOT_FOUND,
        DomainError::Store(e) => {
            error!("Storage failure: {:?}", e);
            return server_error();
        }
    };

    (
        status,
        Json(ErrorResponse {
            message: error.to_string(),
        }),
    )
}

fn server_error() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            message: "Server error".to_string(),
        }),
    )
}
