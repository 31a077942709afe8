//! TicketTrack JSON API gateway.
//!
//! Exposes the ticket workflow, category/user administration, and tag
//! suggestion over HTTP. Store selection, mail transport, and the generation
//! backend all come from the environment; with nothing configured the server
//! runs self-contained on a seeded in-memory store.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use notifier::Dispatcher;
use store::{seed, MemoryStore, SqliteStore};
use tag_suggest::{ChatCompletionsBackend, DisabledBackend, GenerationBackend, TagSuggester};
use ticket_core::store::TicketQuery;
use ticket_core::{EntityStore, Feedback, Role, TicketStatus, TicketStore};
use workflow::{NewTicket, TicketService, WorkflowError};

#[derive(Clone)]
struct AppState {
    service: Arc<TicketService>,
    suggester: Arc<TagSuggester>,
}

/// Workflow errors mapped onto HTTP statuses.
struct ApiError(WorkflowError);

impl From<WorkflowError> for ApiError {
    fn from(e: WorkflowError) -> Self {
        Self(e)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            WorkflowError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            WorkflowError::NotFound { .. } => StatusCode::NOT_FOUND,
            WorkflowError::InvalidState(_) => StatusCode::CONFLICT,
            WorkflowError::InvalidRole { .. } => StatusCode::FORBIDDEN,
            WorkflowError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            warn!("Request failed: {}", self.0);
        }

        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
struct Health {
    status: String,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct TicketListParams {
    created_by: Option<String>,
    assigned_to: Option<String>,
}

async fn list_tickets(
    State(state): State<AppState>,
    Query(params): Query<TicketListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = TicketQuery {
        created_by: params.created_by,
        assigned_to: params.assigned_to,
    };
    let tickets = state.service.list_tickets(&query).await?;
    Ok(Json(tickets))
}

#[derive(Debug, Deserialize)]
struct CreateTicketBody {
    subject: String,
    description: String,
    category_id: String,
    creator_id: String,
    /// Accepted for form compatibility; attachment handling is a no-op.
    #[serde(default)]
    #[allow(dead_code)]
    attachment: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateTicketResponse {
    ticket: ticket_core::Ticket,
    notification: ticket_core::DeliveryReport,
}

async fn create_ticket(
    State(state): State<AppState>,
    Json(body): Json<CreateTicketBody>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .service
        .create_ticket(NewTicket {
            subject: body.subject,
            description: body.description,
            category_id: body.category_id,
            creator_id: body.creator_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTicketResponse {
            ticket: outcome.ticket,
            notification: outcome.notification,
        }),
    ))
}

async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.get_ticket(&id).await?))
}

#[derive(Debug, Deserialize)]
struct AddCommentBody {
    author_id: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct AddCommentResponse {
    comment: ticket_core::Comment,
    status: TicketStatus,
    notification: Option<ticket_core::DeliveryReport>,
}

async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AddCommentBody>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .service
        .add_comment(&id, &body.author_id, &body.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AddCommentResponse {
            comment: outcome.comment,
            status: outcome.status,
            notification: outcome.notification,
        }),
    ))
}

#[derive(Debug, Deserialize)]
struct AssignBody {
    agent_id: String,
}

async fn assign_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AssignBody>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.assign_ticket(&id, &body.agent_id).await?))
}

#[derive(Debug, Deserialize)]
struct TransitionBody {
    actor_id: String,
    status: TicketStatus,
}

async fn transition_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TransitionBody>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state
            .service
            .transition_status(&id, &body.actor_id, body.status)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
struct FeedbackBody {
    value: Feedback,
}

async fn set_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<FeedbackBody>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.set_feedback(&id, body.value).await?))
}

#[derive(Debug, Deserialize)]
struct SuggestBody {
    description: String,
}

#[derive(Debug, Serialize)]
struct SuggestResponse {
    success: bool,
    tags: Vec<String>,
}

async fn suggest_tags(
    State(state): State<AppState>,
    Json(body): Json<SuggestBody>,
) -> Json<SuggestResponse> {
    let outcome = state.suggester.suggest(&body.description).await;
    Json(SuggestResponse {
        success: outcome.success,
        tags: outcome.tags,
    })
}

async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.list_categories().await?))
}

#[derive(Debug, Deserialize)]
struct CategoryBody {
    name: String,
    #[serde(default)]
    description: String,
}

async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CategoryBody>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .service
        .create_category(&body.name, &body.description)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CategoryBody>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state
            .service
            .update_category(&id, &body.name, &body.description)
            .await?,
    ))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.delete_category(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.list_users().await?))
}

#[derive(Debug, Deserialize)]
struct RoleBody {
    role: Role,
}

async fn change_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RoleBody>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.change_role(&id, body.role).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.delete_user(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn record_login(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.record_login(&id).await?))
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/tickets", get(list_tickets).post(create_ticket))
        .route("/api/tickets/:id", get(get_ticket))
        .route("/api/tickets/:id/comments", post(add_comment))
        .route("/api/tickets/:id/assign", post(assign_ticket))
        .route("/api/tickets/:id/status", post(transition_status))
        .route("/api/tickets/:id/feedback", post(set_feedback))
        .route("/api/suggest-tags", post(suggest_tags))
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/:id",
            put(update_category).delete(delete_category),
        )
        .route("/api/users", get(list_users))
        .route("/api/users/:id", delete(delete_user))
        .route("/api/users/:id/role", patch(change_role))
        .route("/api/users/:id/login", post(record_login))
        .with_state(state)
}

/// Build the entity store from the environment: SQLite when `TICKETTRACK_DB`
/// is set, otherwise a seeded in-memory store.
async fn build_stores() -> Result<(Arc<dyn EntityStore>, Arc<dyn TicketStore>), Box<dyn std::error::Error>>
{
    match env::var("TICKETTRACK_DB") {
        Ok(url) if !url.trim().is_empty() => {
            let store = Arc::new(SqliteStore::connect(&url).await?);
            store.migrate().await?;
            let entities: Arc<dyn EntityStore> = store.clone();
            let tickets: Arc<dyn TicketStore> = store;
            Ok((entities, tickets))
        }
        _ => {
            info!("TICKETTRACK_DB not set; using seeded in-memory store");
            let store = Arc::new(MemoryStore::new());
            seed::seed_demo_data(store.as_ref()).await?;
            let entities: Arc<dyn EntityStore> = store.clone();
            let tickets: Arc<dyn TicketStore> = store;
            Ok((entities, tickets))
        }
    }
}

fn build_backend() -> Arc<dyn GenerationBackend> {
    match ChatCompletionsBackend::from_env() {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            warn!("Generation backend not configured ({e}); tag suggestion disabled");
            Arc::new(DisabledBackend)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let addr: SocketAddr = env::var("TICKETTRACK_API_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8787".to_string())
        .parse()?;

    let (entity_store, ticket_store) = build_stores().await?;
    let dispatcher = Arc::new(Dispatcher::from_env());
    let service = Arc::new(TicketService::new(entity_store, dispatcher));
    let suggester = Arc::new(TagSuggester::new(ticket_store, build_backend()));

    let state = AppState { service, suggester };

    info!("TicketTrack API listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    use super::*;
    use tag_suggest::MockBackend;
    use ticket_core::NullSink;

    async fn test_app() -> Router {
        let store = Arc::new(MemoryStore::new());
        seed::seed_demo_data(store.as_ref()).await.unwrap();

        let service = Arc::new(TicketService::new(store.clone(), Arc::new(NullSink)));
        let suggester = Arc::new(TagSuggester::new(
            store,
            Arc::new(MockBackend::with_tags(["login"])),
        ));
        app(AppState { service, suggester })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_ticket_roundtrip() {
        let app = test_app().await;

        let body = serde_json::json!({
            "subject": "Cannot login",
            "description": "Password reset emails never arrive.",
            "category_id": "cat-1",
            "creator_id": "user-1",
        });
        let response = app
            .oneshot(
                Request::post("/api/tickets")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = body_json(response).await;
        assert_eq!(json["ticket"]["id"], "TKT-005");
        assert_eq!(json["ticket"]["status"], "Open");
        assert_eq!(json["notification"]["delivered"], true);
    }

    #[tokio::test]
    async fn test_validation_maps_to_422() {
        let app = test_app().await;

        let body = serde_json::json!({
            "subject": "",
            "description": "x",
            "category_id": "cat-1",
            "creator_id": "user-1",
        });
        let response = app
            .oneshot(
                Request::post("/api/tickets")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_missing_ticket_maps_to_404() {
        let app = test_app().await;
        let response = app
            .oneshot(Request::get("/api/tickets/TKT-999").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_assign_non_agent_maps_to_403() {
        let app = test_app().await;

        let body = serde_json::json!({ "agent_id": "user-2" });
        let response = app
            .oneshot(
                Request::post("/api/tickets/TKT-003/assign")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_feedback_on_open_ticket_maps_to_409() {
        let app = test_app().await;

        let body = serde_json::json!({ "value": "upvote" });
        let response = app
            .oneshot(
                Request::post("/api/tickets/TKT-003/feedback")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_suggest_tags() {
        let app = test_app().await;

        let body = serde_json::json!({ "description": "I cannot log in" });
        let response = app
            .oneshot(
                Request::post("/api/suggest-tags")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["tags"][0], "login");
    }
}
