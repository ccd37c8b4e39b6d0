use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, FromRequest, FromRequestParts, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use shelf_audit_application::{
    ApplicationError, ApplicationService, CreateSessionCommand, ExportChecklistPdfCommand,
    ExportFile, ExportSessionCsvCommand, ImportMasterCommand, ListSessionsCommand,
    ListSnapshotsQuery, OpenSessionCommand, PartHistoryQuery, RecordSnapshotCommand,
    SearchPartsCommand, SessionProgressQuery, SessionView, SetQuantityCommand,
    ToggleLocationCommand,
};
use shelf_audit_domain::{
    CountDetail, CountSession, ImportReport, LocationId, ResultSnapshot, SessionId,
    SessionProgress,
};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::config::AppConfig;

#[derive(Clone)]
struct AppState {
    service: Arc<ApplicationService>,
}

pub async fn serve(service: Arc<ApplicationService>, config: AppConfig) -> Result<(), String> {
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|e| format!("failed to bind HTTP on {}: {e}", config.bind_addr))?;
    info!(
        bind_addr = %config.bind_addr,
        database = %config.database_path,
        "shelf-audit HTTP API ready"
    );

    axum::serve(listener, router(service, config.max_upload_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("HTTP server error: {e}"))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

pub fn router(service: Arc<ApplicationService>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/master/import", post(import_master))
        .route("/api/parts", get(search_parts))
        .route(
            "/api/parts/{part}/sessions",
            get(list_sessions).post(create_session),
        )
        .route("/api/parts/{part}/sessions/{session}", get(open_session))
        .route("/api/parts/{part}/history", get(part_history))
        .route("/api/parts/{part}/snapshots", get(list_snapshots))
        .route("/api/parts/{part}/checklist.pdf", get(checklist_pdf))
        .route("/api/sessions/{session}/toggle", post(toggle_location))
        .route("/api/sessions/{session}/quantity", post(set_quantity))
        .route("/api/sessions/{session}/progress", get(session_progress))
        .route("/api/sessions/{session}/snapshots", post(record_snapshot))
        .route("/api/sessions/{session}/export.csv", get(export_csv))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(AppState { service })
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        let status = match &err {
            ApplicationError::NotFound(_) => StatusCode::NOT_FOUND,
            other if other.is_validation() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(%err, "request failed");
        } else {
            debug!(%err, status = status.as_u16(), "request rejected");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Extractors whose rejections answer with the JSON error body and status 400.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
struct ApiJson<T>(T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
struct ApiPath<T>(T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
struct ApiQuery<T>(T);

/// SQLite work runs off the async executor.
async fn run_blocking<T, F>(state: &AppState, job: F) -> Result<T, ApiError>
where
    F: FnOnce(&ApplicationService) -> Result<T, ApplicationError> + Send + 'static,
    T: Send + 'static,
{
    let service = Arc::clone(&state.service);
    tokio::task::spawn_blocking(move || job(&service))
        .await
        .map_err(|e| ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("worker task failed: {e}"),
        })?
        .map_err(ApiError::from)
}

fn session_id(raw: i64) -> Result<SessionId, ApiError> {
    SessionId::new(raw).map_err(|e| ApiError::from(ApplicationError::from(e)))
}

fn location_id(raw: i64) -> Result<LocationId, ApiError> {
    LocationId::new(raw).map_err(|e| ApiError::from(ApplicationError::from(e)))
}

fn download(file: ExportFile) -> Response {
    (
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.bytes,
    )
        .into_response()
}

async fn health() -> impl IntoResponse {
    "ok"
}

async fn import_master(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportReport>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some((file_name, bytes.to_vec()));
    }
    let (file_name, bytes) =
        upload.ok_or_else(|| ApiError::bad_request("multipart field `file` is required"))?;

    info!(file_name = %file_name, bytes = bytes.len(), "master upload received");
    let report = run_blocking(&state, move |service| {
        service.import_master(ImportMasterCommand { file_name, bytes })
    })
    .await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search_parts(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<Vec<String>>, ApiError> {
    let parts = run_blocking(&state, move |service| {
        service.search_parts(SearchPartsCommand { query: params.q })
    })
    .await?;
    Ok(Json(parts))
}

async fn list_sessions(
    State(state): State<AppState>,
    ApiPath(part): ApiPath<String>,
) -> Result<Json<Vec<CountSession>>, ApiError> {
    let sessions = run_blocking(&state, move |service| {
        service.list_sessions(ListSessionsCommand { part_number: part })
    })
    .await?;
    Ok(Json(sessions))
}

#[derive(Debug, Deserialize)]
struct CreateSessionBody {
    operator_name: String,
    #[serde(default)]
    comment: Option<String>,
}

async fn create_session(
    State(state): State<AppState>,
    ApiPath(part): ApiPath<String>,
    ApiJson(body): ApiJson<CreateSessionBody>,
) -> Result<(StatusCode, Json<CountSession>), ApiError> {
    let session = run_blocking(&state, move |service| {
        service.create_session(CreateSessionCommand {
            part_number: part,
            operator_name: body.operator_name,
            comment: body.comment,
        })
    })
    .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn open_session(
    State(state): State<AppState>,
    ApiPath((part, session)): ApiPath<(String, i64)>,
) -> Result<Json<SessionView>, ApiError> {
    let session_id = session_id(session)?;
    let view = run_blocking(&state, move |service| {
        service.open_session(OpenSessionCommand {
            part_number: part,
            session_id,
        })
    })
    .await?;
    Ok(Json(view))
}

async fn part_history(
    State(state): State<AppState>,
    ApiPath(part): ApiPath<String>,
) -> Result<Json<Vec<SessionProgress>>, ApiError> {
    let history = run_blocking(&state, move |service| {
        service.part_history(PartHistoryQuery { part_number: part })
    })
    .await?;
    Ok(Json(history))
}

async fn list_snapshots(
    State(state): State<AppState>,
    ApiPath(part): ApiPath<String>,
) -> Result<Json<Vec<ResultSnapshot>>, ApiError> {
    let snapshots = run_blocking(&state, move |service| {
        service.list_snapshots(ListSnapshotsQuery { part_number: part })
    })
    .await?;
    Ok(Json(snapshots))
}

async fn checklist_pdf(
    State(state): State<AppState>,
    ApiPath(part): ApiPath<String>,
) -> Result<Response, ApiError> {
    let file = run_blocking(&state, move |service| {
        service.export_checklist_pdf(ExportChecklistPdfCommand { part_number: part })
    })
    .await?;
    Ok(download(file))
}

#[derive(Debug, Deserialize)]
struct ToggleBody {
    location_id: i64,
    checked: bool,
}

async fn toggle_location(
    State(state): State<AppState>,
    ApiPath(session): ApiPath<i64>,
    ApiJson(body): ApiJson<ToggleBody>,
) -> Result<Json<CountDetail>, ApiError> {
    let command = ToggleLocationCommand {
        session_id: session_id(session)?,
        location_id: location_id(body.location_id)?,
        checked: body.checked,
    };
    let detail = run_blocking(&state, move |service| service.toggle_location(command)).await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
struct QuantityBody {
    location_id: i64,
    #[serde(default)]
    quantity: Option<String>,
}

async fn set_quantity(
    State(state): State<AppState>,
    ApiPath(session): ApiPath<i64>,
    ApiJson(body): ApiJson<QuantityBody>,
) -> Result<Json<CountDetail>, ApiError> {
    let command = SetQuantityCommand {
        session_id: session_id(session)?,
        location_id: location_id(body.location_id)?,
        quantity: body.quantity.unwrap_or_default(),
    };
    let detail = run_blocking(&state, move |service| service.set_quantity(command)).await?;
    Ok(Json(detail))
}

async fn session_progress(
    State(state): State<AppState>,
    ApiPath(session): ApiPath<i64>,
) -> Result<Json<SessionProgress>, ApiError> {
    let session_id = session_id(session)?;
    let progress = run_blocking(&state, move |service| {
        service.session_progress(SessionProgressQuery { session_id })
    })
    .await?;
    Ok(Json(progress))
}

async fn record_snapshot(
    State(state): State<AppState>,
    ApiPath(session): ApiPath<i64>,
) -> Result<(StatusCode, Json<ResultSnapshot>), ApiError> {
    let session_id = session_id(session)?;
    let snapshot = run_blocking(&state, move |service| {
        service.record_snapshot(RecordSnapshotCommand { session_id })
    })
    .await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

async fn export_csv(
    State(state): State<AppState>,
    ApiPath(session): ApiPath<i64>,
) -> Result<Response, ApiError> {
    let session_id = session_id(session)?;
    let file = run_blocking(&state, move |service| {
        service.export_session_csv(ExportSessionCsvCommand { session_id })
    })
    .await?;
    Ok(download(file))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use shelf_audit_application::BootstrapInventoryCommand;
    use tower::ServiceExt;

    use super::*;
    use crate::build_application_service;

    const BOUNDARY: &str = "shelfauditboundary";

    fn test_app(dir: &tempfile::TempDir) -> Router {
        let config = AppConfig::default().with_database(Some(
            dir.path().join("audit.sqlite3").to_string_lossy().into_owned(),
        ));
        let service = build_application_service(&config);
        service
            .bootstrap_inventory(BootstrapInventoryCommand)
            .expect("bootstrap");
        router(Arc::new(service), config.max_upload_bytes)
    }

    fn upload(file_name: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/api/master/import")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    fn post_json(uri: &str, value: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("request")
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        (status, bytes.to_vec())
    }

    async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = send(app, request).await;
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    async fn seeded_session(app: &Router) -> Value {
        let (status, _) = send(
            app,
            upload("master.csv", "PN;Ubicación;Descripción\nP1;A-01;Tornillo\nP1;A-02;Tuerca"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, session) = send_json(
            app,
            post_json("/api/parts/P1/sessions", json!({ "operator_name": "Ana" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        session
    }

    #[tokio::test]
    async fn health_is_ok() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(&dir);
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn import_reports_counts_and_feeds_search() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(&dir);

        let (status, report) = send_json(
            &app,
            upload("master.csv", "Part Number,Location\nP1,A-01\nP1,A-01\nP22,B-01\n,C-01"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["imported"], 2);
        assert_eq!(report["duplicates_dropped"], 1);
        assert_eq!(report["rows_skipped"], 1);

        let (status, parts) = send_json(&app, get("/api/parts?q=p2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parts, json!(["P22"]));
    }

    #[tokio::test]
    async fn import_without_location_column_is_bad_request() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(&dir);

        let (status, body) = send_json(&app, upload("master.csv", "PN;Notes\nP1;x")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().expect("message").contains("Notes"));
    }

    #[tokio::test]
    async fn toggle_updates_progress() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(&dir);
        let session = seeded_session(&app).await;
        let session_id = session["id"].as_i64().expect("session id");

        let (status, view) =
            send_json(&app, get(&format!("/api/parts/P1/sessions/{session_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["rows"].as_array().expect("rows").len(), 2);
        let location_id = view["rows"][0]["location"]["id"].as_i64().expect("location id");

        let (status, detail) = send_json(
            &app,
            post_json(
                &format!("/api/sessions/{session_id}/toggle"),
                json!({ "location_id": location_id, "checked": true }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["checked"], true);

        let (status, progress) =
            send_json(&app, get(&format!("/api/sessions/{session_id}/progress"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(progress["progress"]["checked"], 1);
        assert_eq!(progress["progress"]["total"], 2);
        assert_eq!(progress["progress"]["percentage"], 50.0);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(&dir);

        let (status, body) = send_json(
            &app,
            post_json(
                "/api/sessions/99/toggle",
                json!({ "location_id": 1, "checked": true }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn non_numeric_quantity_is_bad_request() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(&dir);
        let session = seeded_session(&app).await;
        let session_id = session["id"].as_i64().expect("session id");

        let (status, _) = send_json(
            &app,
            post_json(
                &format!("/api/sessions/{session_id}/quantity"),
                json!({ "location_id": 1, "quantity": "abc" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn session_without_operator_is_bad_request_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(&dir);

        let (status, body) = send_json(
            &app,
            post_json("/api/parts/P1/sessions", json!({ "comment": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .expect("message")
            .contains("operator_name"));
    }

    #[tokio::test]
    async fn non_numeric_session_id_is_bad_request_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(&dir);

        let (status, body) = send_json(&app, get("/api/sessions/abc/progress")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn numeric_quantity_field_is_bad_request_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(&dir);
        let session = seeded_session(&app).await;
        let session_id = session["id"].as_i64().expect("session id");

        let (status, body) = send_json(
            &app,
            post_json(
                &format!("/api/sessions/{session_id}/quantity"),
                json!({ "location_id": 1, "quantity": 5 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn csv_export_is_an_attachment() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(&dir);
        let session = seeded_session(&app).await;
        let session_id = session["id"].as_i64().expect("session id");

        let response = app
            .clone()
            .oneshot(get(&format!("/api/sessions/{session_id}/export.csv")))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert_eq!(
            disposition,
            format!("attachment; filename=\"session_{session_id}_P1.csv\"")
        );
        let body = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        assert!(body.starts_with(b"\xEF\xBB\xBF"));
    }

    #[tokio::test]
    async fn checklist_for_unknown_part_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(&dir);
        let (status, _) = send(&app, get("/api/parts/NOPE/checklist.pdf")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn snapshots_are_recorded_and_listed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(&dir);
        let session = seeded_session(&app).await;
        let session_id = session["id"].as_i64().expect("session id");

        let (status, snapshot) = send_json(
            &app,
            post_json(&format!("/api/sessions/{session_id}/snapshots"), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(snapshot["total"], 2);
        assert_eq!(snapshot["checked_count"], 0);

        let (status, listed) = send_json(&app, get("/api/parts/P1/snapshots")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().expect("snapshots").len(), 1);
    }
}
