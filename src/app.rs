use axum::{
    Form, Router,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::ingest;
use crate::login::{self, Role, Session};
use crate::mailer::Mailer;
use crate::report;
use crate::store::MovementStore;

pub struct AppState {
    store: Mutex<MovementStore>,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            store: Mutex::new(MovementStore::new()),
        }
    }
}

#[derive(Deserialize)]
pub struct EmailForm {
    subject: String,
    body: String,
    email: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login::serve_login_page).post(login::handle_login))
        .route("/logout", get(login::handle_logout))
        .route("/dashboard", get(dashboard))
        .route("/upload", get(serve_upload_form).post(handle_upload))
        .route("/tracking-log", get(tracking_log))
        .route("/generate-report", get(generate_report))
        .route("/send-email", get(serve_email_form).post(handle_send_email))
        .route("/download_excel", get(download_excel))
        .route("/download_pdf", get(download_pdf))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    config.init_export_dir()?;

    let state = Arc::new(AppState::new());
    let app = router(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    log::info!("listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index() -> Redirect {
    Redirect::to("/dashboard")
}

// Resolve the session and require the admin role; admin-only views treat a
// non-admin session exactly like no session at all.
fn require_admin(jar: &CookieJar) -> Result<Session, Response> {
    match login::session_from_jar(jar) {
        Some(session) if session.role == Role::Admin => Ok(session),
        _ => Err(Redirect::to("/login").into_response()),
    }
}

// Inject the record set into a page template as a JSON payload; the page's
// script renders the table client-side.
fn inject_records(template: &str, store: &MovementStore) -> String {
    let records_json =
        serde_json::to_string(store.records()).unwrap_or_else(|_| "[]".to_string());

    template.replace(
        "</head>",
        &format!(
            "    <script>const RECORDS = {};</script>\n</head>",
            records_json
        ),
    )
}

async fn dashboard(jar: CookieJar, State(state): State<Arc<AppState>>) -> Response {
    if login::session_from_jar(&jar).is_none() {
        return Redirect::to("/login").into_response();
    }

    let store = state.store.lock().unwrap();
    Html(inject_records(
        include_str!("./static/dashboard.html"),
        &store,
    ))
    .into_response()
}

async fn tracking_log(State(state): State<Arc<AppState>>) -> Html<String> {
    let store = state.store.lock().unwrap();
    Html(inject_records(
        include_str!("./static/tracking_log.html"),
        &store,
    ))
}

async fn generate_report(State(state): State<Arc<AppState>>) -> Html<String> {
    let store = state.store.lock().unwrap();
    let page = inject_records(include_str!("./static/report.html"), &store).replace(
        "<!-- GENERATED -->",
        &format!("Generated {}", chrono::Local::now().format("%Y-%m-%d %H:%M")),
    );
    Html(page)
}

async fn serve_upload_form(jar: CookieJar) -> Response {
    match require_admin(&jar) {
        Ok(_) => Html(include_str!("./static/upload.html")).into_response(),
        Err(redirect) => redirect,
    }
}

/// Handle a CSV batch upload (admin only).
///
/// The file part is accepted on its filename suffix alone; the parsed rows
/// are appended to the movement store and the client is sent to the
/// tracking log.
async fn handle_upload(
    jar: CookieJar,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let session = match require_admin(&jar) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };

    let mut file_name = String::new();
    let mut file_data = Vec::new();

    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        if field.name() == Some("csv_file") {
            file_name = field.file_name().unwrap_or("").to_string();
            file_data = field.bytes().await.unwrap_or_default().to_vec();
        }
    }

    if !ingest::is_csv_filename(&file_name) {
        return (StatusCode::BAD_REQUEST, "Only .csv uploads are accepted").into_response();
    }

    let text = match String::from_utf8(file_data) {
        Ok(text) => text,
        Err(_) => {
            return (StatusCode::BAD_REQUEST, "Upload is not valid UTF-8").into_response();
        }
    };

    match ingest::parse_csv(&text) {
        Ok(batch) => {
            let appended = batch.len();
            let total = state.store.lock().unwrap().append(batch);
            log::info!(
                "{} uploaded {} rows from {} ({} total)",
                session.username,
                appended,
                file_name,
                total
            );
            Redirect::to("/tracking-log").into_response()
        }
        Err(e) => (StatusCode::BAD_REQUEST, format!("CSV parse failed: {}", e)).into_response(),
    }
}

async fn serve_email_form(jar: CookieJar) -> Response {
    match require_admin(&jar) {
        Ok(_) => Html(include_str!("./static/email_form.html")).into_response(),
        Err(redirect) => redirect,
    }
}

/// Send one operator-composed email (admin only).
///
/// Success or the raw error text becomes the page body; there is no retry
/// and no queue.
async fn handle_send_email(jar: CookieJar, Form(form): Form<EmailForm>) -> Response {
    if let Err(redirect) = require_admin(&jar) {
        return redirect;
    }

    let outcome =
        Mailer::from_env().and_then(|mailer| mailer.send(&form.email, &form.subject, &form.body));

    match outcome {
        Ok(()) => "Email sent successfully".into_response(),
        Err(e) => {
            log::warn!("email to {} failed: {}", form.email, e);
            format!("Email failed: {}", e).into_response()
        }
    }
}

async fn download_excel(State(state): State<Arc<AppState>>) -> Response {
    let store = state.store.lock().unwrap();

    match report::to_xlsx(&store) {
        Ok(bytes) => {
            log::info!("excel export: {} records, {} bytes", store.len(), bytes.len());
            attachment_response(
                "waste_report.xlsx",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                bytes,
            )
        }
        Err(e) => {
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Excel export failed: {}", e))
                .into_response()
        }
    }
}

async fn download_pdf(State(state): State<Arc<AppState>>) -> Response {
    let store = state.store.lock().unwrap();

    match report::to_pdf(&store) {
        Ok(bytes) => {
            log::info!("pdf export: {} records, {} bytes", store.len(), bytes.len());
            attachment_response("waste_report.pdf", "application/pdf", bytes)
        }
        Err(e) => {
            (StatusCode::INTERNAL_SERVER_ERROR, format!("PDF export failed: {}", e))
                .into_response()
        }
    }
}

fn attachment_response(filename: &str, content_type: &str, bytes: Vec<u8>) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(axum::body::Body::from(bytes))
        .unwrap()
}
