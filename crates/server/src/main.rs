use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Json, Router,
};
use client_core::{
    validate_edit, CaptureSource, ImageFile, PreviewHandle, StaticCredentials, Submission,
    ViewOutcome,
};
use image_generation::{
    BannerImageGenerator, GeminiConfig, GeminiImageGenerator, MissingImageGenerator,
};
use maud::Markup;
use server_api::{ensure_admin, form_error, ApiContext, ACCESS_DENIED_MESSAGE};
use shared::{
    domain::{BannerId, BannerUpdate, SessionState, View},
    error::{ApiError, ErrorCode},
    protocol::{BannerListResponse, LoginRequest, SessionResponse, UpdateBannerForm, ViewRequest},
};
use storage::{BannerStore, Storage};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod sessions;
mod views;

use app_state::AppState;
use config::{load_settings, Settings};
use sessions::{SessionRegistry, VisitorId};
use views::EditDraft;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings()?;
    let state = build_state(&settings)?;
    let app = build_router(Arc::new(state), settings.max_upload_bytes);

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    info!(%addr, "banner server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_state(settings: &Settings) -> anyhow::Result<AppState> {
    let store = if settings.seed_demo_banners {
        BannerStore::with_demo_banners()
    } else {
        BannerStore::new()
    };
    let api = ApiContext {
        storage: Storage::new(store),
        generator: build_generator(settings)?,
        credentials: Arc::new(StaticCredentials::new(
            settings.admin_username.clone(),
            settings.admin_password.clone(),
        )),
    };
    Ok(AppState {
        api,
        sessions: SessionRegistry::new(
            Duration::from_secs(settings.session_idle_secs),
            settings.max_sessions,
        ),
        currency_prefix: settings.currency_prefix.clone(),
    })
}

fn build_generator(settings: &Settings) -> anyhow::Result<Arc<dyn BannerImageGenerator>> {
    let Some(api_key) = settings.gemini_api_key() else {
        warn!("no Gemini API key configured; banner generation is disabled");
        return Ok(Arc::new(MissingImageGenerator));
    };
    let generator = GeminiImageGenerator::new(GeminiConfig {
        api_key: api_key.to_string(),
        model: settings.gemini_model.clone(),
        base_url: settings.gemini_base_url.clone(),
        currency_prefix: settings.currency_prefix.clone(),
    })
    .context("invalid Gemini configuration")?;
    info!(endpoint = %generator.endpoint(), "banner generation enabled");
    Ok(Arc::new(generator))
}

fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/view", post(select_view))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
        .route("/admin/images", post(stage_images))
        .route("/admin/images/:index/remove", post(remove_image))
        .route("/admin/previews/:handle", get(preview_image))
        .route("/admin/banners", post(create_banner))
        .route("/admin/banners/:banner_id/edit", get(edit_banner_page))
        .route("/admin/banners/:banner_id", post(update_banner))
        .route("/admin/banners/:banner_id/delete", post(delete_banner))
        .route("/api/banners", get(api_list_banners))
        .route("/api/session", get(api_session))
        .route("/healthz", get(healthz))
        .layer(middleware::from_fn(sessions::assign_visitor))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorId>,
) -> Response {
    let (outcome, session) = state
        .sessions
        .read(visitor, |s| (s.controller.outcome(), s.controller.state()))
        .await;

    match outcome {
        // denial is a page, not an error status, and touches no banner data
        ViewOutcome::AccessDenied => page(
            StatusCode::OK,
            views::access_denied(state.chrome(session), ACCESS_DENIED_MESSAGE),
        ),
        ViewOutcome::PublicGallery => {
            let banners = server_api::list_banners(&state.api).await;
            page(StatusCode::OK, views::gallery(state.chrome(session), &banners))
        }
        ViewOutcome::AdminDashboard => render_dashboard(&state, visitor, StatusCode::OK, None).await,
    }
}

async fn select_view(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorId>,
    Form(req): Form<ViewRequest>,
) -> Response {
    let Some(view) = View::parse(&req.view) else {
        return (StatusCode::BAD_REQUEST, format!("unknown view '{}'", req.view)).into_response();
    };
    state
        .sessions
        .with_session(visitor, |s| s.controller.set_view(view))
        .await;
    Redirect::to("/").into_response()
}

async fn login_page(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorId>,
) -> Response {
    let session = session_state(&state, visitor).await;
    if session.is_admin {
        return Redirect::to("/").into_response();
    }
    page(StatusCode::OK, views::login(state.chrome(session), None))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorId>,
    Form(req): Form<LoginRequest>,
) -> Response {
    let (result, session) = state
        .sessions
        .with_session(visitor, |s| {
            let result =
                server_api::login(&state.api, &mut s.controller, &req.username, &req.password);
            (result, s.controller.state())
        })
        .await;

    match result {
        Ok(()) => Redirect::to("/").into_response(),
        Err(err) => page(
            status_for(err.code),
            views::login(state.chrome(session), Some(&err.message)),
        ),
    }
}

async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorId>,
) -> Response {
    state.sessions.with_session(visitor, |s| s.logout()).await;
    Redirect::to("/").into_response()
}

async fn stage_images(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorId>,
    multipart: Multipart,
) -> Response {
    if let Err(err) = ensure_admin(session_state(&state, visitor).await) {
        return admin_error(&state, visitor, err).await;
    }
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(err) => return admin_error(&state, visitor, err).await,
    };
    let source = upload.source;

    let result = state
        .sessions
        .with_session(visitor, |s| -> Result<usize, ApiError> {
            ensure_admin(s.controller.state())?;
            s.form.ensure_editable().map_err(|err| form_error(&err))?;
            Ok(s.form.images.add_files(source, upload.files))
        })
        .await;

    match result {
        Ok(accepted) => {
            info!(accepted, ?source, "images staged");
            Redirect::to("/").into_response()
        }
        Err(err) => admin_error(&state, visitor, err).await,
    }
}

async fn remove_image(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorId>,
    Path(index): Path<usize>,
) -> Response {
    let result = state
        .sessions
        .with_session(visitor, |s| -> Result<(), ApiError> {
            ensure_admin(s.controller.state())?;
            s.form.ensure_editable().map_err(|err| form_error(&err))?;
            s.form.images.remove(index).map(|_| ()).ok_or_else(|| {
                ApiError::new(ErrorCode::NotFound, format!("no staged image at position {index}"))
            })
        })
        .await;

    match result {
        Ok(()) => Redirect::to("/").into_response(),
        Err(err) => admin_error(&state, visitor, err).await,
    }
}

const PREVIEW_CSP: &str = "default-src 'none'; style-src 'unsafe-inline'; sandbox";

async fn preview_image(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorId>,
    Path(handle): Path<u64>,
) -> Response {
    let result = state
        .sessions
        .read(visitor, |s| -> Result<(String, Vec<u8>), ApiError> {
            ensure_admin(s.controller.state())?;
            s.form
                .images
                .preview(PreviewHandle::from_id(handle))
                .map(|file| (file.effective_mime_type(), file.bytes.clone()))
                .ok_or_else(|| ApiError::new(ErrorCode::NotFound, "preview released"))
        })
        .await;

    match result {
        // uploads are attacker-chosen; never let one run as a document
        Ok((mime_type, bytes)) => (
            [
                (header::CONTENT_TYPE, mime_type),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
                (header::CONTENT_DISPOSITION, "inline".to_string()),
                (header::CONTENT_SECURITY_POLICY, PREVIEW_CSP.to_string()),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => (status_for(err.code), err.message).into_response(),
    }
}

/// Stages any attached images, then submits the form. The generator runs
/// without the session lock held; the form stays busy until it returns.
async fn create_banner(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorId>,
    multipart: Multipart,
) -> Response {
    if let Err(err) = ensure_admin(session_state(&state, visitor).await) {
        return admin_error(&state, visitor, err).await;
    }
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(err) => return admin_error(&state, visitor, err).await,
    };

    let prepared = state
        .sessions
        .with_session(visitor, |s| -> Result<(SessionState, Submission), ApiError> {
            let session = s.controller.state();
            ensure_admin(session)?;
            s.form.ensure_editable().map_err(|err| form_error(&err))?;
            s.form.set_draft(
                upload.title.unwrap_or_default(),
                upload.price.unwrap_or_default(),
            );
            s.form.images.add_files(upload.source, upload.files);
            let submission = s.form.begin_submission().map_err(|err| form_error(&err))?;
            Ok((session, submission))
        })
        .await;
    let (session, submission) = match prepared {
        Ok(prepared) => prepared,
        Err(err) => return admin_error(&state, visitor, err).await,
    };

    let result = server_api::generate_banner(&state.api, session, submission).await;

    state
        .sessions
        .with_session(visitor, |s| s.form.finish(&result))
        .await;

    match result {
        Ok(banner) => {
            info!(banner_id = %banner.id, "banner published");
            Redirect::to("/").into_response()
        }
        Err(err) => admin_error(&state, visitor, err).await,
    }
}

async fn edit_banner_page(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorId>,
    Path(banner_id): Path<String>,
) -> Response {
    let session = session_state(&state, visitor).await;
    match server_api::load_banner(&state.api, session, &BannerId(banner_id)).await {
        Ok(banner) => page(
            StatusCode::OK,
            views::edit(state.chrome(session), &EditDraft::from_banner(&banner), None),
        ),
        Err(err) => admin_error(&state, visitor, err).await,
    }
}

async fn update_banner(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorId>,
    Path(banner_id): Path<String>,
    Form(form): Form<UpdateBannerForm>,
) -> Response {
    let session = session_state(&state, visitor).await;
    if let Err(err) = ensure_admin(session) {
        return admin_error(&state, visitor, err).await;
    }
    let id = BannerId(banner_id);

    let (title, price) = match validate_edit(&form.title, &form.price) {
        Ok(fields) => fields,
        Err(err) => {
            let draft = EditDraft {
                id: &id,
                title: &form.title,
                price: form.price.clone(),
            };
            return page(
                StatusCode::UNPROCESSABLE_ENTITY,
                views::edit(state.chrome(session), &draft, Some(&err.to_string())),
            );
        }
    };

    let update = BannerUpdate { id, title, price };
    match server_api::update_banner(&state.api, session, update).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) => admin_error(&state, visitor, err).await,
    }
}

async fn delete_banner(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorId>,
    Path(banner_id): Path<String>,
) -> Response {
    let session = session_state(&state, visitor).await;
    match server_api::delete_banner(&state.api, session, &BannerId(banner_id)).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) => admin_error(&state, visitor, err).await,
    }
}

async fn api_list_banners(State(state): State<Arc<AppState>>) -> Json<BannerListResponse> {
    Json(BannerListResponse {
        banners: server_api::list_banners(&state.api).await,
    })
}

async fn api_session(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorId>,
) -> Json<SessionResponse> {
    Json(SessionResponse {
        session: session_state(&state, visitor).await,
    })
}

#[derive(Debug)]
struct BannerUpload {
    title: Option<String>,
    price: Option<String>,
    source: CaptureSource,
    files: Vec<ImageFile>,
}

async fn read_upload(mut multipart: Multipart) -> Result<BannerUpload, ApiError> {
    let mut upload = BannerUpload {
        title: None,
        price: None,
        source: CaptureSource::Picker,
        files: Vec::new(),
    };

    while let Some(field) = multipart.next_field().await.map_err(bad_upload)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => upload.title = Some(field.text().await.map_err(bad_upload)?),
            "price" => upload.price = Some(field.text().await.map_err(bad_upload)?),
            "source" => {
                let raw = field.text().await.map_err(bad_upload)?;
                upload.source = CaptureSource::parse(&raw).unwrap_or(CaptureSource::Picker);
            }
            "images" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let mime_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(bad_upload)?;
                upload
                    .files
                    .push(ImageFile::new(filename, mime_type, bytes.to_vec()));
            }
            _ => {}
        }
    }
    Ok(upload)
}

fn bad_upload(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::new(ErrorCode::Validation, format!("invalid upload: {err}"))
}

async fn session_state(state: &AppState, visitor: VisitorId) -> SessionState {
    state
        .sessions
        .read(visitor, |s| s.controller.state())
        .await
}

async fn render_dashboard(
    state: &AppState,
    visitor: VisitorId,
    status: StatusCode,
    notice: Option<&str>,
) -> Response {
    let banners = server_api::list_banners(&state.api).await;
    let markup = state
        .sessions
        .read(visitor, |s| {
            views::dashboard(state.chrome(s.controller.state()), &banners, &s.form, notice)
        })
        .await;
    page(status, markup)
}

async fn admin_error(state: &AppState, visitor: VisitorId, err: ApiError) -> Response {
    let status = status_for(err.code);
    let session = session_state(state, visitor).await;
    match err.code {
        ErrorCode::Forbidden => {
            page(status, views::access_denied(state.chrome(session), &err.message))
        }
        ErrorCode::NotFound => page(status, views::not_found(state.chrome(session), &err.message)),
        _ => render_dashboard(state, visitor, status, Some(&err.message)).await,
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Upstream => StatusCode::BAD_GATEWAY,
    }
}

fn page(status: StatusCode, markup: Markup) -> Response {
    (status, Html(markup.into_string())).into_response()
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
