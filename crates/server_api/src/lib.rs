use std::sync::Arc;

use client_core::{CredentialVerifier, FormError, SessionController, Submission};
use image_generation::BannerImageGenerator;
use shared::{
    domain::{Banner, BannerId, BannerUpdate, NewBanner, SessionState},
    error::{ApiError, ErrorCode},
};
use storage::{Storage, StoreError};
use tracing::info;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
    pub generator: Arc<dyn BannerImageGenerator>,
    pub credentials: Arc<dyn CredentialVerifier>,
}

pub const ACCESS_DENIED_MESSAGE: &str = "Please log in to access the admin dashboard.";

pub async fn list_banners(ctx: &ApiContext) -> Vec<Banner> {
    ctx.storage.list_banners().await
}

pub fn login(
    ctx: &ApiContext,
    session: &mut SessionController,
    username: &str,
    password: &str,
) -> Result<(), ApiError> {
    if session.attempt_login(ctx.credentials.as_ref(), username, password) {
        Ok(())
    } else {
        Err(ApiError::new(
            ErrorCode::Unauthorized,
            client_core::LOGIN_FAILED_MESSAGE,
        ))
    }
}

pub async fn load_banner(
    ctx: &ApiContext,
    session: SessionState,
    banner_id: &BannerId,
) -> Result<Banner, ApiError> {
    ensure_admin(session)?;
    ctx.storage
        .load_banner(banner_id)
        .await
        .ok_or_else(|| not_found(banner_id))
}

pub async fn create_banner(
    ctx: &ApiContext,
    session: SessionState,
    banner: NewBanner,
) -> Result<Banner, ApiError> {
    ensure_admin(session)?;
    validate_fields(&banner.title, banner.price)?;
    if banner.image_data.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "image data is required"));
    }
    let created = ctx.storage.create_banner(banner).await;
    info!(banner_id = %created.id, title = %created.title, "banner created");
    Ok(created)
}

/// Runs a prepared form submission through the generator and stores the
/// result. Nothing is stored when generation fails.
pub async fn generate_banner(
    ctx: &ApiContext,
    session: SessionState,
    submission: Submission,
) -> Result<Banner, ApiError> {
    ensure_admin(session)?;
    let banner = submission
        .run(ctx.generator.as_ref())
        .await
        .map_err(|err| form_error(&err))?;
    let created = ctx.storage.create_banner(banner).await;
    info!(banner_id = %created.id, title = %created.title, "generated banner created");
    Ok(created)
}

pub async fn update_banner(
    ctx: &ApiContext,
    session: SessionState,
    update: BannerUpdate,
) -> Result<Banner, ApiError> {
    ensure_admin(session)?;
    validate_fields(&update.title, update.price)?;
    let updated = ctx
        .storage
        .update_banner(update)
        .await
        .map_err(|err| match err {
            StoreError::NotFound(id) => not_found(&id),
        })?;
    info!(banner_id = %updated.id, "banner updated");
    Ok(updated)
}

/// Deleting an unknown id is not an error; the result says whether anything
/// was removed.
pub async fn delete_banner(
    ctx: &ApiContext,
    session: SessionState,
    banner_id: &BannerId,
) -> Result<bool, ApiError> {
    ensure_admin(session)?;
    let removed = ctx.storage.delete_banner(banner_id).await;
    info!(banner_id = %banner_id, removed, "banner delete requested");
    Ok(removed)
}

pub fn ensure_admin(session: SessionState) -> Result<(), ApiError> {
    if session.is_admin {
        Ok(())
    } else {
        Err(ApiError::new(ErrorCode::Forbidden, ACCESS_DENIED_MESSAGE))
    }
}

pub fn form_error(err: &FormError) -> ApiError {
    let code = match err {
        FormError::InFlight => ErrorCode::Conflict,
        FormError::Incomplete | FormError::MissingTitle | FormError::InvalidPrice => {
            ErrorCode::Validation
        }
        FormError::Generation(_) => ErrorCode::Upstream,
    };
    ApiError::new(code, err.to_string())
}

fn validate_fields(title: &str, price: f64) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "title is required"));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "price must be a non-negative number",
        ));
    }
    Ok(())
}

fn not_found(banner_id: &BannerId) -> ApiError {
    ApiError::new(ErrorCode::NotFound, format!("banner {banner_id} not found"))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
