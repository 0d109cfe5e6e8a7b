use serde::{Deserialize, Serialize};

use crate::domain::{Banner, SessionState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewRequest {
    pub view: String,
}

/// Edit dialog submission; the price arrives as raw form text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBannerForm {
    pub title: String,
    pub price: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerListResponse {
    pub banners: Vec<Banner>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: SessionState,
}
