use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BannerId(pub String);

impl BannerId {
    /// Time-ordered id for a freshly created banner.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}

impl fmt::Display for BannerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BannerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    pub price: f64,
    /// Data URL for generated banners, remote URL for seeded ones.
    #[serde(alias = "imageData")]
    pub image_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBanner {
    pub title: String,
    pub price: f64,
    #[serde(alias = "imageData")]
    pub image_data: String,
}

impl NewBanner {
    pub fn with_id(self, id: BannerId) -> Banner {
        Banner {
            id,
            title: self.title,
            price: self.price,
            image_data: self.image_data,
        }
    }
}

/// The fields of a banner an admin may edit after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerUpdate {
    pub id: BannerId,
    pub title: String,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Public,
    Admin,
}

impl View {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "public" => Some(Self::Public),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub is_admin: bool,
    pub view: View,
}

/// Formats a price the way banners display it, e.g. `S/35.90`.
pub fn format_price(prefix: &str, price: f64) -> String {
    format!("{prefix}{price:.2}")
}
