//! Wire and storage models for the PDF Toolbox API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Per-user usage and entitlement record.
///
/// Keyed by one canonical opaque string id. Bot-originated users arrive as
/// `tg_<numeric id>`; web clients send whatever opaque id they hold. The
/// server never interprets the key.
///
/// Invariant: `pro == true` implies `pro_until` is either `None`
/// (unlimited) or a timestamp; a past `pro_until` is normalized away on
/// the next read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Successful transforms charged so far. Monotonically non-decreasing
    /// except when reset by an entitlement change.
    #[serde(default)]
    pub count: u32,

    #[serde(default)]
    pub pro: bool,

    #[serde(default)]
    pub pro_until: Option<DateTime<Utc>>,

    // Display metadata, opaque passthrough. The bot mirrors Telegram
    // profile fields here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Partial update for a `UserRecord`.
///
/// Only the fields listed here are updatable; unknown fields in the
/// request body are rejected rather than silently merged. Absent fields
/// leave the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserPatch {
    pub count: Option<u32>,
    pub pro: Option<bool>,
    /// `null` clears the expiry; absent leaves it alone.
    #[serde(default, deserialize_with = "double_option")]
    pub pro_until: Option<Option<DateTime<Utc>>>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub avatar: Option<String>,
}

impl UserPatch {
    /// Merge the supplied fields into `record`, leaving the rest as-is.
    pub fn apply(&self, record: &mut UserRecord) {
        if let Some(count) = self.count {
            record.count = count;
        }
        if let Some(pro) = self.pro {
            record.pro = pro;
        }
        if let Some(pro_until) = self.pro_until {
            record.pro_until = pro_until;
        }
        if let Some(name) = &self.name {
            record.name = Some(name.clone());
        }
        if let Some(username) = &self.username {
            record.username = Some(username.clone());
        }
        if let Some(avatar) = &self.avatar {
            record.avatar = Some(avatar.clone());
        }
    }
}

/// Distinguishes "field absent" (outer `None`) from "field set to null"
/// (inner `None`) in patch bodies.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// Body of `POST /user/{id}` on success.
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Body of `POST /process` when the caller asked for persisted delivery.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessedResponse {
    /// `"single-document"` or `"archive"`.
    pub kind: String,
    pub message: String,
    /// Retrieval path for the persisted artifact, e.g. `/files/<name>`.
    pub download: String,
}
