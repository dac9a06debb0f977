// Settings Domain Model

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// key -> value view of all settings
pub type SettingsMap = BTreeMap<String, Value>;

/// Keys readable without authentication
pub const PUBLIC_SETTINGS_KEYS: [&str; 18] = [
    // Site
    "site_name",
    "site_tagline",
    "site_logo",
    "site_favicon",
    // Contact
    "contact_email",
    "contact_phone",
    "contact_address",
    // Social
    "social_facebook",
    "social_twitter",
    "social_instagram",
    "social_linkedin",
    "social_youtube",
    "social_github",
    // SEO
    "seo_default_title",
    "seo_default_description",
    "seo_default_keywords",
    "seo_default_og_image",
    "seo_google_analytics_id",
];

/// Setting that switches the public site into maintenance mode
pub const MAINTENANCE_MODE_KEY: &str = "maintenance_mode";

/// A single site setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: String,
    pub key: String,
    pub value: Value,
    pub category: Option<String>,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Keep only the allow-listed public keys
pub fn public_subset(all: &SettingsMap) -> SettingsMap {
    PUBLIC_SETTINGS_KEYS
        .iter()
        .filter_map(|key| all.get(*key).map(|v| (key.to_string(), v.clone())))
        .collect()
}
