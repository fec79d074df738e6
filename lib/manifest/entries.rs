use serde::{Deserialize, Serialize};

/**
    One release of the app, as listed in the `versions` array of an app.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    pub version: String,
    pub date: String,
    pub localized_description: String,
    #[serde(rename = "downloadURL")]
    pub download_url: Option<String>,
    pub size: Option<u64>,
}

/**
    An announcement shown to users, as listed in the top-level `news` array.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsEntry {
    #[serde(rename = "appID")]
    pub app_id: String,
    pub caption: String,
    pub date: String,
    pub identifier: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub notify: bool,
    pub tint_color: String,
    pub title: String,
    pub url: String,
}

impl NewsEntry {
    /**
        The identifier used for the news entry of a release.
    */
    #[must_use]
    pub fn identifier_for(display_version: &str) -> String {
        format!("release-{display_version}")
    }
}
