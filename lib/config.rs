use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs::read_to_string;
use tracing::debug;

use crate::{
    assets::AssetStrategy, manifest::MANIFEST_FILE_NAME, repo::RepoId, result::UpdaterResult,
};

pub const CONFIG_FILE_NAME: &str = "altsync.toml";

const DEFAULT_REPOSITORY: &str = "Balackburn/YTLitePlus";
const DEFAULT_PRODUCT: &str = "YTLitePlus";
const DEFAULT_APP_ID: &str = "com.google.ios.youtube";
const DEFAULT_TARGET_APP: &str = "YouTube";
const DEFAULT_IMAGE_URL: &str = "https://raw.githubusercontent.com/Balackburn/YTLitePlusAltstore/main/screenshots/news/new_release.png";
const DEFAULT_TINT_COLOR: &str = "000000";

/**
    Everything needed to update a manifest from a repository's releases.

    Loaded from an optional TOML file, where every field may be omitted.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Path to the manifest file to update.
    pub manifest: PathBuf,
    /// Repository to fetch releases from.
    pub repository: RepoId,
    /// Only releases whose name contains this keyword are considered.
    pub keyword: String,
    /// Changelog text before and including this phrase is dropped.
    /// Defaults to `<product> Release Information`.
    pub marker: Option<String>,
    /// How to locate the download for a release.
    pub assets: AssetStrategy,
    pub news: NewsConfig,
}

/**
    Values used when composing news entries.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Bundle identifier of the app the news belongs to.
    pub app_id: String,
    /// Name of the distributed product, shown in titles and captions.
    pub product: String,
    /// Name of the app the product is built for.
    pub target_app: String,
    pub image_url: String,
    pub tint_color: String,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from(MANIFEST_FILE_NAME),
            repository: DEFAULT_REPOSITORY
                .parse()
                .expect("default repository should be valid"),
            keyword: DEFAULT_PRODUCT.to_string(),
            marker: None,
            assets: AssetStrategy::default(),
            news: NewsConfig::default(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.to_string(),
            product: DEFAULT_PRODUCT.to_string(),
            target_app: DEFAULT_TARGET_APP.to_string(),
            image_url: DEFAULT_IMAGE_URL.to_string(),
            tint_color: DEFAULT_TINT_COLOR.to_string(),
        }
    }
}

impl UpdaterConfig {
    /**
        Loads the config from the file at the given path.

        If the file does not exist, the default config is returned.

        # Errors

        - If the file exists but could not be read or parsed.
    */
    pub async fn load(path: impl AsRef<Path>) -> UpdaterResult<Self> {
        let path = path.as_ref();
        match read_to_string(path).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(?path, "no config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
            Ok(s) => Ok(toml::from_str(&s)?),
        }
    }

    /**
        The phrase that marks the start of the changelog proper.
    */
    #[must_use]
    pub fn marker(&self) -> String {
        self.marker
            .clone()
            .unwrap_or_else(|| format!("{} Release Information", self.news.product))
    }
}
