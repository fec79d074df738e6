use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use tracing::{debug, instrument, warn};

use crate::{
    release::ReleaseRecord,
    result::UpdaterResult,
    sources::{MetadataProbe, RemoteMetadata},
};

/**
    Host that embedded link tokens are appended to.
*/
pub const EMBEDDED_LINK_HOST: &str = "https://files.catbox.moe/";

/**
    Size reported for an embedded link when its real size could not be probed.

    This is a placeholder close to a typical build size, not an exact value.
*/
pub const DEFAULT_EMBEDDED_SIZE: u64 = 104_857_600;

static EMBEDDED_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"###\s*Catbox\s*`([^`\s]+)`").expect("embedded link pattern should be valid")
});

/**
    How the download of a release is located.
*/
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub enum AssetStrategy {
    /// Use the first asset attached to the release.
    #[default]
    Release,
    /// Use a file-host link embedded in the changelog,
    /// falling back to the release assets if there is none.
    Embedded,
}

impl AssetStrategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Embedded => "embedded",
        }
    }
}

impl FromStr for AssetStrategy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let l = s.trim().to_lowercase();
        match l.as_str() {
            "release" | "assets" => Ok(Self::Release),
            "embedded" | "catbox" => Ok(Self::Embedded),
            _ => Err(format!("unknown asset strategy '{l}'")),
        }
    }
}

impl fmt::Display for AssetStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

/**
    The download location and size of a release, if any.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub download_url: Option<String>,
    pub size: Option<u64>,
}

impl ResolvedAsset {
    /**
        Takes the first asset attached to the release.

        Both values are `None` if the release has no assets.
    */
    #[must_use]
    pub fn from_release_assets(release: &ReleaseRecord) -> Self {
        match release.assets.first() {
            Some(asset) => Self {
                download_url: Some(asset.download_url.clone()),
                size: Some(asset.size),
            },
            None => Self::default(),
        }
    }
}

/**
    Finds a file-host link embedded in a changelog, in the form:

    ```md
    ### Catbox
    `abc123.ipa`
    ```

    Returns the full download URL for the first such link.
*/
#[must_use]
pub fn find_embedded_link(body: &str) -> Option<String> {
    let token = EMBEDDED_LINK.captures(body)?.get(1)?.as_str();
    Some(format!("{EMBEDDED_LINK_HOST}{token}"))
}

/**
    Resolves the download URL and size for a release using the given strategy.

    For [`AssetStrategy::Embedded`], a failed size probe is not an error,
    the size falls back to [`DEFAULT_EMBEDDED_SIZE`] instead.
*/
#[instrument(skip(release, probe), fields(tag = %release.tag_name), level = "debug")]
pub async fn resolve_asset<P: MetadataProbe>(
    strategy: AssetStrategy,
    release: &ReleaseRecord,
    probe: &P,
) -> ResolvedAsset {
    match strategy {
        AssetStrategy::Release => ResolvedAsset::from_release_assets(release),
        AssetStrategy::Embedded => {
            let Some(url) = find_embedded_link(&release.body) else {
                debug!("no embedded link found, using release assets");
                return ResolvedAsset::from_release_assets(release);
            };
            let size = match probe.probe(&url).await {
                Ok(RemoteMetadata { size: Some(size), .. }) => size,
                Ok(_) => {
                    warn!(%url, "embedded link has no size, using default size");
                    DEFAULT_EMBEDDED_SIZE
                }
                Err(e) => {
                    warn!(%url, "failed to probe embedded link, using default size: {e}");
                    DEFAULT_EMBEDDED_SIZE
                }
            };
            ResolvedAsset {
                download_url: Some(url),
                size: Some(size),
            }
        }
    }
}

/**
    Resolves the size and last modification time of a directly supplied download.

    Unlike embedded links, any failure here is fatal.

    # Errors

    - If the probe request failed.
    - If the server did not report both a size and a last modification time.
*/
pub async fn resolve_direct<P: MetadataProbe>(
    url: &str,
    probe: &P,
) -> UpdaterResult<(u64, chrono::DateTime<chrono::Utc>)> {
    probe.probe(url).await?.require_size_and_date(url)
}
