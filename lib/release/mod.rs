use chrono::{DateTime, Utc};
use url::Url;

use crate::{repo::RepoId, result::UpdaterResult, sources::github::models::GithubRelease};

mod description;
mod version;

pub use self::description::normalize_description;
pub use self::version::extract_version;

/**
    A single published release, either fetched from
    GitHub or synthesized from a directly supplied build.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    pub name: String,
    pub tag_name: String,
    pub published_at: DateTime<Utc>,
    pub body: String,
    pub assets: Vec<ReleaseAsset>,
    /// Where users can read about this release.
    pub page_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub download_url: String,
    pub size: u64,
}

/**
    A build supplied directly by the caller instead of a GitHub release.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectBuild {
    pub download_url: Url,
    /// Version of the tweak or library injected into the app.
    pub library_version: String,
    /// Version of the app being distributed, used as the manifest version.
    pub app_version: String,
}

impl ReleaseRecord {
    /**
        Converts a GitHub release into a release record.

        Returns `None` for releases that were never published, such as drafts.
    */
    #[must_use]
    pub fn from_github(release: GithubRelease, repo: &RepoId) -> Option<Self> {
        let published_at = release.published_at?;
        Some(Self {
            name: release.name.unwrap_or_default(),
            page_url: repo.release_page_url(&release.tag_name),
            tag_name: release.tag_name,
            published_at,
            body: release.changelog.unwrap_or_default(),
            assets: release
                .assets
                .into_iter()
                .map(|asset| ReleaseAsset {
                    download_url: asset.browser_download_url,
                    size: asset.size,
                })
                .collect(),
        })
    }

    /**
        Synthesizes a release record for a directly supplied build.

        The build's last modification time stands in for the publish date,
        and the download itself is the only asset.
    */
    #[must_use]
    pub fn from_direct_build(
        build: &DirectBuild,
        size: u64,
        last_modified: DateTime<Utc>,
        product: &str,
        target_app: &str,
    ) -> Self {
        Self {
            name: format!("{product} {}", build.library_version),
            tag_name: build.app_version.clone(),
            published_at: last_modified,
            body: format!(
                "{product} {} for {target_app} {}",
                build.library_version, build.app_version
            ),
            assets: vec![ReleaseAsset {
                download_url: build.download_url.to_string(),
                size,
            }],
            page_url: build.download_url.to_string(),
        }
    }

    /**
        The tag without any leading `v`, as shown to users.
    */
    #[must_use]
    pub fn display_version(&self) -> &str {
        self.tag_name.trim_start_matches('v')
    }

    /**
        The numeric `X.Y.Z` version contained in the tag.

        # Errors

        - If the tag does not contain a version in `X.Y.Z` format.
    */
    pub fn version(&self) -> UpdaterResult<String> {
        extract_version(&self.tag_name)
    }

    /**
        The publish date, formatted as `YYYY-MM-DD`.
    */
    #[must_use]
    pub fn date(&self) -> String {
        self.published_at.format("%Y-%m-%d").to_string()
    }
}

/**
    Finds the most recently published release whose name contains the given keyword.

    Ties on publish time go to the release listed first.
*/
#[must_use]
pub fn latest_matching<'a>(
    releases: &'a [ReleaseRecord],
    keyword: &str,
) -> Option<&'a ReleaseRecord> {
    releases
        .iter()
        .rev()
        .filter(|release| release.name.contains(keyword))
        .max_by_key(|release| release.published_at)
}

/**
    Finds all releases whose name contains the given keyword, oldest first.

    The last release is the one [`latest_matching`] picks.
*/
#[must_use]
pub fn all_matching(releases: &[ReleaseRecord], keyword: &str) -> Vec<ReleaseRecord> {
    let mut matching = releases
        .iter()
        .rev()
        .filter(|release| release.name.contains(keyword))
        .cloned()
        .collect::<Vec<_>>();
    matching.sort_by_key(|release| release.published_at);
    matching
}
