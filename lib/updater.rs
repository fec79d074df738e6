use std::path::Path;

use tracing::{debug, instrument};

use crate::{
    assets::{ResolvedAsset, resolve_asset, resolve_direct},
    config::{NewsConfig, UpdaterConfig},
    manifest::{AppsManifest, NewsEntry, VersionEntry},
    release::{DirectBuild, ReleaseRecord, normalize_description},
    result::UpdaterResult,
    sources::{GithubProvider, MetadataProbe, github::GithubError},
};

/**
    What changed in the manifest after an update.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// The numeric version now listed as current.
    pub version: String,
    /// How many releases were merged into the version list.
    pub merged: usize,
    /// Whether the current version replaced an entry with the same version.
    pub replaced_existing: bool,
    /// Whether a new news entry was added.
    pub news_added: bool,
}

/**
    Builds the version entry for a release.

    # Errors

    - If the release tag does not contain an `X.Y.Z` version.
*/
pub fn compose_version_entry(
    release: &ReleaseRecord,
    asset: &ResolvedAsset,
    marker: &str,
) -> UpdaterResult<VersionEntry> {
    Ok(VersionEntry {
        version: release.version()?,
        date: release.date(),
        localized_description: normalize_description(&release.body, Some(marker)),
        download_url: asset.download_url.clone(),
        size: asset.size,
    })
}

/**
    Builds the news entry announcing a release.
*/
#[must_use]
pub fn compose_news_entry(release: &ReleaseRecord, news: &NewsConfig) -> NewsEntry {
    let display_version = release.display_version();
    NewsEntry {
        app_id: news.app_id.clone(),
        caption: format!("Update of {} just got released!", news.product),
        date: release
            .published_at
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string(),
        identifier: NewsEntry::identifier_for(display_version),
        image_url: news.image_url.clone(),
        notify: true,
        tint_color: news.tint_color.clone(),
        title: format!(
            "{display_version} - {}  {}",
            news.product,
            release.published_at.format("%d/%m/%y")
        ),
        url: release.page_url.clone(),
    }
}

/**
    Merges releases into the manifest, in the order given.

    Every release gets a version entry, so the last release ends up
    first in the version list. The last release also becomes the
    app's current version and gets a news entry.

    All versions are validated before the manifest is touched,
    so a release with an invalid tag leaves the manifest unchanged.

    # Errors

    - If any release tag does not contain an `X.Y.Z` version.
    - If the manifest does not have the expected shape.
*/
pub fn apply_releases(
    manifest: &mut AppsManifest,
    config: &UpdaterConfig,
    releases: &[(ReleaseRecord, ResolvedAsset)],
) -> UpdaterResult<Option<UpdateOutcome>> {
    let marker = config.marker();
    let entries = releases
        .iter()
        .map(|(release, asset)| compose_version_entry(release, asset, &marker))
        .collect::<UpdaterResult<Vec<_>>>()?;

    let (Some((latest, _)), Some(latest_entry)) = (releases.last(), entries.last()) else {
        return Ok(None);
    };

    let mut replaced_existing = false;
    for entry in &entries {
        replaced_existing = manifest.upsert_version(entry)?;
    }
    manifest.set_current_version(latest_entry)?;

    let news_added = manifest.add_news(&compose_news_entry(latest, &config.news))?;

    Ok(Some(UpdateOutcome {
        version: latest_entry.version.clone(),
        merged: entries.len(),
        replaced_existing,
        news_added,
    }))
}

/**
    Loads the manifest at the given path, merges
    releases into it, and writes it back.

    See [`apply_releases`] for details on how releases are merged.

    # Errors

    - If the manifest could not be loaded, merged, or saved.
*/
pub async fn update_manifest_file(
    path: impl AsRef<Path>,
    config: &UpdaterConfig,
    releases: &[(ReleaseRecord, ResolvedAsset)],
) -> UpdaterResult<Option<UpdateOutcome>> {
    let path = path.as_ref();
    let mut manifest = AppsManifest::load(path).await?;
    let outcome = apply_releases(&mut manifest, config, releases)?;
    if outcome.is_some() {
        manifest.save(path).await?;
    }
    Ok(outcome)
}

/**
    Updates a manifest from releases or directly supplied builds.
*/
#[derive(Debug, Clone)]
pub struct ManifestUpdater<P> {
    config: UpdaterConfig,
    github: GithubProvider,
    probe: P,
}

impl<P: MetadataProbe> ManifestUpdater<P> {
    #[must_use]
    pub fn new(config: UpdaterConfig, github: GithubProvider, probe: P) -> Self {
        Self {
            config,
            github,
            probe,
        }
    }

    #[must_use]
    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /**
        Merges the latest release matching the configured keyword.

        # Errors

        - If no release matches the keyword.
        - If fetching releases or updating the manifest failed.
    */
    #[instrument(skip(self), level = "debug")]
    pub async fn update_latest(&self) -> UpdaterResult<UpdateOutcome> {
        let release = self
            .github
            .find_latest_release(&self.config.repository, &self.config.keyword)
            .await?;
        debug!(tag = %release.tag_name, "found latest release");

        let asset = resolve_asset(self.config.assets, &release, &self.probe).await;
        self.write(vec![(release, asset)]).await
    }

    /**
        Merges every release matching the configured keyword, oldest first,
        then makes the latest one current and announces it.

        # Errors

        - If no release matches the keyword.
        - If fetching releases or updating the manifest failed.
    */
    #[instrument(skip(self), level = "debug")]
    pub async fn backfill(&self) -> UpdaterResult<UpdateOutcome> {
        let releases = self
            .github
            .find_matching_releases(&self.config.repository, &self.config.keyword)
            .await?;
        debug!(count = releases.len(), "found matching releases");

        let mut resolved = Vec::with_capacity(releases.len());
        for release in releases {
            let asset = resolve_asset(self.config.assets, &release, &self.probe).await;
            resolved.push((release, asset));
        }

        self.write(resolved).await
    }

    /**
        Merges a build supplied directly by the caller.

        The size and date of the build are read from the server hosting it.

        # Errors

        - If the build metadata could not be read.
        - If the app version does not contain an `X.Y.Z` version.
        - If updating the manifest failed.
    */
    #[instrument(skip(self), level = "debug")]
    pub async fn update_direct(&self, build: &DirectBuild) -> UpdaterResult<UpdateOutcome> {
        let url = build.download_url.as_str();
        let (size, last_modified) = resolve_direct(url, &self.probe).await?;

        let release = ReleaseRecord::from_direct_build(
            build,
            size,
            last_modified,
            &self.config.news.product,
            &self.config.news.target_app,
        );
        let asset = ResolvedAsset::from_release_assets(&release);
        self.write(vec![(release, asset)]).await
    }

    async fn write(
        &self,
        releases: Vec<(ReleaseRecord, ResolvedAsset)>,
    ) -> UpdaterResult<UpdateOutcome> {
        let outcome =
            update_manifest_file(&self.config.manifest, &self.config, &releases).await?;
        outcome.ok_or_else(|| {
            GithubError::ReleaseNotFound {
                repo: self.config.repository.clone(),
                keyword: self.config.keyword.clone(),
            }
            .into()
        })
    }
}
