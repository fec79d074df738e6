use anyhow::{Context, Result};
use clap::Parser;
use url::Url;

use altsync::{release::DirectBuild, updater::UpdateOutcome};

use super::Updater;

/// Updates the manifest from a build hosted at the given URL.
#[derive(Debug, Parser)]
pub struct DirectSubcommand {
    /// Where the build can be downloaded from.
    pub download_url: Url,
    /// Version of the tweak included in the build.
    pub library_version: String,
    /// Version of the app the build is based on.
    pub app_version: String,
}

impl DirectSubcommand {
    pub async fn run(self, updater: &Updater) -> Result<UpdateOutcome> {
        let build = DirectBuild {
            download_url: self.download_url,
            library_version: self.library_version,
            app_version: self.app_version,
        };
        updater
            .update_direct(&build)
            .await
            .with_context(|| format!("Failed to add build at {}", build.download_url))
    }
}
