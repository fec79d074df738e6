use anyhow::{Context, Result};
use clap::Parser;

use altsync::updater::UpdateOutcome;

use super::Updater;

/// Updates the manifest from the latest matching release.
#[derive(Debug, Parser)]
pub struct LatestSubcommand {}

impl LatestSubcommand {
    pub async fn run(self, updater: &Updater) -> Result<UpdateOutcome> {
        let config = updater.config();
        updater.update_latest().await.with_context(|| {
            format!(
                "Failed to update {:?} from the latest release of {}",
                config.manifest, config.repository
            )
        })
    }
}
