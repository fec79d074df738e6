use anyhow::{Context, Result};
use clap::Parser;

use altsync::updater::UpdateOutcome;

use super::Updater;

/// Adds every matching release to the manifest, then marks the latest one as current.
#[derive(Debug, Parser)]
pub struct BackfillSubcommand {}

impl BackfillSubcommand {
    pub async fn run(self, updater: &Updater) -> Result<UpdateOutcome> {
        let config = updater.config();
        updater.backfill().await.with_context(|| {
            format!(
                "Failed to update {:?} from the releases of {}",
                config.manifest, config.repository
            )
        })
    }
}
