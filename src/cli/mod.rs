use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser};
use console::style;
use tracing::info;

use altsync::{
    assets::AssetStrategy,
    config::{CONFIG_FILE_NAME, UpdaterConfig},
    repo::RepoId,
    sources::{GithubProvider, HttpProbe},
    updater::{ManifestUpdater, UpdateOutcome},
};

mod backfill;
mod direct;
mod latest;

use self::backfill::BackfillSubcommand;
use self::direct::DirectSubcommand;
use self::latest::LatestSubcommand;

type Updater = ManifestUpdater<HttpProbe>;

#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommand: Subcommand,
    #[clap(flatten)]
    pub options: GlobalOptions,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = self.options.load_config().await?;

        let github = match self.options.token.as_deref() {
            Some(token) if !token.trim().is_empty() => GithubProvider::new_authenticated(token)?,
            _ => GithubProvider::new()?,
        };
        let probe = HttpProbe::new().context("Failed to create HTTP client")?;
        let updater = ManifestUpdater::new(config, github, probe);

        let outcome = match self.subcommand {
            Subcommand::Latest(cmd) => cmd.run(&updater).await,
            Subcommand::Backfill(cmd) => cmd.run(&updater).await,
            Subcommand::Direct(cmd) => cmd.run(&updater).await,
        }?;

        report(&updater, &outcome);
        Ok(())
    }
}

/// Options shared by all subcommands, overriding values from the config file.
#[derive(Debug, Args)]
pub struct GlobalOptions {
    /// Path to the config file. Defaults are used if it does not exist.
    #[clap(long, global = true, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,
    /// Path to the manifest file to update.
    #[clap(long, global = true)]
    pub manifest: Option<PathBuf>,
    /// Repository to fetch releases from, as `owner/name`.
    #[clap(long, global = true)]
    pub repository: Option<RepoId>,
    /// Only consider releases with names containing this keyword.
    #[clap(long, global = true)]
    pub keyword: Option<String>,
    /// Where to find the download of a release: `release` or `embedded`.
    #[clap(long, global = true)]
    pub assets: Option<AssetStrategy>,
    /// GitHub token used to avoid rate limits.
    #[clap(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl GlobalOptions {
    async fn load_config(&self) -> Result<UpdaterConfig> {
        let mut config = UpdaterConfig::load(&self.config)
            .await
            .with_context(|| format!("Failed to load config from {:?}", self.config))?;

        if let Some(manifest) = &self.manifest {
            config.manifest.clone_from(manifest);
        }
        if let Some(repository) = &self.repository {
            config.repository = repository.clone();
        }
        if let Some(keyword) = &self.keyword {
            config.keyword.clone_from(keyword);
        }
        if let Some(assets) = self.assets {
            config.assets = assets;
        }

        Ok(config)
    }
}

#[derive(Debug, Parser)]
pub enum Subcommand {
    Latest(LatestSubcommand),
    Backfill(BackfillSubcommand),
    Direct(DirectSubcommand),
}

fn report(updater: &Updater, outcome: &UpdateOutcome) {
    let manifest = updater.config().manifest.display();
    let version = style(&outcome.version).bold().magenta();

    let mut lines = vec![if outcome.replaced_existing {
        format!("Updated version {version} in {manifest}")
    } else {
        format!("Added version {version} to {manifest}")
    }];
    if outcome.merged > 1 {
        lines.push(format!("Merged {} releases in total", outcome.merged));
    }
    if outcome.news_added {
        lines.push(String::from("Added a news entry for the release"));
    }

    info!("{}", lines.join("\n"));
}
