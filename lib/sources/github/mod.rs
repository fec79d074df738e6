#![allow(clippy::missing_errors_doc)]

use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use reqwest::{
    StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
};

use crate::{
    release::{ReleaseRecord, all_matching, latest_matching},
    repo::RepoId,
};

use super::client::create_client;

const BASE_URL: &str = "https://api.github.com";

pub mod models;
mod result;

use self::models::GithubRelease;

pub use self::result::{GithubError, GithubResult};

#[derive(Debug, Clone)]
pub struct GithubProvider {
    client: ClientWithMiddleware,
}

impl GithubProvider {
    fn new_inner(pat: Option<String>) -> GithubResult<Self> {
        let headers = {
            let mut headers = HeaderMap::new();
            headers.insert(
                HeaderName::from_static("x-github-api-version"),
                HeaderValue::from_static("2022-11-28"),
            );
            if let Some(pat) = pat {
                let token = format!("Bearer {pat}");
                headers.insert(AUTHORIZATION, HeaderValue::from_str(&token)?);
            }
            headers
        };

        let client = create_client(headers)?;

        Ok(Self { client })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> GithubResult<T> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /**
        Creates a new GitHub provider instance.

        # Errors

        - If the GitHub API client could not be created.
    */
    pub fn new() -> GithubResult<Self> {
        Self::new_inner(None)
    }

    /**
        Creates a new authenticated GitHub provider instance with a token.

        Authenticated requests have a much higher rate limit,
        which matters when running on shared CI runners.

        # Errors

        - If the GitHub API client could not be created.
    */
    pub fn new_authenticated(pat: impl AsRef<str>) -> GithubResult<Self> {
        let pat: String = pat.as_ref().trim().to_string();
        Self::new_inner(Some(pat))
    }

    /**
        Fetches the published releases of a repository.

        Only the first page of releases returned by GitHub is considered.
        Unpublished releases (drafts) are skipped.
    */
    #[instrument(skip(self), fields(%repo), level = "debug")]
    pub async fn list_releases(&self, repo: &RepoId) -> GithubResult<Vec<ReleaseRecord>> {
        debug!(%repo, "fetching releases");

        let url = format!(
            "{BASE_URL}/repos/{owner}/{name}/releases",
            owner = repo.owner(),
            name = repo.name(),
        );

        let releases: Vec<GithubRelease> = match self.get_json(&url).await {
            Err(e) if is_404(&e) => return Err(GithubError::RepositoryNotFound(repo.clone())),
            Err(e) => return Err(e),
            Ok(r) => r,
        };

        let total = releases.len();
        let records = releases
            .into_iter()
            .filter_map(|release| ReleaseRecord::from_github(release, repo))
            .collect::<Vec<_>>();
        debug!(total, published = records.len(), "fetched releases");

        Ok(records)
    }

    /**
        Fetches the most recently published release
        whose name contains the given keyword.
    */
    #[instrument(skip(self), fields(%repo), level = "debug")]
    pub async fn find_latest_release(
        &self,
        repo: &RepoId,
        keyword: &str,
    ) -> GithubResult<ReleaseRecord> {
        let releases = self.list_releases(repo).await?;
        latest_matching(&releases, keyword)
            .cloned()
            .ok_or_else(|| GithubError::ReleaseNotFound {
                repo: repo.clone(),
                keyword: keyword.to_string(),
            })
    }

    /**
        Fetches every published release whose name
        contains the given keyword, oldest first.

        Returns an empty list if nothing matches.
    */
    #[instrument(skip(self), fields(%repo), level = "debug")]
    pub async fn find_matching_releases(
        &self,
        repo: &RepoId,
        keyword: &str,
    ) -> GithubResult<Vec<ReleaseRecord>> {
        let releases = self.list_releases(repo).await?;
        Ok(all_matching(&releases, keyword))
    }
}

fn is_404(err: &GithubError) -> bool {
    if let GithubError::Reqwest(reqwest_err) = err
        && let Some(status) = reqwest_err.status()
    {
        return status == StatusCode::NOT_FOUND;
    }
    false
}
