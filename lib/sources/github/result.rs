use thiserror::Error;

use crate::repo::RepoId;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("repository '{0}' was not found")]
    RepositoryNotFound(RepoId),
    #[error("no release of '{repo}' has a name containing '{keyword}'")]
    ReleaseNotFound { repo: RepoId, keyword: String },
    #[error("failed to build client - invalid header value: {0}")]
    ReqwestHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("reqwest middleware error: {0}")]
    ReqwestMiddleware(#[from] reqwest_middleware::Error),
}

pub type GithubResult<T> = Result<T, GithubError>;
