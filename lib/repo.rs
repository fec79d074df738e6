use std::{fmt, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

/**
    Error type representing the possible errors that can occur when parsing a `RepoId`.
*/
#[derive(Debug, Error)]
pub enum RepoIdParseError {
    #[error("repository id is empty")]
    Empty,
    #[error("missing '/' separator")]
    MissingSeparator,
    #[error("owner '{0}' is empty or invalid")]
    InvalidOwner(String),
    #[error("name '{0}' is empty or invalid")]
    InvalidName(String),
}

/**
    A GitHub repository identifier, in the form `owner/name`.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /**
        The public page for the release with the given tag.
    */
    #[must_use]
    pub fn release_page_url(&self, tag: &str) -> String {
        format!(
            "https://github.com/{}/{}/releases/tag/{tag}",
            self.owner, self.name
        )
    }
}

fn is_invalid_identifier(s: &str) -> bool {
    s.is_empty() // Must not be empty
        || s.chars().any(char::is_whitespace) // Must not contain whitespace
        || s.chars().any(|c| c == '/') // Must not contain the separator character
}

impl FromStr for RepoId {
    type Err = RepoIdParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s
            .trim()
            .trim_start_matches("https://github.com/")
            .trim_end_matches(".git");
        if s.is_empty() {
            return Err(RepoIdParseError::Empty);
        }

        let Some((before, after)) = s.split_once('/') else {
            return Err(RepoIdParseError::MissingSeparator);
        };

        let before = before.trim();
        let after = after.trim();

        if is_invalid_identifier(before) {
            return Err(RepoIdParseError::InvalidOwner(before.to_string()));
        }
        if is_invalid_identifier(after) {
            return Err(RepoIdParseError::InvalidName(after.to_string()));
        }

        Ok(Self {
            owner: before.to_string(),
            name: after.to_string(),
        })
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_id(owner: &str, name: &str) -> RepoId {
        RepoId {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn parse_valid_basic() {
        assert_eq!("a/b".parse::<RepoId>().unwrap(), new_id("a", "b"));
        assert_eq!(
            "Balackburn/YTLitePlus".parse::<RepoId>().unwrap(),
            new_id("Balackburn", "YTLitePlus")
        );
    }

    #[test]
    fn parse_valid_extra_whitespace() {
        let id = new_id("a", "b");
        assert_eq!("a/ b".parse::<RepoId>().unwrap(), id);
        assert_eq!(" a /b ".parse::<RepoId>().unwrap(), id);
    }

    #[test]
    fn parse_valid_github_url() {
        assert_eq!(
            "https://github.com/owner/repo.git"
                .parse::<RepoId>()
                .unwrap(),
            new_id("owner", "repo")
        );
    }

    #[test]
    fn parse_invalid() {
        assert!(matches!("".parse::<RepoId>(), Err(RepoIdParseError::Empty)));
        assert!(matches!(
            "owner".parse::<RepoId>(),
            Err(RepoIdParseError::MissingSeparator)
        ));
        assert!(matches!(
            "/name".parse::<RepoId>(),
            Err(RepoIdParseError::InvalidOwner(_))
        ));
        assert!(matches!(
            "owner/".parse::<RepoId>(),
            Err(RepoIdParseError::InvalidName(_))
        ));
        assert!(matches!(
            "owner/name/extra".parse::<RepoId>(),
            Err(RepoIdParseError::InvalidName(_))
        ));
    }

    #[test]
    fn display_and_release_page() {
        let id = new_id("owner", "repo");
        assert_eq!(id.to_string(), "owner/repo");
        assert_eq!(
            id.release_page_url("v1.2.3"),
            "https://github.com/owner/repo/releases/tag/v1.2.3"
        );
    }
}
