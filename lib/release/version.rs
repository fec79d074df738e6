use std::sync::LazyLock;

use regex::Regex;

use crate::result::{UpdaterError, UpdaterResult};

static VERSION_XYZ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+").expect("version pattern should be valid"));

/**
    Extracts the first `X.Y.Z` version found in the given
    release tag, ignoring any leading `v` characters.

    # Errors

    - If the tag contains no version in `X.Y.Z` format.
*/
pub fn extract_version(tag: &str) -> UpdaterResult<String> {
    let stripped = tag.trim_start_matches('v');
    VERSION_XYZ
        .find(stripped)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| UpdaterError::VersionFormat(tag.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_versions() {
        assert_eq!(extract_version("1.0.0").unwrap(), "1.0.0");
        assert_eq!(extract_version("v1.0.0").unwrap(), "1.0.0");
    }

    #[test]
    fn extracts_from_decorated_tags() {
        assert_eq!(extract_version("v2.10.3-beta").unwrap(), "2.10.3");
        assert_eq!(extract_version("release-19.49.7 (5.2b4)").unwrap(), "19.49.7");
        // Only the first three components are used
        assert_eq!(extract_version("v1.2.3.4").unwrap(), "1.2.3");
    }

    #[test]
    fn rejects_tags_without_xyz() {
        assert!(matches!(
            extract_version("nightly"),
            Err(UpdaterError::VersionFormat(tag)) if tag == "nightly"
        ));
        assert!(extract_version("v1.2").is_err());
        assert!(extract_version("").is_err());
    }
}
