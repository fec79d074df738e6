#![allow(clippy::to_string_trait_impl)]
// NOTE: We don't want to implement Display here since it may
// make library consumers think that manifests are meant
// to be displayed - they are only meant to be stringified.

use std::{path::Path, str::FromStr};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::{
    result::{UpdaterError, UpdaterResult},
    util::fs::{load_string_from_file, save_to_file_atomic},
};

mod entries;

pub use self::entries::{NewsEntry, VersionEntry};

pub const MANIFEST_FILE_NAME: &str = "apps.json";

/**
    An AltStore source manifest.

    Only the first app and the top-level `news` array are ever modified,
    everything else in the document is kept as-is, including key order.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct AppsManifest {
    document: Value,
}

impl AppsManifest {
    /**
        Loads the manifest from the file at the given path.

        # Errors

        - If the file does not exist or could not be read.
        - If the file does not contain valid JSON.
    */
    #[instrument(skip(path), level = "trace")]
    pub async fn load(path: impl AsRef<Path>) -> UpdaterResult<Self> {
        let path = path.as_ref();
        tracing::trace!(?path, "Loading manifest");
        let contents = load_string_from_file(path).await?;
        contents
            .parse()
            .map_err(|source| UpdaterError::ManifestParse {
                path: path.to_path_buf(),
                source,
            })
    }

    /**
        Saves the manifest to the file at the given path, replacing it atomically.

        # Errors

        - If the manifest could not be written.
    */
    #[instrument(skip(self, path), level = "trace")]
    pub async fn save(&self, path: impl AsRef<Path>) -> UpdaterResult<()> {
        let path = path.as_ref();
        tracing::trace!(?path, "Saving manifest");
        save_to_file_atomic(path, self.to_string()).await
    }

    /**
        Gets the first app in the manifest, if there is one.
    */
    #[must_use]
    pub fn app(&self) -> Option<&Map<String, Value>> {
        self.document.get("apps")?.get(0)?.as_object()
    }

    fn app_mut(&mut self) -> UpdaterResult<&mut Map<String, Value>> {
        self.document
            .get_mut("apps")
            .and_then(Value::as_array_mut)
            .and_then(|apps| apps.first_mut())
            .and_then(Value::as_object_mut)
            .ok_or_else(|| UpdaterError::ManifestShape("expected an object at 'apps[0]'".into()))
    }

    /**
        Returns all valid version entries of the first app, newest first.

        Entries that do not match the expected format are skipped.
    */
    #[must_use]
    pub fn versions(&self) -> Vec<VersionEntry> {
        parse_entries(self.app().and_then(|app| app.get("versions")))
    }

    /**
        Returns all valid news entries in the manifest.

        Entries that do not match the expected format are skipped.
    */
    #[must_use]
    pub fn news(&self) -> Vec<NewsEntry> {
        parse_entries(self.document.get("news"))
    }

    /**
        Inserts a version entry at the front of the first app's `versions`,
        removing any existing entry with the same version first.

        Creates the `versions` array if it does not exist yet.

        Returns `true` if an existing entry was replaced.

        # Errors

        - If the manifest has no first app, or its `versions` is not an array.
    */
    pub fn upsert_version(&mut self, entry: &VersionEntry) -> UpdaterResult<bool> {
        let value = serde_json::to_value(entry)?;
        let versions = array_entry(self.app_mut()?, "versions", "apps[0].versions")?;

        let existing = versions.iter().position(|item| {
            item.get("version").and_then(Value::as_str) == Some(entry.version.as_str())
        });
        if let Some(index) = existing {
            debug!(version = %entry.version, "replacing existing version entry");
            versions.remove(index);
        }

        versions.insert(0, value);
        Ok(existing.is_some())
    }

    /**
        Sets the first app's current version fields to mirror the given entry.

        # Errors

        - If the manifest has no first app.
    */
    pub fn set_current_version(&mut self, entry: &VersionEntry) -> UpdaterResult<()> {
        let app = self.app_mut()?;
        app.insert("version".into(), Value::from(entry.version.clone()));
        app.insert("versionDate".into(), Value::from(entry.date.clone()));
        app.insert(
            "versionDescription".into(),
            Value::from(entry.localized_description.clone()),
        );
        app.insert("downloadURL".into(), Value::from(entry.download_url.clone()));
        app.insert("size".into(), Value::from(entry.size));
        Ok(())
    }

    /**
        Appends a news entry, unless one with the same identifier already exists.

        Existing entries are never modified. Creates the `news` array if it does not exist yet.

        Returns `true` if the entry was added.

        # Errors

        - If the manifest is not an object, or its `news` is not an array.
    */
    pub fn add_news(&mut self, entry: &NewsEntry) -> UpdaterResult<bool> {
        let value = serde_json::to_value(entry)?;
        let root = self
            .document
            .as_object_mut()
            .ok_or_else(|| UpdaterError::ManifestShape("expected a top-level object".into()))?;
        let news = array_entry(root, "news", "news")?;

        let exists = news.iter().any(|item| {
            item.get("identifier").and_then(Value::as_str) == Some(entry.identifier.as_str())
        });
        if exists {
            debug!(identifier = %entry.identifier, "news entry already exists");
            return Ok(false);
        }

        news.push(value);
        Ok(true)
    }
}

fn array_entry<'a>(
    object: &'a mut Map<String, Value>,
    key: &str,
    display_path: &str,
) -> UpdaterResult<&'a mut Vec<Value>> {
    object
        .entry(key)
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or_else(|| UpdaterError::ManifestShape(format!("expected an array at '{display_path}'")))
}

fn parse_entries<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

impl FromStr for AppsManifest {
    type Err = serde_json::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let document = serde_json::from_str(s)?;
        Ok(Self { document })
    }
}

impl ToString for AppsManifest {
    fn to_string(&self) -> String {
        format!("{:#}", self.document)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn manifest(value: Value) -> AppsManifest {
        AppsManifest { document: value }
    }

    fn version(v: &str) -> VersionEntry {
        VersionEntry {
            version: v.to_string(),
            date: "2024-01-01".to_string(),
            localized_description: format!("notes for {v}"),
            download_url: Some(format!("https://x/{v}.ipa")),
            size: Some(1000),
        }
    }

    fn news(identifier: &str, title: &str) -> NewsEntry {
        NewsEntry {
            app_id: "com.example.app".to_string(),
            caption: "caption".to_string(),
            date: "2024-01-01T00:00:00Z".to_string(),
            identifier: identifier.to_string(),
            image_url: "https://x/news.png".to_string(),
            notify: true,
            tint_color: "000000".to_string(),
            title: title.to_string(),
            url: "https://x".to_string(),
        }
    }

    #[test]
    fn upsert_creates_versions_and_inserts_at_front() {
        let mut m = manifest(json!({ "apps": [{ "name": "App" }] }));
        assert!(!m.upsert_version(&version("1.0.0")).unwrap());
        assert!(!m.upsert_version(&version("1.1.0")).unwrap());
        let versions = m.versions();
        assert_eq!(versions, vec![version("1.1.0"), version("1.0.0")]);
    }

    #[test]
    fn upsert_replaces_existing_and_keeps_order() {
        let mut m = manifest(json!({ "apps": [{}] }));
        for v in ["1.0.0", "1.1.0", "1.2.0"] {
            m.upsert_version(&version(v)).unwrap();
        }

        let mut updated = version("1.1.0");
        updated.localized_description = "updated".to_string();
        assert!(m.upsert_version(&updated).unwrap());

        let names = m
            .versions()
            .into_iter()
            .map(|v| v.version)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["1.1.0", "1.2.0", "1.0.0"]);
        assert_eq!(m.versions()[0].localized_description, "updated");
    }

    #[test]
    fn current_version_mirrors_entry() {
        let mut m = manifest(json!({ "apps": [{ "name": "App", "version": "0.1.0" }] }));
        let mut entry = version("2.0.0");
        entry.download_url = None;
        entry.size = None;
        m.set_current_version(&entry).unwrap();

        let app = m.app().unwrap();
        assert_eq!(app["version"], json!("2.0.0"));
        assert_eq!(app["versionDate"], json!("2024-01-01"));
        assert_eq!(app["versionDescription"], json!("notes for 2.0.0"));
        assert_eq!(app["downloadURL"], Value::Null);
        assert_eq!(app["size"], Value::Null);
    }

    #[test]
    fn news_is_only_added_once() {
        let mut m = manifest(json!({ "apps": [{}] }));
        assert!(m.add_news(&news("release-1.0.0", "first")).unwrap());
        assert!(!m.add_news(&news("release-1.0.0", "second")).unwrap());

        let all = m.news();
        assert_eq!(all.len(), 1);
        // The existing entry is never updated
        assert_eq!(all[0].title, "first");
    }

    #[test]
    fn unrelated_fields_round_trip() {
        let source = r#"{
  "name": "My Source",
  "identifier": "com.example.source",
  "apps": [
    {
      "name": "App",
      "bundleIdentifier": "com.example.app",
      "screenshotURLs": [
        "https://x/1.png"
      ],
      "versions": []
    },
    {
      "name": "Other"
    }
  ],
  "news": [],
  "userInfo": {}
}"#;
        let m = source.parse::<AppsManifest>().unwrap();
        assert_eq!(m.to_string(), source);

        let mut m = m;
        m.upsert_version(&version("1.0.0")).unwrap();
        let reparsed: Value = serde_json::from_str(&m.to_string()).unwrap();
        assert_eq!(reparsed["name"], json!("My Source"));
        assert_eq!(reparsed["apps"][1], json!({ "name": "Other" }));
        assert_eq!(reparsed["apps"][0]["screenshotURLs"], json!(["https://x/1.png"]));
        assert_eq!(reparsed["userInfo"], json!({}));
        let keys = reparsed
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["name", "identifier", "apps", "news", "userInfo"]);
    }

    #[test]
    fn invalid_shapes_are_errors() {
        let mut no_apps = manifest(json!({ "news": [] }));
        assert!(matches!(
            no_apps.upsert_version(&version("1.0.0")),
            Err(UpdaterError::ManifestShape(_))
        ));

        let mut empty_apps = manifest(json!({ "apps": [] }));
        assert!(matches!(
            empty_apps.set_current_version(&version("1.0.0")),
            Err(UpdaterError::ManifestShape(_))
        ));

        let mut bad_versions = manifest(json!({ "apps": [{ "versions": "nope" }] }));
        assert!(matches!(
            bad_versions.upsert_version(&version("1.0.0")),
            Err(UpdaterError::ManifestShape(_))
        ));

        let mut bad_news = manifest(json!({ "apps": [{}], "news": {} }));
        assert!(matches!(
            bad_news.add_news(&news("release-1.0.0", "t")),
            Err(UpdaterError::ManifestShape(_))
        ));
    }

    #[tokio::test]
    async fn load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE_NAME);

        tokio::fs::write(&path, r#"{"apps":[{"name":"App"}]}"#)
            .await
            .unwrap();
        let mut m = AppsManifest::load(&path).await.unwrap();
        m.upsert_version(&version("1.0.0")).unwrap();
        m.save(&path).await.unwrap();

        let reloaded = AppsManifest::load(&path).await.unwrap();
        assert_eq!(reloaded, m);
        assert_eq!(reloaded.versions(), vec![version("1.0.0")]);
    }

    #[tokio::test]
    async fn load_malformed_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE_NAME);
        tokio::fs::write(&path, "{ not json").await.unwrap();
        assert!(matches!(
            AppsManifest::load(&path).await,
            Err(UpdaterError::ManifestParse { .. })
        ));
    }
}
