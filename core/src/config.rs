use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_REMOTE_NAME: &str = "weight-tracker.db";

/// Paths and names the tracker works with, resolved once by the caller and
/// handed to `Tracker::new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub store_path: PathBuf,
    pub export_path: PathBuf,
    pub chart_path: PathBuf,
    /// Name of the snapshot on the remote side.
    pub remote_name: String,
}

/// Key into the credential store: which service, which field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CredentialRef {
    pub service: String,
    pub field: String,
}

impl Default for CredentialRef {
    fn default() -> Self {
        Self {
            service: "dropbox".to_string(),
            field: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum RemoteConfig {
    Dropbox {
        #[serde(default = "default_remote_name")]
        name: String,
        #[serde(default)]
        credential: CredentialRef,
    },
    Directory {
        path: PathBuf,
        #[serde(default = "default_remote_name")]
        name: String,
    },
}

impl RemoteConfig {
    pub fn name(&self) -> &str {
        match self {
            RemoteConfig::Dropbox { name, .. } | RemoteConfig::Directory { name, .. } => name,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig::Dropbox {
            name: default_remote_name(),
            credential: CredentialRef::default(),
        }
    }
}

fn default_remote_name() -> String {
    DEFAULT_REMOTE_NAME.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        remote: RemoteConfig,
    }

    fn parse(json: &str) -> RemoteConfig {
        serde_json::from_str::<Wrapper>(json).unwrap().remote
    }

    #[test]
    fn test_remote_config_dropbox_defaults() {
        let remote = parse(r#"{"remote": {"backend": "dropbox"}}"#);
        assert_eq!(remote, RemoteConfig::default());
        assert_eq!(remote.name(), "weight-tracker.db");
    }

    #[test]
    fn test_remote_config_dropbox_custom_credential() {
        let remote = parse(
            r#"{"remote": {"backend": "dropbox", "name": "w.db",
                "credential": {"service": "dbx", "field": "me"}}}"#,
        );
        assert_eq!(
            remote,
            RemoteConfig::Dropbox {
                name: "w.db".to_string(),
                credential: CredentialRef {
                    service: "dbx".to_string(),
                    field: "me".to_string(),
                },
            }
        );
    }

    #[test]
    fn test_remote_config_directory() {
        let remote = parse(r#"{"remote": {"backend": "directory", "path": "/mnt/sync"}}"#);
        assert_eq!(
            remote,
            RemoteConfig::Directory {
                path: PathBuf::from("/mnt/sync"),
                name: DEFAULT_REMOTE_NAME.to_string(),
            }
        );
    }

    #[test]
    fn test_remote_config_unknown_backend() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"remote": {"backend": "ftp"}}"#).is_err());
    }
}
