use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::warn;

use weigh_core::config::CredentialRef;

/// Secrets keyed by `(service, field)`, kept in a TOML file:
///
/// ```toml
/// [dropbox]
/// default = "sl.B..."
/// ```
pub struct CredentialStore {
    path: PathBuf,
    entries: HashMap<String, HashMap<String, String>>,
}

impl CredentialStore {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                path: path.to_path_buf(),
                entries: HashMap::new(),
            });
        }

        warn_if_readable_by_others(path);

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;
        let entries = toml::from_str(&text)
            .with_context(|| format!("Invalid credentials file: {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn get(&self, key: &CredentialRef) -> Result<String> {
        let value = self
            .entries
            .get(&key.service)
            .and_then(|fields| fields.get(&key.field))
            .map(|v| v.trim())
            .unwrap_or_default();

        if value.is_empty() {
            bail!(
                "No credential for {}.{} in {}. Add it there, or run with --offline",
                key.service,
                key.field,
                self.path.display()
            );
        }
        Ok(value.to_string())
    }
}

#[cfg(unix)]
fn warn_if_readable_by_others(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(meta) = std::fs::metadata(path) {
        let mode = meta.permissions().mode();
        if mode & 0o077 != 0 {
            warn!(
                path = %path.display(),
                mode = %format!("{:o}", mode & 0o777),
                "credentials file is readable by other users; consider chmod 600"
            );
        }
    }
}

#[cfg(not(unix))]
fn warn_if_readable_by_others(_path: &Path) {}
