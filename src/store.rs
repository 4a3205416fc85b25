//! Credential file handling.
//!
//! The credentials file must exist before the first run with `APP_NAME` and
//! `CLIENT_KEY` filled in. The token fields are written back once the
//! exchange succeeds.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info};

use crate::{Credentials, PocketError, Result};

/// Default credentials file name, resolved against the working directory
pub const DEFAULT_CONFIG_FILE: &str = "pocketcache.config.json";

/// Reads and writes the credentials file at a fixed path
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load credentials from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// lacks `APP_NAME` / `CLIENT_KEY`.
    pub fn load(&self) -> Result<Credentials> {
        let contents = fs::read_to_string(&self.path).map_err(|source| PocketError::ConfigRead {
            path: self.path.clone(),
            source,
        })?;
        let credentials: Credentials =
            serde_json::from_str(&contents).map_err(|source| PocketError::ConfigParse {
                path: self.path.clone(),
                source,
            })?;

        if credentials.app_name.trim().is_empty() {
            return Err(PocketError::InvalidConfig("APP_NAME is empty".to_string()));
        }
        if credentials.client_key.trim().is_empty() {
            return Err(PocketError::InvalidConfig("CLIENT_KEY is empty".to_string()));
        }

        info!(
            path = %self.path.display(),
            app_name = %credentials.app_name,
            has_access_token = credentials.is_authorized(),
            "loaded credentials"
        );
        Ok(credentials)
    }

    /// Overwrite the credentials file with the full record.
    ///
    /// The file only ever holds tokens, so it is created owner-only.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        write_json(&self.path, credentials, true)?;
        debug!(path = %self.path.display(), "persisted credentials");
        Ok(())
    }
}

/// Serialize `value` with tab indentation and a trailing newline.
pub(crate) fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Write `value` as pretty JSON, replacing `path` atomically.
///
/// Writes to a temporary file next to the target and renames it over the
/// target, so readers see either the old or the new document.
pub(crate) fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    owner_only: bool,
) -> Result<usize> {
    let bytes = to_pretty_json(value)?;
    let write_err = |source| PocketError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = dir.join(format!(".{file_name}.tmp.{}", std::process::id()));

    let replaced =
        write_tmp(&tmp_path, &bytes, owner_only).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(source) = replaced {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_err(source));
    }

    Ok(bytes.len())
}

fn write_tmp(tmp_path: &Path, bytes: &[u8], owner_only: bool) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if owner_only {
            fs::set_permissions(tmp_path, fs::Permissions::from_mode(0o600))?;
        }
    }
    #[cfg(not(unix))]
    let _ = owner_only;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> CredentialStore {
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, contents).unwrap();
        CredentialStore::new(path)
    }

    #[test]
    fn test_load_reads_operator_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = write_config(&dir, r#"{"APP_NAME": "cache", "CLIENT_KEY": "1234-abcd"}"#);

        let creds = store.load().unwrap();
        assert_eq!(creds.app_name, "cache");
        assert_eq!(creds.client_key, "1234-abcd");
        assert!(creds.access_token.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("absent.json"));

        let err = store.load().unwrap_err();
        assert!(matches!(err, PocketError::ConfigRead { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = write_config(&dir, "{ not json");

        assert!(matches!(
            store.load().unwrap_err(),
            PocketError::ConfigParse { .. }
        ));
    }

    #[test]
    fn test_load_rejects_blank_client_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = write_config(&dir, r#"{"APP_NAME": "cache", "CLIENT_KEY": "  "}"#);

        assert!(matches!(
            store.load().unwrap_err(),
            PocketError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_save_writes_tab_indented_record_with_newline() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join(DEFAULT_CONFIG_FILE));
        let creds = Credentials {
            app_name: "cache".into(),
            client_key: "key".into(),
            access_token: "tok1".into(),
            request_token: "req".into(),
        };

        store.save(&creds).unwrap();

        let written = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            written,
            "{\n\t\"APP_NAME\": \"cache\",\n\t\"CLIENT_KEY\": \"key\",\n\t\"ACCESS_TOKEN\": \"tok1\",\n\t\"REQUEST_TOKEN\": \"req\"\n}\n"
        );
        assert_eq!(store.load().unwrap(), creds);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join(DEFAULT_CONFIG_FILE));
        store
            .save(&Credentials {
                app_name: "cache".into(),
                client_key: "key".into(),
                ..Default::default()
            })
            .unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("nope").join(DEFAULT_CONFIG_FILE));

        assert!(matches!(
            store.save(&Credentials::default()).unwrap_err(),
            PocketError::Write { .. }
        ));
    }

    #[test]
    fn test_failed_replace_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the target path makes the final rename fail.
        let target = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();
        let store = CredentialStore::new(&target);

        assert!(matches!(
            store.save(&Credentials::default()).unwrap_err(),
            PocketError::Write { .. }
        ));

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }
}
