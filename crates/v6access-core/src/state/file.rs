// # Preferences File Store
//
// PreferencesStore backed by the server's preferences file on disk.
//
// ## Purpose
//
// Lets the updater run without the server's HTTP API: the identifier, the
// mapped port and the current custom access URLs are all read from the
// file, and the new value is written straight back into it.
//
// ## Writes
//
// - Atomic: the document is written to a sibling `.tmp` file, then renamed
//   over the target
// - The file is created owner read/write only (0600) on Unix
// - A replaced file keeps its owner and group on Unix
// - Every attribute other than `customConnections` is written back
//   unchanged and in its original order
//
// ## Reads
//
// Settings that were never changed are left out of the file, so an absent
// `customConnections` reads as an empty list.
//
// ## File Format
//
// ```xml
// <?xml version="1.0" encoding="utf-8"?>
// <Preferences MachineIdentifier="..." ProcessedMachineIdentifier="..." PlexOnlineToken="..." customConnections="..."></Preferences>
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::preferences::{Preferences, keys};
use crate::traits::PreferencesStore;

/// Permissions of a written preferences file
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// A preferences document and the path it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    path: PathBuf,
    preferences: Preferences,
}

impl ConfigFile {
    /// Wrap an in-memory document that will be written to `path`
    pub fn new<P: AsRef<Path>>(path: P, preferences: Preferences) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            preferences,
        }
    }

    /// Read and decode the preferences file at `path`
    ///
    /// The document is not validated; see [`ConfigFileStore::open`].
    pub async fn read<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        let bytes = fs::read(&path).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read preferences file {}: {}", path.display(), e),
            ))
        })?;

        let preferences = Preferences::decode(&bytes).map_err(|e| {
            Error::parse(format!(
                "Failed to parse preferences file {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!(
            "Loaded {} preference(s) from {}",
            preferences.len(),
            path.display()
        );

        Ok(Self { path, preferences })
    }

    /// Encode the document and atomically replace the file
    pub async fn write(&self) -> Result<(), Error> {
        let bytes = self.preferences.encode()?;

        let temp_path = self.temp_path();
        {
            let mut options = fs::OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            options.mode(FILE_MODE);

            let mut file = options.open(&temp_path).await.map_err(|e| {
                write_error(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(&bytes).await.map_err(|e| {
                write_error(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                write_error(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // An existing temp file keeps its old mode through open()
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(FILE_MODE))
                .await
                .map_err(|e| {
                    write_error(format!(
                        "Failed to set permissions on {}: {}",
                        temp_path.display(),
                        e
                    ))
                })?;

            self.copy_ownership_to(&temp_path).await?;
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            write_error(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Preferences written to file: {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    /// Give `temp_path` the owner and group of the file it will replace
    ///
    /// The server reads its preferences as its own user, so the file must
    /// not change hands when the updater runs as another user.
    #[cfg(unix)]
    async fn copy_ownership_to(&self, temp_path: &Path) -> Result<(), Error> {
        use std::os::unix::fs::MetadataExt;

        let target = match fs::metadata(&self.path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(write_error(format!(
                    "Failed to read owner of {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let temp = fs::metadata(temp_path).await.map_err(|e| {
            write_error(format!(
                "Failed to read owner of {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        if temp.uid() == target.uid() && temp.gid() == target.gid() {
            return Ok(());
        }

        std::os::unix::fs::chown(temp_path, Some(target.uid()), Some(target.gid())).map_err(
            |e| {
                write_error(format!(
                    "Failed to change owner of {} to {}:{}: {}",
                    temp_path.display(),
                    target.uid(),
                    target.gid(),
                    e
                ))
            },
        )
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        PathBuf::from(temp)
    }
}

fn write_error(message: String) -> Error {
    Error::Io(std::io::Error::other(message))
}

/// PreferencesStore over a validated preferences file
///
/// # Example
///
/// ```rust,no_run
/// use v6access_core::state::ConfigFileStore;
/// use v6access_core::traits::PreferencesStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = ConfigFileStore::open("/var/lib/plexmediaserver/Preferences.xml").await?;
///
///     let identifier = store.device_identifier().await?;
///     store.update_custom_connections("http://example.com:32400").await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigFileStore {
    file: Arc<RwLock<ConfigFile>>,
}

impl ConfigFileStore {
    /// Read and validate the preferences file at `path`
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = ConfigFile::read(path).await?;
        file.preferences().validate()?;

        Ok(Self {
            file: Arc::new(RwLock::new(file)),
        })
    }

    /// Access token stored in the file
    pub async fn token(&self) -> Option<String> {
        let guard = self.file.read().await;
        guard.preferences().token().map(str::to_string)
    }
}

#[async_trait]
impl PreferencesStore for ConfigFileStore {
    async fn device_identifier(&self) -> Result<String, Error> {
        let guard = self.file.read().await;
        guard
            .preferences()
            .processed_machine_identifier()
            .map(str::to_string)
            .ok_or_else(|| {
                Error::not_found(format!("no such setting: {}", keys::PROCESSED_MACHINE_IDENTIFIER))
            })
    }

    /// Preferences from the file, with an absent `customConnections` read as empty
    async fn fetch_preferences(&self) -> Result<Preferences, Error> {
        let guard = self.file.read().await;
        let mut preferences = guard.preferences().clone();
        if preferences.custom_connections().is_none() {
            preferences.set_custom_connections("");
        }
        Ok(preferences)
    }

    async fn update_custom_connections(&self, value: &str) -> Result<(), Error> {
        let mut guard = self.file.write().await;
        let mut updated = guard.clone();
        updated.preferences_mut().set_custom_connections(value);
        updated.write().await?;

        // Only adopt the new value once it is on disk
        *guard = updated;
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "config-file"
    }
}
