//! JSON file store with serialized, all-or-nothing writes
//!
//! Every mutation runs inside [`JsonStore::transaction`]: writers queue on a
//! single async mutex, work on a copy of the document, and only a successful
//! closure is persisted and committed. A failed closure leaves both the file
//! and the in-memory document exactly as they were.
//!
//! The file is written to a sibling `<name>.tmp` file first and then renamed over
//! the original, so a crash mid-write never leaves a truncated document.
//!
//! If the file is modified by another process (fixture resets between
//! end-to-end runs, manual edits), the change is picked up before the next
//! operation.

use super::document::StoreDocument;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("Store I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document could not be parsed or serialized
    #[error("Store document is not valid: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The user id counter cannot advance any further
    #[error("No user identifiers left to allocate")]
    IdsExhausted,
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

struct StoreState {
    document: StoreDocument,

    /// Modification time of the file as last read or written by us
    modified: Option<SystemTime>,
}

/// Record store backed by one JSON file
pub struct JsonStore {
    /// None for in-memory stores
    path: Option<PathBuf>,

    state: Mutex<StoreState>,
}

impl JsonStore {
    /// Opens the store at `path`
    ///
    /// A missing file is created with an empty document. An empty file is
    /// treated the same way.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written, or if its
    /// content is not a valid store document.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let (document, modified) = match read_document(&path).await? {
            Some(loaded) => loaded,
            None => {
                info!(path = %path.display(), "Store file not found, creating empty document");
                let document = StoreDocument::default();
                let modified = write_document(&path, &document).await?;
                (document, modified)
            }
        };

        info!(
            path = %path.display(),
            users = document.users.len(),
            pending_email_changes = document.pending_email_changes.len(),
            "Store opened"
        );

        Ok(Self {
            path: Some(path),
            state: Mutex::new(StoreState { document, modified }),
        })
    }

    /// Creates a store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self::from_document(StoreDocument::default())
    }

    /// Creates an in-memory store seeded with `document`
    pub fn from_document(document: StoreDocument) -> Self {
        Self {
            path: None,
            state: Mutex::new(StoreState {
                document,
                modified: None,
            }),
        }
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Runs `f` against the current document
    pub async fn read<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&StoreDocument) -> T,
    {
        let mut state = self.state.lock().await;
        self.refresh(&mut state).await?;

        Ok(f(&state.document))
    }

    /// Runs `f` against a working copy and commits it if `f` succeeds
    ///
    /// On `Ok` the working copy is persisted and replaces the current
    /// document. On `Err` it is dropped and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a [`StoreError`] (converted into `E`)
    /// if refreshing or persisting the document fails.
    ///
    /// # Example
    ///
    /// ```
    /// use linkup_shared::store::{JsonStore, StoreError};
    ///
    /// # async fn example() -> Result<(), StoreError> {
    /// let store = JsonStore::in_memory();
    /// let id = store
    ///     .transaction(|doc| doc.allocate_user_id())
    ///     .await?;
    /// assert_eq!(id.value(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut StoreDocument) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut state = self.state.lock().await;
        self.refresh(&mut state).await?;

        let mut working = state.document.clone();
        let value = f(&mut working)?;

        if working != state.document {
            if let Some(path) = &self.path {
                state.modified = write_document(path, &working).await?;
            }
            state.document = working;
        }

        Ok(value)
    }

    /// Reloads the document if the file changed behind our back
    async fn refresh(&self, state: &mut StoreState) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let modified = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata.modified().ok(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Store file removed, keeping last known document");
                return Ok(());
            }
            Err(err) => return Err(StoreError::io(path, err)),
        };

        if modified.is_some() && modified == state.modified {
            return Ok(());
        }

        if let Some((document, modified)) = read_document(path).await? {
            debug!(path = %path.display(), "Store file changed on disk, reloading");
            state.document = document;
            state.modified = modified;
        }

        Ok(())
    }
}

async fn read_document(
    path: &Path,
) -> Result<Option<(StoreDocument, Option<SystemTime>)>, StoreError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StoreError::io(path, err)),
    };

    let modified = tokio::fs::metadata(path)
        .await
        .ok()
        .and_then(|metadata| metadata.modified().ok());

    if raw.trim().is_empty() {
        return Ok(Some((StoreDocument::default(), modified)));
    }

    let document = serde_json::from_str(&raw)?;
    Ok(Some((document, modified)))
}

/// `db.json` is staged as `db.json.tmp`, so stores sharing a stem never share a temp file
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Writes the document and returns the new modification time
async fn write_document(
    path: &Path,
    document: &StoreDocument,
) -> Result<Option<SystemTime>, StoreError> {
    let bytes = serde_json::to_vec_pretty(document)?;

    let temp_path = temp_path_for(path);
    tokio::fs::write(&temp_path, &bytes)
        .await
        .map_err(|err| StoreError::io(&temp_path, err))?;
    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|err| StoreError::io(path, err))?;

    let modified = tokio::fs::metadata(path)
        .await
        .ok()
        .and_then(|metadata| metadata.modified().ok());

    Ok(modified)
}
