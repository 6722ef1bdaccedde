//! Memory-mapped file backend.
//!
//! Each allocation maps its own `[offset, offset + size)` window of the
//! backing file with memmap2. The file carries no header and no allocation
//! metadata; only raw bytes persist across reopen.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::{MmapMut, MmapOptions};

use super::manager::ResourceManager;
use super::resource::{Block, Resource};
use super::tracker::Tracker;
use crate::error::ResourceError;

/// Largest single window, the 32-bit length limit of the mapping primitive.
pub const MAX_VIEW_LEN: usize = u32::MAX as usize;

/// Configuration for file-view managers.
#[derive(Debug, Clone)]
pub struct FileViewConfig {
    /// Largest window a single allocation may map.
    pub max_view_len: usize,
}

impl Default for FileViewConfig {
    fn default() -> Self {
        Self {
            max_view_len: MAX_VIEW_LEN,
        }
    }
}

/// A mapped window of the backing file. Unmapped on drop.
pub struct FileViewBlock {
    map: MmapMut,
    offset: usize,
}

impl Block for FileViewBlock {
    fn as_slice(&self) -> &[u8] {
        &self.map
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.map
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn flush(&self) -> std::io::Result<()> {
        self.map.flush()
    }
}

pub type FileView = Resource<FileViewBlock>;

#[derive(Debug)]
enum Backing {
    /// Named file on disk.
    File { file: File, path: PathBuf },
    /// Unnamed temporary file; contents vanish on close.
    Anonymous { file: File, label: String },
}

impl Backing {
    fn file(&self) -> &File {
        match self {
            Backing::File { file, .. } | Backing::Anonymous { file, .. } => file,
        }
    }
}

/// Manager that hands out mapped windows of a file.
///
/// Lifecycle: closed -> `open_file` / `open` -> open -> `close` -> closed.
#[derive(Debug, Default)]
pub struct FileViewManager {
    tracker: Tracker,
    config: FileViewConfig,
    backing: Option<Backing>,
    capacity: usize,
}

impl FileViewManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FileViewConfig) -> Self {
        Self {
            tracker: Tracker::new(),
            config,
            backing: None,
            capacity: 0,
        }
    }

    /// Open or create `path`, growing it to `declared_capacity` if smaller.
    ///
    /// Existing contents are kept. On failure the manager stays closed.
    pub fn open_file(
        &mut self,
        path: impl AsRef<Path>,
        declared_capacity: usize,
    ) -> Result<(), ResourceError> {
        self.close();
        let path = path.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let current = file.metadata()?.len();
        let declared = declared_capacity as u64;
        if declared > current {
            file.set_len(declared)?;
        }
        let size = current.max(declared);
        if size == 0 {
            return Err(ResourceError::EmptyBacking(path.to_path_buf()));
        }

        self.capacity = usize::try_from(size).unwrap_or(usize::MAX);
        self.backing = Some(Backing::File {
            file,
            path: path.to_path_buf(),
        });
        tracing::debug!(manager = %self.id(), path = %path.display(), capacity = self.capacity, "file opened");
        Ok(())
    }

    /// Open an anonymous store of exactly `capacity` bytes.
    ///
    /// `name` labels the store in diagnostics only.
    pub fn open(&mut self, name: &str, capacity: usize) -> Result<(), ResourceError> {
        self.close();
        if capacity == 0 {
            return Err(ResourceError::EmptyBacking(PathBuf::from(name)));
        }

        let file = tempfile::tempfile()?;
        file.set_len(capacity as u64)?;

        self.capacity = capacity;
        self.backing = Some(Backing::Anonymous {
            file,
            label: name.to_string(),
        });
        tracing::debug!(manager = %self.id(), name, capacity, "anonymous store opened");
        Ok(())
    }

    /// Release the backing file and reset capacity to zero.
    ///
    /// Handles still outstanding are revoked: they turn unbound, and their
    /// windows are unmapped when each handle is dropped.
    pub fn close(&mut self) {
        if self.backing.take().is_some() {
            let revoked = self.tracker.revoke_all();
            if revoked > 0 {
                tracing::warn!(manager = %self.id(), revoked, "store closed with live resources");
            }
            tracing::debug!(manager = %self.id(), "store closed");
        }
        self.capacity = 0;
    }

    pub fn is_open(&self) -> bool {
        self.backing.is_some()
    }

    /// Path of the backing file, when file-backed.
    pub fn path(&self) -> Option<&Path> {
        match &self.backing {
            Some(Backing::File { path, .. }) => Some(path),
            _ => None,
        }
    }

    /// Label of the anonymous store, when anonymous.
    pub fn label(&self) -> Option<&str> {
        match &self.backing {
            Some(Backing::Anonymous { label, .. }) => Some(label),
            _ => None,
        }
    }

    pub fn config(&self) -> &FileViewConfig {
        &self.config
    }
}

impl ResourceManager for FileViewManager {
    type Block = FileViewBlock;

    fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn ensure_ready(&self) -> Result<(), ResourceError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(ResourceError::Closed)
        }
    }

    fn acquire(&mut self, size: usize, offset: usize) -> Result<FileViewBlock, ResourceError> {
        let backing = self.backing.as_ref().ok_or(ResourceError::Closed)?;
        if size > self.config.max_view_len {
            return Err(ResourceError::ViewTooLarge {
                size,
                limit: self.config.max_view_len,
            });
        }
        if offset.checked_add(size).map_or(true, |end| end > self.capacity) {
            return Err(ResourceError::OutOfRange {
                offset,
                size,
                capacity: self.capacity,
            });
        }

        // SAFETY: the window lies inside the file, which this manager keeps at
        // least `capacity` bytes long. Changes made to the file by other
        // processes are visible through the mapping.
        let map = unsafe {
            MmapOptions::new()
                .offset(offset as u64)
                .len(size)
                .map_mut(backing.file())?
        };
        Ok(FileViewBlock { map, offset })
    }
}

impl Drop for FileViewManager {
    fn drop(&mut self) {
        self.close();
    }
}
