//! # Tracking Files
//!
//! Every cache directory of an enhanced local repository holds one small
//! side-file (by default `_remote.repositories`) recording where the files of
//! that directory came from. The file uses a `key=value` properties line
//! format, read and written through `rust-ini`'s general section.
//!
//! ## Concurrency
//!
//! Tracking files are shared by every resolver process using the repository,
//! so each access goes through two locking tiers:
//!
//! 1. A mutex keyed by the canonical path of the side-file serializes threads
//!    of this process before they reach for the OS lock.
//! 2. An OS advisory lock (`fs2`) on the side-file itself, shared for reads
//!    and exclusive for updates and deletes. Some platforms report a false
//!    deadlock when the same file is locked from several threads; that error
//!    is retried a bounded number of times before it is surfaced.
//!
//! Updates rewrite the file in place (seek, write, truncate) while holding the
//! exclusive lock, so readers never see a partially merged record.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use fs2::FileExt;
use ini::{EscapePolicy, Ini, ParseOption, WriteOption};
use log::{debug, trace};

use crate::error::{Error, Result};

/// Parsed content of a tracking file.
pub type Properties = BTreeMap<String, String>;

/// Requested changes: `Some` sets a key, `None` removes it.
pub type Changes = BTreeMap<String, Option<String>>;

/// Leading comment of every tracking file written by this crate.
pub const HEADER: &str = "#NOTE: This is an internal tracking file of the local repository, \
its format can be changed without prior notice.\n";

/// Attempts made to take an OS lock that keeps failing with a false deadlock.
pub const LOCK_ATTEMPTS: u32 = 5;

/// Pause between two lock attempts.
pub const LOCK_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Crash-safe, lock-protected access to tracking files
pub trait TrackingStore: Send + Sync + fmt::Debug {
    /// Reads a tracking file; `None` when the file does not exist.
    fn read(&self, path: &Path) -> Result<Option<Properties>>;

    /// Applies `changes` to a tracking file, creating it when missing, and
    /// returns the resulting content.
    fn update(&self, path: &Path, changes: &Changes) -> Result<Properties>;

    /// Deletes a tracking file; returns whether it existed.
    fn delete(&self, path: &Path) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockMode {
    Shared,
    Exclusive,
}

/// Releases the OS lock when dropped.
struct LockedFile {
    file: File,
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// File system backed [`TrackingStore`]
#[derive(Debug, Default)]
pub struct FileTrackingStore {
    path_locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FileTrackingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the in-process mutex guarding `path`.
    fn path_lock(&self, path: &Path) -> Result<Arc<Mutex<()>>> {
        let key = canonical_key(path);
        let mut locks = self.path_locks.lock().map_err(|_| Error::LockPoisoned {
            context: "tracking path locks".to_string(),
        })?;
        // Drop entries nobody holds any more.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Ok(Arc::clone(locks.entry(key).or_default()))
    }

    /// Number of paths currently guarded by an in-process mutex.
    pub fn guarded_paths(&self) -> usize {
        self.path_locks
            .lock()
            .map(|locks| locks.values().filter(|l| Arc::strong_count(l) > 1).count())
            .unwrap_or(0)
    }
}

impl TrackingStore for FileTrackingStore {
    fn read(&self, path: &Path) -> Result<Option<Properties>> {
        let lock = self.path_lock(path)?;
        let _guard = lock.lock().map_err(|_| Error::LockPoisoned {
            context: format!("tracking file {}", path.display()),
        })?;

        let Some(mut locked) = open_locked(path, OpenOptions::new().read(true), LockMode::Shared)?
        else {
            return Ok(None);
        };
        let properties = load(&mut locked.file, path)?;
        trace!("Read {} entries from {}", properties.len(), path.display());
        Ok(Some(properties))
    }

    fn update(&self, path: &Path, changes: &Changes) -> Result<Properties> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| tracking_io(path, e))?;
        }

        let lock = self.path_lock(path)?;
        let _guard = lock.lock().map_err(|_| Error::LockPoisoned {
            context: format!("tracking file {}", path.display()),
        })?;

        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(false);
        let mut locked = open_locked(path, &options, LockMode::Exclusive)?
            .ok_or_else(|| tracking_io(path, io::ErrorKind::NotFound.into()))?;

        let mut properties = load(&mut locked.file, path)?;
        for (key, value) in changes {
            match value {
                Some(value) => {
                    properties.insert(key.clone(), value.clone());
                }
                None => {
                    properties.remove(key);
                }
            }
        }

        let content = render(&properties, path)?;
        store(&mut locked.file, &content).map_err(|e| tracking_io(path, e))?;
        debug!(
            "Updated {} with {} change(s), {} entries now",
            path.display(),
            changes.len(),
            properties.len()
        );
        Ok(properties)
    }

    fn delete(&self, path: &Path) -> Result<bool> {
        let lock = self.path_lock(path)?;
        let _guard = lock.lock().map_err(|_| Error::LockPoisoned {
            context: format!("tracking file {}", path.display()),
        })?;

        let Some(_locked) =
            open_locked(path, OpenOptions::new().read(true).write(true), LockMode::Exclusive)?
        else {
            return Ok(false);
        };
        match fs::remove_file(path) {
            Ok(()) => {
                debug!("Deleted {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(tracking_io(path, e)),
        }
    }
}

/// Canonical form of a possibly missing file path, used as mutex key.
fn canonical_key(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => match parent.canonicalize() {
            Ok(dir) => dir.join(name),
            Err(_) => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
        },
        _ => path.to_path_buf(),
    }
}

fn tracking_io(path: &Path, source: io::Error) -> Error {
    Error::TrackingIo {
        path: path.to_path_buf(),
        source,
    }
}

/// True for the OS error some platforms raise when one file is locked from
/// several threads at once. The set of such errors is platform dependent.
fn is_false_deadlock(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::Deadlock
}

/// Opens and locks `path`. When the file was deleted or replaced while this
/// call waited for the lock, the stale handle is dropped and the current file
/// is opened instead. `None` when there is no file to open.
fn open_locked(path: &Path, options: &OpenOptions, mode: LockMode) -> Result<Option<LockedFile>> {
    loop {
        let file = match options.open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(tracking_io(path, e)),
        };
        let locked = lock_with_retry(file, path, mode)?;
        if is_current(&locked.file, path).map_err(|e| tracking_io(path, e))? {
            return Ok(Some(locked));
        }
        debug!("{} changed while waiting for its lock, reopening", path.display());
    }
}

/// True when `path` still names the file behind `file`.
#[cfg(unix)]
fn is_current(file: &File, path: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let locked = file.metadata()?;
    match fs::metadata(path) {
        Ok(current) => Ok(locked.dev() == current.dev() && locked.ino() == current.ino()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Open files cannot be unlinked here, so the handle always names the file.
#[cfg(not(unix))]
fn is_current(_file: &File, _path: &Path) -> io::Result<bool> {
    Ok(true)
}

fn lock_with_retry(file: File, path: &Path, mode: LockMode) -> Result<LockedFile> {
    retry_lock(path, || match mode {
        LockMode::Shared => FileExt::lock_shared(&file),
        LockMode::Exclusive => FileExt::lock_exclusive(&file),
    })?;
    Ok(LockedFile { file })
}

/// Runs `lock` until it succeeds, retrying false deadlocks up to
/// [`LOCK_ATTEMPTS`] times.
fn retry_lock(path: &Path, mut lock: impl FnMut() -> io::Result<()>) -> Result<()> {
    let mut attempt = 1;
    loop {
        match lock() {
            Ok(()) => return Ok(()),
            Err(e) if is_false_deadlock(&e) => {
                if attempt >= LOCK_ATTEMPTS {
                    return Err(Error::LockContention {
                        path: path.to_path_buf(),
                        attempts: attempt,
                        source: e,
                    });
                }
                debug!(
                    "Lock attempt {}/{} on {} reported a deadlock, retrying",
                    attempt,
                    LOCK_ATTEMPTS,
                    path.display()
                );
                thread::sleep(LOCK_RETRY_DELAY);
                attempt += 1;
            }
            Err(e) => return Err(tracking_io(path, e)),
        }
    }
}

fn load(file: &mut File, path: &Path) -> Result<Properties> {
    let mut content = String::new();
    file.seek(SeekFrom::Start(0))
        .and_then(|_| file.read_to_string(&mut content))
        .map_err(|e| tracking_io(path, e))?;
    parse(&content, path)
}

/// Parses tracking file content; an empty file has no entries.
pub fn parse(content: &str, path: &Path) -> Result<Properties> {
    if content.trim().is_empty() {
        return Ok(Properties::new());
    }
    let options = ParseOption {
        enabled_quote: false,
        enabled_escape: true,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_str_opt(content, options).map_err(|e| Error::TrackingFormat {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(ini
        .section(None::<String>)
        .map(|section| {
            section
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .unwrap_or_default())
}

/// Renders tracking file content, header comment first.
///
/// Separators, comment markers and backslashes inside keys and values are
/// escaped (`\:`, `\=`, `\#`, `\\`), so every entry reads back unchanged.
pub fn render(properties: &Properties, path: &Path) -> Result<Vec<u8>> {
    let mut ini = Ini::new();
    for (key, value) in properties {
        ini.with_general_section().set(key.as_str(), value.as_str());
    }
    let mut content = HEADER.as_bytes().to_vec();
    let options = WriteOption {
        escape_policy: EscapePolicy::Reserved,
        ..WriteOption::default()
    };
    ini.write_to_opt(&mut content, options)
        .map_err(|e| tracking_io(path, e))?;
    Ok(content)
}

/// Rewrites the whole file in place without leaving a stale tail behind.
fn store(file: &mut File, content: &[u8]) -> io::Result<()> {
    file.seek(SeekFrom::Start(0))?;
    file.write_all(content)?;
    file.set_len(content.len() as u64)?;
    file.flush()
}
