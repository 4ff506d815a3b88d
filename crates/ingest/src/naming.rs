//! Deterministic naming of stored files.
//!
//! A stored image lives at `<volume>/<stamp>_<pod><ext>`:
//!
//! - `stamp` is a nanosecond Unix timestamp, strictly increasing per process
//! - `pod` is the process identity, separating writers that share the volume
//! - `ext` is the uploaded filename's extension, verbatim
//!
//! The stamp doubles as the correlation token returned to the uploader.
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Extension of the last path element of `filename`, including the dot.
///
/// Case is preserved and a missing extension yields `""`. Only the text after
/// the final `/` is considered, so the result can never contain a separator.
///
/// ```rust
/// use ingest::original_extension;
///
/// assert_eq!(original_extension("scan.PNG"), ".PNG");
/// assert_eq!(original_extension("archive.tar.gz"), ".gz");
/// assert_eq!(original_extension("README"), "");
/// assert_eq!(original_extension("dir.d/noext"), "");
/// ```
pub fn original_extension(filename: &str) -> &str {
    let name = filename.rsplit('/').next().unwrap_or(filename);
    match name.rfind('.') {
        Some(idx) => &name[idx..],
        None => "",
    }
}

/// Volume-relative location of a stored upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredFilePath {
    path: PathBuf,
    stamp: i64,
}

impl StoredFilePath {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Nanosecond stamp embedded in the file name.
    pub fn stamp(&self) -> i64 {
        self.stamp
    }

    /// Path as handed to the collaborating services.
    pub fn as_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl fmt::Display for StoredFilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Allocates unique stored paths for one process.
///
/// Wall-clock nanoseconds alone can repeat under load or on coarse clocks, so
/// each stamp is `max(now, previous + 1)`. Stamps stay close to real time and
/// never repeat within the process; the pod identity separates processes.
#[derive(Debug)]
pub struct PathAllocator {
    root: PathBuf,
    pod_name: String,
    last_stamp: AtomicI64,
}

impl PathAllocator {
    pub fn new(root: impl Into<PathBuf>, pod_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            pod_name: pod_name.into(),
            last_stamp: AtomicI64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pod_name(&self) -> &str {
        &self.pod_name
    }

    /// Reserve the next path for a file whose original name is `filename`.
    pub fn allocate(&self, filename: &str) -> StoredFilePath {
        let stamp = self.next_stamp();
        let name = format!("{stamp}_{}{}", self.pod_name, original_extension(filename));
        StoredFilePath {
            path: self.root.join(name),
            stamp,
        }
    }

    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
        let mut prev = self.last_stamp.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev.saturating_add(1));
            match self.last_stamp.compare_exchange_weak(
                prev,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}
