use std::path::{Component, Path, PathBuf};

use tracing::{info, warn};

use crate::error::StorageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed { from: PathBuf, to: PathBuf },
    /// Destination already existed; nothing was touched.
    SkippedConflict { from: PathBuf, to: PathBuf },
    /// No usable name was supplied; nothing was touched.
    SkippedNoName { from: PathBuf },
}

/// Renames files within their own directory, never overwriting.
///
/// The existence check and the rename are two separate filesystem calls, so
/// a file created at the destination in between by another process would be
/// replaced on platforms where `rename` overwrites.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileRenamer;

impl FileRenamer {
    pub fn new() -> Self {
        Self
    }

    pub fn rename(&self, original: &Path, new_name: &str) -> Result<RenameOutcome, StorageError> {
        if !is_plain_file_name(new_name) {
            warn!(new_name, "No usable file name, skipping rename");
            return Ok(RenameOutcome::SkippedNoName {
                from: original.to_path_buf(),
            });
        }

        let directory = original.parent().unwrap_or_else(|| Path::new(""));
        let destination = directory.join(new_name);

        // symlink_metadata so dangling symlinks also count as taken
        if std::fs::symlink_metadata(&destination).is_ok() {
            warn!(
                "{} already exists, skipping rename",
                destination.display()
            );
            return Ok(RenameOutcome::SkippedConflict {
                from: original.to_path_buf(),
                to: destination,
            });
        }

        std::fs::rename(original, &destination).map_err(|e| StorageError::MoveFile {
            from: original.to_path_buf(),
            to: destination.clone(),
            source: e,
        })?;

        info!(
            "Renamed '{}' to '{}'",
            original.display(),
            destination.display()
        );
        Ok(RenameOutcome::Renamed {
            from: original.to_path_buf(),
            to: destination,
        })
    }
}

/// A single normal path component: no separators, not `.` or `..`.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
