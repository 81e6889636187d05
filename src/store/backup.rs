use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Number of rotating backups kept next to the backing file.
pub const MAX_BACKUPS: u8 = 5;

/// A backup file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    /// 1 is the most recent, [`MAX_BACKUPS`] the oldest.
    pub slot: u8,
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
}

/// `<file>.backup.<slot>` with a zero-padded three digit slot.
pub fn backup_path(file: &Path, slot: u8) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(format!(".backup.{slot:03}"));
    PathBuf::from(name)
}

/// Shifts existing backups one slot older and copies `file` into slot 1.
///
/// The oldest slot is discarded. Does nothing if `file` does not exist yet.
pub(crate) fn rotate(file: &Path) -> io::Result<()> {
    if !file.exists() {
        return Ok(());
    }

    let oldest = backup_path(file, MAX_BACKUPS);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }

    for slot in (1..MAX_BACKUPS).rev() {
        let from = backup_path(file, slot);
        if from.exists() {
            fs::rename(&from, backup_path(file, slot + 1))?;
        }
    }

    let newest = backup_path(file, 1);
    fs::copy(file, &newest)?;
    info!("store: created backup {}", newest.display());
    Ok(())
}

/// Existing backups of `file`, most recent first.
pub(crate) fn list(file: &Path) -> Vec<BackupInfo> {
    (1..=MAX_BACKUPS)
        .filter_map(|slot| {
            let path = backup_path(file, slot);
            let meta = fs::metadata(&path).ok()?;
            Some(BackupInfo {
                slot,
                modified: meta.modified().ok(),
                path,
            })
        })
        .collect()
}
