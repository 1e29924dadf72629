//! Input file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;

/// Extensions accepted as input, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "flac", "ogg", "aiff", "aif", "mp3"];

/// Reports whether `path` has a supported audio extension.
pub fn is_supported_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Recursively collects supported audio files under `root`, sorted by path.
///
/// Failing to read `root` itself is an error. Unreadable subdirectories are
/// logged and skipped. Directory symlinks are not followed.
pub fn find_audio_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if dir != root => {
                warn!(dir = %dir.display(), "skipping unreadable directory: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(dir = %dir.display(), "skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                pending.push(path);
            } else if is_supported_audio_file(&path) && path.is_file() {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
