//! Output file naming.

use std::collections::HashSet;
use std::path::Path;

/// Returns `{base}_ch{channel}_chunk{index}{suffix}.wav`.
pub fn output_file_name(base: &str, channel: usize, index: usize, suffix: &str) -> String {
    format!("{}_ch{}_chunk{}{}.wav", base, channel, index, suffix)
}

/// Returns the file stem of `path`, used as the output base name.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string())
}

/// Hands out base names that are unique within one run.
///
/// The first file with a given stem keeps it; later ones get `_1`, `_2`, ...
/// appended so their outputs do not overwrite each other.
#[derive(Debug, Default)]
pub struct BaseNames {
    used: HashSet<String>,
}

impl BaseNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, path: &Path) -> String {
        let stem = base_name(path);
        if self.used.insert(stem.clone()) {
            return stem;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}_{}", stem, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
