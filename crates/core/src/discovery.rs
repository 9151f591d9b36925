use std::path::{Path, PathBuf};

use anyhow::Context;
use walkdir::WalkDir;

/// Policy files to analyze for `input`.
///
/// A file is returned as given, whatever its extension. A directory yields
/// its `*.json` files, descending into subdirectories only when
/// `recursive` is set. Results are sorted by path.
pub fn discover_policy_files(input: &Path, recursive: bool) -> anyhow::Result<Vec<PathBuf>> {
    let meta = std::fs::metadata(input)
        .with_context(|| format!("no such file or directory: {}", input.display()))?;
    if meta.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(input).max_depth(max_depth).follow_links(false) {
        let entry = entry.with_context(|| format!("walk {}", input.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let is_json = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            files.push(entry.into_path());
        }
    }

    files.sort();
    log::debug!("found {} file(s) under {}", files.len(), input.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_is_an_error() {
        let err = discover_policy_files(Path::new("does-not-exist"), false).unwrap_err();
        assert!(format!("{:#}", err).contains("does-not-exist"));
    }
}
