//! Small helpers for reading files referenced by a definition.

use std::path::{Path, PathBuf};

use crate::error::FileError;

const BOM: char = '\u{feff}';

/// Read a UTF-8 text file, dropping a leading byte-order mark.
pub fn read_text(path: &Path) -> Result<String, FileError> {
    let bytes = std::fs::read(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| FileError::Encoding {
        path: path.to_path_buf(),
    })?;
    Ok(match text.strip_prefix(BOM) {
        Some(rest) => rest.to_owned(),
        None => text,
    })
}

/// Resolve `value` against `base` unless it is already absolute. Pure, no I/O.
pub fn resolve(base: &Path, value: &str) -> PathBuf {
    let p = Path::new(value);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

/// Final path component as a string (`files/validator.cpp` → `validator.cpp`).
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// File name without its extension (`files/gen.cpp` → `gen`).
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn strips_leading_bom() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("legend.md");
        std::fs::write(&path, "\u{feff}Given two numbers.").unwrap();
        assert_eq!(read_text(&path).unwrap(), "Given two numbers.");
    }

    #[test]
    fn keeps_text_without_bom_verbatim() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("input.md");
        std::fs::write(&path, "line1\r\nline2\n").unwrap();
        assert_eq!(read_text(&path).unwrap(), "line1\r\nline2\n");
    }

    #[test]
    fn missing_file_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.md");
        let err = read_text(&path).unwrap_err();
        assert!(err.to_string().contains("nope.md"));
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let base = Path::new("/work/problem");
        assert_eq!(resolve(base, "a/b.cpp"), PathBuf::from("/work/problem/a/b.cpp"));
        assert_eq!(resolve(base, "/abs/b.cpp"), PathBuf::from("/abs/b.cpp"));
    }

    #[test]
    fn names_and_stems() {
        let p = Path::new("files/validator/validator.cpp");
        assert_eq!(file_name(p), "validator.cpp");
        assert_eq!(file_stem(p), "validator");
    }
}
