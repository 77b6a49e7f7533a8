//! Whole-file reads and atomic whole-file writes

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};

/// Read a text file line by line, mapping a missing file to [`Error::MissingFile`].
///
/// A line that is not valid UTF-8 is reported and comes back blank, so the
/// other lines keep their line numbers and still load.
pub fn read_text(path: &Path, diag: &mut Diagnostics) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::MissingFile(path.to_path_buf()),
        _ => Error::Io(e),
    })?;

    let mut text = String::with_capacity(bytes.len());
    for (line_idx, line) in bytes.split(|&b| b == b'\n').enumerate() {
        if line_idx > 0 {
            text.push('\n');
        }
        match std::str::from_utf8(line) {
            Ok(line) => text.push_str(line),
            Err(e) => diag.error(format!(
                "Line {} of {} is not valid UTF-8 and will be skipped: {}",
                line_idx + 1,
                path.display(),
                e
            )),
        }
    }
    Ok(text)
}

/// Replace `path` with `contents` by writing a temporary file next to it and
/// renaming it into place. Parent directories are created as needed.
pub fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(contents.as_bytes())?;
    temp_file.flush()?;
    temp_file.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("users.txt");

        write_atomically(&path, "first\n").unwrap();
        write_atomically(&path, "second\n").unwrap();

        assert_eq!(read_text(&path, &mut Diagnostics::new()).unwrap(), "second\n");
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.txt");
        assert!(matches!(
            read_text(&path, &mut Diagnostics::new()),
            Err(Error::MissingFile(p)) if p == path
        ));
    }

    #[test]
    fn test_invalid_utf8_line_is_blanked() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.txt");
        fs::write(&path, b"alice\nb\xffb\ncarol\n").unwrap();

        let mut diag = Diagnostics::new();
        assert_eq!(read_text(&path, &mut diag).unwrap(), "alice\n\ncarol\n");
        assert_eq!(diag.errors().count(), 1);
        assert!(diag.entries()[0].message.contains("Line 2"));
    }
}
