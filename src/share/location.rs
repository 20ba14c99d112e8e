use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Context, Result};

/// Ambient address the portfolio state lives in.
///
/// The web original kept state in the browser location; here the current
/// address is whatever the backing store holds. `replace` updates it in
/// place — there is no history to grow.
pub trait Location {
    /// Current path-plus-query string, e.g. `/portfolio-treemap/<token>`.
    /// `None` when no address has ever been written.
    fn current(&self) -> Option<String>;

    /// Replace the current address in place.
    fn replace(&mut self, uri: &str) -> Result<()>;
}

/// Location persisted as a single line in a file, so the share-link state
/// survives between CLI invocations.
pub struct FileLocation {
    path: PathBuf,
}

impl FileLocation {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Location for FileLocation {
    fn current(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn replace(&mut self, uri: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory {}", parent.display())
                })?;
            }
        }
        fs::write(&self.path, format!("{uri}\n"))
            .with_context(|| format!("Failed to write location file {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory location for tests and headless embedding.
#[derive(Debug, Default)]
pub struct MemoryLocation {
    uri: Option<String>,
}

impl MemoryLocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uri<S: Into<String>>(uri: S) -> Self {
        Self {
            uri: Some(uri.into()),
        }
    }
}

impl Location for MemoryLocation {
    fn current(&self) -> Option<String> {
        self.uri.clone()
    }

    fn replace(&mut self, uri: &str) -> Result<()> {
        self.uri = Some(uri.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_location(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("portfolio-cli-{}-{}", name, std::process::id()))
    }

    #[test]
    fn file_location_round_trips() {
        let path = temp_location("roundtrip");
        let mut location = FileLocation::new(&path);

        location
            .replace("/portfolio-treemap/abc123")
            .expect("replace");
        assert_eq!(
            location.current(),
            Some("/portfolio-treemap/abc123".to_string())
        );

        location.replace("/portfolio-treemap/").expect("replace");
        assert_eq!(location.current(), Some("/portfolio-treemap/".to_string()));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_reads_as_no_address() {
        let location = FileLocation::new(temp_location("missing-never-written"));
        assert_eq!(location.current(), None);
    }

    #[test]
    fn memory_location_round_trips() {
        let mut location = MemoryLocation::new();
        assert_eq!(location.current(), None);

        location.replace("/portfolio-treemap/xyz").expect("replace");
        assert_eq!(
            location.current(),
            Some("/portfolio-treemap/xyz".to_string())
        );
    }
}
