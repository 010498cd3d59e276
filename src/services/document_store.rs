use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use log::{debug, info, warn, error};
use crate::errors::WikiError;
use crate::types::Page;

const PAGE_EXTENSION: &str = "txt";

/// Service for reading and writing page files
#[derive(Debug, Clone)]
pub struct DocumentStore {
    pages_dir: PathBuf,
}

impl DocumentStore {
    /// Create a new document store rooted at `pages_dir`
    pub fn new(pages_dir: PathBuf) -> Self {
        debug!("Creating DocumentStore with pages directory: {:?}", pages_dir);
        Self { pages_dir }
    }

    pub fn pages_dir(&self) -> &Path {
        &self.pages_dir
    }

    /// File that holds the page called `title`.
    ///
    /// `title` must already have passed the router; it is joined verbatim.
    pub fn path_for(&self, title: &str) -> PathBuf {
        self.pages_dir.join(format!("{}.{}", title, PAGE_EXTENSION))
    }

    /// Write `body` as the full content of `title`, replacing what was there
    pub fn save(&self, title: &str, body: &[u8]) -> Result<(), WikiError> {
        let path = self.path_for(title);
        debug!("Saving page '{}' to {:?}", title, path);

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&path).map_err(|e| {
            error!("Failed to open {:?} for writing: {}", path, e);
            WikiError::Io(e)
        })?;
        file.write_all(body).map_err(|e| {
            error!("Failed to write {:?}: {}", path, e);
            WikiError::Io(e)
        })?;

        info!("Saved page '{}', {} bytes", title, body.len());
        Ok(())
    }

    /// Read the page called `title`.
    ///
    /// A missing file is `WikiError::NotFound`; callers treat it as a page
    /// that has not been written yet.
    pub fn load(&self, title: &str) -> Result<Page, WikiError> {
        let path = self.path_for(title);
        debug!("Loading page '{}' from {:?}", title, path);

        let body = match fs::read(&path) {
            Ok(body) => body,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Page '{}' does not exist yet", title);
                return Err(WikiError::NotFound);
            }
            Err(e) => {
                error!("Failed to read {:?}: {}", path, e);
                return Err(WikiError::Io(e));
            }
        };
        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();

        info!("Loaded page '{}', {} bytes", title, body.len());
        Ok(Page { title: title.to_string(), body, modified })
    }

    /// Names of every stored page, in directory order.
    ///
    /// Each entry name is cut at its first `.`, so a file named `a.b.txt`
    /// lists as `a`.
    pub fn list(&self) -> Result<Vec<String>, WikiError> {
        debug!("Listing pages in {:?}", self.pages_dir);

        let entries = fs::read_dir(&self.pages_dir).map_err(|e| {
            error!("Failed to read pages directory {:?}: {}", self.pages_dir, e);
            WikiError::Io(e)
        })?;

        let mut titles = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                warn!("Failed to read directory entry: {}", e);
                WikiError::Io(e)
            })?;
            let name = entry.file_name().to_string_lossy().to_string();
            let title = name.split('.').next().unwrap_or_default().to_string();
            titles.push(title);
        }

        info!("Listed {} pages", titles.len());
        Ok(titles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, DocumentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[test]
    fn save_then_load_returns_same_body() {
        let (_dir, store) = store();
        store.save("Home", b"hello\nworld").unwrap();
        let page = store.load("Home").unwrap();
        assert_eq!(page.title, "Home");
        assert_eq!(page.body, b"hello\nworld");
        assert!(page.modified.is_some());
    }

    #[test]
    fn empty_body_round_trips() {
        let (_dir, store) = store();
        store.save("Blank", b"").unwrap();
        assert!(store.load("Blank").unwrap().body.is_empty());
    }

    #[test]
    fn non_utf8_body_round_trips() {
        let (_dir, store) = store();
        let body = [0xff, 0x00, 0xfe, b'a'];
        store.save("Bin", &body).unwrap();
        assert_eq!(store.load("Bin").unwrap().body, body);
    }

    #[test]
    fn save_overwrites_instead_of_appending() {
        let (_dir, store) = store();
        store.save("Log", b"a much longer first version").unwrap();
        store.save("Log", b"short").unwrap();
        assert_eq!(store.load("Log").unwrap().body, b"short");
    }

    #[test]
    fn repeated_save_leaves_single_file() {
        let (dir, store) = store();
        store.save("Same", b"body").unwrap();
        store.save("Same", b"body").unwrap();
        assert_eq!(fs::read(dir.path().join("Same.txt")).unwrap(), b"body");
        assert_eq!(store.list().unwrap(), vec!["Same".to_string()]);
    }

    #[test]
    fn load_missing_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(store.load("Nope"), Err(WikiError::NotFound)));
    }

    #[test]
    fn list_strips_extension_at_first_dot() {
        let (dir, store) = store();
        store.save("Alpha", b"a").unwrap();
        fs::write(dir.path().join("odd.name.txt"), b"x").unwrap();
        let mut titles = store.list().unwrap();
        titles.sort();
        assert_eq!(titles, vec!["Alpha".to_string(), "odd".to_string()]);
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("absent"));
        assert!(matches!(store.save("X", b"x"), Err(WikiError::Io(_))));
        assert!(matches!(store.list(), Err(WikiError::Io(_))));
    }

    #[cfg(unix)]
    #[test]
    fn new_files_are_owner_read_write_only() {
        use std::os::unix::fs::PermissionsExt;
        let (_dir, store) = store();
        store.save("Secret", b"s").unwrap();
        let mode = fs::metadata(store.path_for("Secret")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
