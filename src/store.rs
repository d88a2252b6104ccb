//! Index of generated roadmap pages kept next to the HTML files.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::Error;

const INDEX_FILE: &str = "roadmaps.json";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub name: String,
    pub description: String,
    pub file_path: PathBuf,
}

pub struct RoadmapStore {
    dir: PathBuf,
}

impl RoadmapStore {
    /// Opens the store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<RoadmapStore, Error> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    /// Saved roadmaps, most recent first.
    pub fn list(&self) -> Result<Vec<Roadmap>, Error> {
        let text = match fs::read_to_string(self.index_path()) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&text).map_err(Error::CorruptIndexError)
    }

    /// Puts `roadmap` first, replacing any entry with the same name.
    pub fn add(&self, roadmap: Roadmap) -> Result<(), Error> {
        let mut roadmaps = self.list()?;
        roadmaps.retain(|r| r.name != roadmap.name);
        roadmaps.insert(0, roadmap);

        self.save(&roadmaps)
    }

    /// Writes `html` to `<name>.html` (spaces become underscores) and records it.
    ///
    /// Names that would place the page outside the store directory are rejected.
    pub fn save_html(&self, name: &str, description: &str, html: &str) -> Result<Roadmap, Error> {
        let file_path = self.dir.join(page_file_name(name)?);
        fs::write(&file_path, html)?;
        debug!(path = %file_path.display(), bytes = html.len(), "saved roadmap page");

        let roadmap = Roadmap {
            name: name.to_string(),
            description: description.to_string(),
            file_path,
        };
        self.add(roadmap.clone())?;

        Ok(roadmap)
    }

    /// Removes the page and every index entry pointing at it.
    pub fn delete(&self, roadmap: &Roadmap) -> Result<(), Error> {
        if let Err(e) = fs::remove_file(&roadmap.file_path) {
            warn!(path = %roadmap.file_path.display(), error = %e, "could not remove roadmap page");
        }

        let mut roadmaps = self.list()?;
        roadmaps.retain(|r| r.file_path != roadmap.file_path);

        self.save(&roadmaps)
    }

    fn save(&self, roadmaps: &[Roadmap]) -> Result<(), Error> {
        let text = serde_json::to_string_pretty(roadmaps).map_err(Error::SerializationError)?;

        // Replace the index atomically so a crash never leaves it half written.
        let mut file = tempfile::NamedTempFile::new_in(&self.dir)?;
        file.write_all(text.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(self.index_path()).map_err(|e| e.error)?;

        Ok(())
    }
}

fn page_file_name(name: &str) -> Result<String, Error> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || name.contains(['/', '\\'])
    {
        return Err(Error::BadConfigurationError(format!(
            "Invalid roadmap name {name:?}"
        )));
    }

    Ok(format!("{}.html", name.replace(' ', "_")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roadmap(name: &str, path: &str) -> Roadmap {
        Roadmap {
            name: name.into(),
            description: format!("{name} description"),
            file_path: path.into(),
        }
    }

    #[test]
    fn empty_until_something_is_added() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let store = RoadmapStore::open(dir.path())?;

        assert!(store.list()?.is_empty());
        Ok(())
    }

    #[test]
    fn add_puts_newest_first_and_replaces_same_name() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let store = RoadmapStore::open(dir.path())?;

        store.add(roadmap("Rust", "/a.html"))?;
        store.add(roadmap("Go", "/b.html"))?;
        store.add(roadmap("Rust", "/c.html"))?;

        let names: Vec<_> = store
            .list()?
            .into_iter()
            .map(|r| (r.name, r.file_path))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Rust".to_string(), PathBuf::from("/c.html")),
                ("Go".to_string(), PathBuf::from("/b.html")),
            ]
        );
        Ok(())
    }

    #[test]
    fn save_html_writes_page_and_index() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let store = RoadmapStore::open(dir.path())?;

        let saved = store.save_html("Learn Rust", "from scratch", "<html></html>")?;

        assert_eq!(saved.file_path, dir.path().join("Learn_Rust.html"));
        assert_eq!(fs::read_to_string(&saved.file_path)?, "<html></html>");
        assert_eq!(store.list()?, vec![saved]);

        let index = fs::read_to_string(dir.path().join(INDEX_FILE))?;
        assert!(index.contains("\"filePath\""));
        Ok(())
    }

    #[test]
    fn delete_removes_page_and_entry() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let store = RoadmapStore::open(dir.path())?;
        let kept = store.save_html("Go", "", "<p>go</p>")?;
        let gone = store.save_html("Rust", "", "<p>rust</p>")?;

        store.delete(&gone)?;

        assert!(!gone.file_path.exists());
        assert_eq!(store.list()?, vec![kept]);
        Ok(())
    }

    #[test]
    fn delete_tolerates_missing_page() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let store = RoadmapStore::open(dir.path())?;
        let missing = roadmap("Ghost", "/nonexistent/ghost.html");
        store.add(missing.clone())?;

        store.delete(&missing)?;

        assert!(store.list()?.is_empty());
        Ok(())
    }

    #[test]
    fn save_html_rejects_names_leaving_the_directory() -> Result<(), Error> {
        let root = tempfile::tempdir()?;
        let store = RoadmapStore::open(root.path().join("store"))?;

        for name in ["../escaped", "a/b", "a\\b", "..", ".", "  "] {
            let result = store.save_html(name, "", "<p>x</p>");
            assert!(
                matches!(result, Err(Error::BadConfigurationError(_))),
                "{name:?} was accepted"
            );
        }

        assert!(!root.path().join("escaped.html").exists());
        assert!(store.list()?.is_empty());
        Ok(())
    }

    #[test]
    fn index_is_replaced_without_leftovers() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let store = RoadmapStore::open(dir.path())?;

        store.save_html("Rust", "", "<p>rust</p>")?;
        store.save_html("Go", "", "<p>go</p>")?;

        let mut entries: Vec<_> = fs::read_dir(dir.path())?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<Result<_, _>>()?;
        entries.sort();
        assert_eq!(entries, vec!["Go.html", "Rust.html", INDEX_FILE]);
        assert_eq!(store.list()?.len(), 2);
        Ok(())
    }

    #[test]
    fn corrupt_index_is_reported() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(INDEX_FILE), "{not json")?;
        let store = RoadmapStore::open(dir.path())?;

        let err = store.list().unwrap_err();

        assert!(matches!(err, Error::CorruptIndexError(_)));
        assert_eq!(err.kind(), crate::ErrorKind::Storage);
        Ok(())
    }
}
