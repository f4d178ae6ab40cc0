use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::data::{FileRecord, Folder, Panel};
use crate::error::{Error, Result};

/// The Store manages the SQLite document catalog.
///
/// It owns folder and file identity and lifecycle; the UI is a pure
/// read/render/request-mutation client and reloads after every structural
/// change instead of keeping an authoritative copy.
pub struct Store {
    conn: Connection,
    db_path: PathBuf,
}

impl Store {
    /// Open (or create) the catalog at an explicit path.
    ///
    /// Background import tasks use this to get their own connection, since
    /// `rusqlite::Connection` cannot be shared across threads.
    pub fn open(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        // Background import jobs run on their own connections; a writer that
        // hits a locked database waits instead of erroring out.
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        log::info!("📁 Catalog opened at: {}", db_path.display());

        let store = Store { conn, db_path };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory catalog, used by tests.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let store = Store {
            conn: Connection::open_in_memory()?,
            db_path: PathBuf::from(":memory:"),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Get the default path where the database is stored
    pub fn default_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        path.push("docudesk");
        path.push("docudesk.db");
        path
    }

    /// Initialize the database schema.
    /// Creates all necessary tables and indexes if they don't exist.
    fn init_schema(&self) -> Result<()> {
        // Cascading deletes (folder subtree + contained files) rely on this.
        self.conn.execute_batch("PRAGMA foreign_keys = ON")?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS folders (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                parent_id   INTEGER,
                panel       TEXT NOT NULL,
                FOREIGN KEY(parent_id) REFERENCES folders(id) ON DELETE CASCADE
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS files (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                folder_id   INTEGER NOT NULL,
                filename    TEXT NOT NULL,
                filepath    TEXT NOT NULL,
                file_size   INTEGER NOT NULL DEFAULT 0,
                imported_at INTEGER NOT NULL,
                FOREIGN KEY(folder_id) REFERENCES folders(id) ON DELETE CASCADE
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_folders_parent
             ON folders(parent_id)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_files_folder
             ON files(folder_id)",
            [],
        )?;

        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    fn folder_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Folder> {
        Ok(Folder {
            id: row.get(0)?,
            name: row.get(1)?,
            parent_id: row.get(2)?,
            panel: Panel::from_key(&row.get::<_, String>(3)?),
        })
    }

    fn file_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileRecord> {
        Ok(FileRecord {
            id: row.get(0)?,
            folder_id: row.get(1)?,
            filename: row.get(2)?,
            filepath: row.get(3)?,
            file_size: row.get::<_, i64>(4)?.max(0) as u64,
        })
    }

    /// Direct children of `parent` (panel-roots when `parent` is None),
    /// in insertion order. `panel` narrows root listings to one namespace.
    pub fn get_subfolders(&self, parent: Option<i64>, panel: Option<Panel>) -> Result<Vec<Folder>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, parent_id, panel FROM folders
             WHERE (parent_id IS ?1)
               AND (?2 IS NULL OR panel = ?2)
             ORDER BY id",
        )?;

        let rows = stmt.query_map(
            params![parent, panel.map(|p| p.key())],
            Self::folder_from_row,
        )?;

        let mut folders = Vec::new();
        for folder in rows {
            folders.push(folder?);
        }
        Ok(folders)
    }

    /// Every folder, optionally narrowed to one panel, in insertion order.
    pub fn get_all_folders(&self, panel: Option<Panel>) -> Result<Vec<Folder>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, parent_id, panel FROM folders
             WHERE ?1 IS NULL OR panel = ?1
             ORDER BY id",
        )?;

        let rows = stmt.query_map(params![panel.map(|p| p.key())], Self::folder_from_row)?;

        let mut folders = Vec::new();
        for folder in rows {
            folders.push(folder?);
        }
        Ok(folders)
    }

    pub fn get_folder(&self, id: i64) -> Result<Option<Folder>> {
        let folder = self
            .conn
            .query_row(
                "SELECT id, name, parent_id, panel FROM folders WHERE id = ?1",
                [id],
                Self::folder_from_row,
            )
            .optional()?;
        Ok(folder)
    }

    /// Create a folder and return its new ID.
    pub fn create_folder(&self, name: &str, parent: Option<i64>, panel: Panel) -> Result<i64> {
        if name.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        self.conn.execute(
            "INSERT INTO folders (name, parent_id, panel) VALUES (?1, ?2, ?3)",
            params![name.trim(), parent, panel.key()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Rename a folder.
    pub fn update_folder(&self, id: i64, new_name: &str) -> Result<()> {
        if new_name.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        let updated = self.conn.execute(
            "UPDATE folders SET name = ?1 WHERE id = ?2",
            params![new_name.trim(), id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound("folder"));
        }
        Ok(())
    }

    /// Delete a folder. Descendant folders and their file records go with it
    /// through the cascading foreign keys.
    pub fn delete_folder(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM folders WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(Error::NotFound("folder"));
        }
        log::info!("🗑️ Deleted folder {} (with descendants)", id);
        Ok(())
    }

    /// Files directly inside a folder, in insertion order.
    pub fn get_files_in_folder(&self, folder_id: i64) -> Result<Vec<FileRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, folder_id, filename, filepath, file_size FROM files
             WHERE folder_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map([folder_id], Self::file_from_row)?;

        let mut files = Vec::new();
        for file in rows {
            files.push(file?);
        }
        Ok(files)
    }

    /// Number of files in a folder; with `recursive` the whole subtree is
    /// counted through a recursive CTE. Display annotation only.
    pub fn count_files_in_folder(&self, folder_id: i64, recursive: bool) -> Result<i64> {
        let count = if recursive {
            self.conn.query_row(
                "WITH RECURSIVE subtree(id) AS (
                     SELECT ?1
                     UNION ALL
                     SELECT f.id FROM folders f JOIN subtree s ON f.parent_id = s.id
                 )
                 SELECT COUNT(*) FROM files WHERE folder_id IN (SELECT id FROM subtree)",
                [folder_id],
                |row| row.get(0),
            )?
        } else {
            self.conn.query_row(
                "SELECT COUNT(*) FROM files WHERE folder_id = ?1",
                [folder_id],
                |row| row.get(0),
            )?
        };
        Ok(count)
    }

    /// Register an imported file and return its new ID.
    pub fn add_file(
        &self,
        folder_id: i64,
        filename: &str,
        filepath: &str,
        file_size: u64,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO files (folder_id, filename, filepath, file_size, imported_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                folder_id,
                filename,
                filepath,
                file_size as i64,
                chrono::Utc::now().timestamp()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_file(&self, id: i64) -> Result<Option<FileRecord>> {
        let file = self
            .conn
            .query_row(
                "SELECT id, folder_id, filename, filepath, file_size FROM files WHERE id = ?1",
                [id],
                Self::file_from_row,
            )
            .optional()?;
        Ok(file)
    }

    pub fn delete_file(&self, id: i64) -> Result<()> {
        let deleted = self.conn.execute("DELETE FROM files WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(Error::NotFound("file"));
        }
        Ok(())
    }

    /// Search files by filename substring and/or extension.
    ///
    /// Empty criteria match everything, so a blank search returns the whole
    /// catalog (the search screen opens that way).
    pub fn search_files(&self, filename: &str, extension: &str) -> Result<Vec<FileRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, folder_id, filename, filepath, file_size FROM files
             WHERE (?1 = '' OR instr(lower(filename), lower(?1)) > 0)
               AND (?2 = '' OR lower(filename) LIKE '%.' || lower(?2))
             ORDER BY id",
        )?;

        let rows = stmt.query_map(params![filename.trim(), extension.trim()], Self::file_from_row)?;

        let mut files = Vec::new();
        for file in rows {
            files.push(file?);
        }
        Ok(files)
    }

    /// Find or lazily create the panel's virtual root container folder and
    /// return its ID. Root-level file imports land there.
    pub fn ensure_virtual_root(&self, panel: Panel) -> Result<i64> {
        let name = panel.virtual_root_name();
        let existing = self
            .conn
            .query_row(
                "SELECT id FROM folders WHERE parent_id IS NULL AND panel = ?1 AND name = ?2",
                params![panel.key(), name],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(id) => Ok(id),
            None => {
                let id = self.create_folder(&name, None, panel)?;
                log::info!("✅ Created virtual root container: {} (ID: {})", name, id);
                Ok(id)
            }
        }
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// Convenience for code that records file sizes at import time.
pub fn size_on_disk(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::open_in_memory().unwrap()
    }

    #[test]
    fn test_create_and_list_root_folders() {
        let store = store();
        let a = store
            .create_folder("Alpha", None, Panel::Certification)
            .unwrap();
        let b = store
            .create_folder("Beta", None, Panel::Certification)
            .unwrap();
        store.create_folder("Other", None, Panel::Autre).unwrap();

        let roots = store
            .get_subfolders(None, Some(Panel::Certification))
            .unwrap();
        assert_eq!(
            roots.iter().map(|f| f.id).collect::<Vec<_>>(),
            vec![a, b],
            "insertion order, panel-scoped"
        );
        assert!(roots.iter().all(|f| f.parent_id.is_none()));
    }

    #[test]
    fn test_empty_name_rejected_before_any_write() {
        let store = store();
        assert!(matches!(
            store.create_folder("   ", None, Panel::Autre),
            Err(Error::EmptyName)
        ));
        assert!(store.get_all_folders(None).unwrap().is_empty());
    }

    #[test]
    fn test_rename_and_not_found() {
        let store = store();
        let id = store.create_folder("Old", None, Panel::Autre).unwrap();
        store.update_folder(id, "New").unwrap();
        assert_eq!(store.get_folder(id).unwrap().unwrap().name, "New");

        assert!(matches!(
            store.update_folder(9999, "X"),
            Err(Error::NotFound("folder"))
        ));
    }

    #[test]
    fn test_delete_folder_cascades_to_subtree_and_files() {
        let store = store();
        let root = store.create_folder("Root", None, Panel::Autre).unwrap();
        let child = store.create_folder("Child", Some(root), Panel::Autre).unwrap();
        let grandchild = store
            .create_folder("Grandchild", Some(child), Panel::Autre)
            .unwrap();
        let file = store
            .add_file(grandchild, "deep.pdf", "/tmp/deep.pdf", 12)
            .unwrap();

        store.delete_folder(root).unwrap();

        assert!(store.get_folder(child).unwrap().is_none());
        assert!(store.get_folder(grandchild).unwrap().is_none());
        assert!(store.get_file(file).unwrap().is_none());
        assert!(matches!(
            store.delete_folder(root),
            Err(Error::NotFound("folder"))
        ));
    }

    #[test]
    fn test_recursive_file_count() {
        let store = store();
        let root = store.create_folder("Root", None, Panel::Entete).unwrap();
        let sub = store.create_folder("Sub", Some(root), Panel::Entete).unwrap();
        store.add_file(root, "a.pdf", "/tmp/a.pdf", 1).unwrap();
        store.add_file(sub, "b.pdf", "/tmp/b.pdf", 1).unwrap();
        store.add_file(sub, "c.docx", "/tmp/c.docx", 1).unwrap();

        assert_eq!(store.count_files_in_folder(root, false).unwrap(), 1);
        assert_eq!(store.count_files_in_folder(root, true).unwrap(), 3);
        assert_eq!(store.count_files_in_folder(sub, true).unwrap(), 2);
    }

    #[test]
    fn test_search_by_name_and_extension() {
        let store = store();
        let folder = store.create_folder("Docs", None, Panel::Autre).unwrap();
        store
            .add_file(folder, "Rapport Annuel.pdf", "/tmp/r.pdf", 1)
            .unwrap();
        store
            .add_file(folder, "budget.xlsx", "/tmp/b.xlsx", 1)
            .unwrap();
        store
            .add_file(folder, "rapport.docx", "/tmp/r.docx", 1)
            .unwrap();

        // Blank criteria return everything.
        assert_eq!(store.search_files("", "").unwrap().len(), 3);

        let by_name = store.search_files("RAPPORT", "").unwrap();
        assert_eq!(by_name.len(), 2);

        let by_both = store.search_files("rapport", "pdf").unwrap();
        assert_eq!(by_both.len(), 1);
        assert_eq!(by_both[0].filename, "Rapport Annuel.pdf");

        assert!(store.search_files("nothing", "").unwrap().is_empty());
    }

    #[test]
    fn test_ensure_virtual_root_is_created_once() {
        let store = store();
        let first = store.ensure_virtual_root(Panel::Certification).unwrap();
        let second = store.ensure_virtual_root(Panel::Certification).unwrap();
        assert_eq!(first, second);

        let roots = store
            .get_subfolders(None, Some(Panel::Certification))
            .unwrap();
        assert_eq!(roots.len(), 1);
        assert!(roots[0].is_virtual_root());
    }
}
