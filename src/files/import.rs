//! Batch import flows.
//!
//! Directories are mirrored into the store folder by folder; loose files land
//! in the panel's virtual root container or in an explicitly chosen folder.
//! Imports are file-by-file and never rolled back: a partial failure keeps
//! the successes and surfaces a combined success/error count.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::FileHandler;
use crate::error::{Error, Result};
use crate::state::data::Panel;
use crate::state::store::{size_on_disk, Store};

/// Combined result of a batch import.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOutcome {
    pub imported: usize,
    pub errors: usize,
}

impl ImportOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}

/// Number of allow-listed files below `dir`, used to size progress reports.
pub fn count_files_to_import(handler: &FileHandler, dir: &Path) -> usize {
    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter(|entry| handler.is_allowed_file(&entry.file_name().to_string_lossy()))
        .count()
}

/// Import a whole directory tree under `parent`, recreating the on-disk
/// folder hierarchy as store folders.
///
/// `progress` is invoked after every copied file with (current, total) so the
/// caller can repaint a progress indicator. Returns the number of imported
/// files; individual file failures are logged and skipped. A tree holding
/// nothing on the allow-list fails with [`Error::NoImportableFiles`] without
/// creating a single folder, and empty subtrees of an otherwise valid import
/// are skipped rather than mirrored.
pub fn import_folder_tree(
    store: &Store,
    handler: &FileHandler,
    dir: &Path,
    parent: Option<i64>,
    panel: Panel,
    progress: &mut dyn FnMut(usize, usize),
) -> Result<usize> {
    let total = count_files_to_import(handler, dir);
    if total == 0 {
        // Nothing on the allow-list anywhere below: abort before creating
        // any folder.
        return Err(Error::NoImportableFiles);
    }
    let mut current = 0;
    import_dir(store, handler, dir, parent, panel, progress, total, &mut current)?;
    log::info!("✅ Folder import complete: {} file(s) from {}", current, dir.display());
    Ok(current)
}

#[allow(clippy::too_many_arguments)]
fn import_dir(
    store: &Store,
    handler: &FileHandler,
    dir: &Path,
    parent: Option<i64>,
    panel: Panel,
    progress: &mut dyn FnMut(usize, usize),
    total: usize,
    current: &mut usize,
) -> Result<()> {
    let dir_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "import".to_string());
    let folder_id = store.create_folder(&dir_name, parent, panel)?;

    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            // Subtrees contributing no importable files are not mirrored.
            if count_files_to_import(handler, &path) == 0 {
                continue;
            }
            import_dir(
                store, handler, &path, Some(folder_id), panel, progress, total, current,
            )?;
        } else {
            let filename = match path.file_name() {
                Some(name) => name.to_string_lossy().to_string(),
                None => continue,
            };
            if !handler.is_allowed_file(&filename) {
                continue;
            }
            match handler.save_file(&path, &filename, &dir_name) {
                Ok((final_name, dest)) => {
                    store.add_file(
                        folder_id,
                        &final_name,
                        &dest.to_string_lossy(),
                        size_on_disk(&dest),
                    )?;
                    *current += 1;
                    progress(*current, total);
                }
                Err(err) => {
                    log::warn!("   ❌ {}: {}", filename, err);
                }
            }
        }
    }
    Ok(())
}

/// Import loose files directly at a panel's root.
///
/// The files are attached to the panel's `_root_` virtual container (created
/// lazily on first use) so no user-visible folder appears.
pub fn import_files_to_root(
    store: &Store,
    handler: &FileHandler,
    paths: &[PathBuf],
    panel: Panel,
    progress: &mut dyn FnMut(usize, usize),
) -> Result<ImportOutcome> {
    let root_folder_id = store.ensure_virtual_root(panel)?;
    let mut outcome = ImportOutcome::default();

    for (index, path) in paths.iter().enumerate() {
        let filename = match path.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => {
                outcome.errors += 1;
                continue;
            }
        };

        match handler.save_file_to_root(path, &filename) {
            Ok((final_name, dest)) => {
                store.add_file(
                    root_folder_id,
                    &final_name,
                    &dest.to_string_lossy(),
                    size_on_disk(&dest),
                )?;
                outcome.imported += 1;
            }
            Err(err) => {
                log::warn!("   ❌ {}: {}", filename, err);
                outcome.errors += 1;
            }
        }
        progress(index + 1, paths.len());
    }

    log::info!(
        "📦 Root import: {} imported, {} error(s)",
        outcome.imported,
        outcome.errors
    );
    Ok(outcome)
}

/// Import loose files into an explicitly chosen destination folder.
///
/// Fails up front with `NotFound` when the folder vanished since the tree was
/// rendered (e.g. deleted from another window); the caller reports it and
/// reloads.
pub fn import_files_to_folder(
    store: &Store,
    handler: &FileHandler,
    paths: &[PathBuf],
    folder_id: i64,
    progress: &mut dyn FnMut(usize, usize),
) -> Result<ImportOutcome> {
    let folder = store
        .get_folder(folder_id)?
        .ok_or(Error::NotFound("folder"))?;
    let mut outcome = ImportOutcome::default();

    for (index, path) in paths.iter().enumerate() {
        let filename = match path.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => {
                outcome.errors += 1;
                continue;
            }
        };

        match handler.save_file(path, &filename, &folder.name) {
            Ok((final_name, dest)) => {
                store.add_file(
                    folder_id,
                    &final_name,
                    &dest.to_string_lossy(),
                    size_on_disk(&dest),
                )?;
                outcome.imported += 1;
            }
            Err(err) => {
                log::warn!("   ❌ {}: {}", filename, err);
                outcome.errors += 1;
            }
        }
        progress(index + 1, paths.len());
    }

    log::info!(
        "📦 Import into '{}': {} imported, {} error(s)",
        folder.name,
        outcome.imported,
        outcome.errors
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixtures() -> (TempDir, Store, FileHandler) {
        let dir = TempDir::new().unwrap();
        let store = Store::open_in_memory().unwrap();
        let handler = FileHandler::new(dir.path().join("uploads")).unwrap();
        (dir, store, handler)
    }

    #[test]
    fn test_count_files_to_import_filters_allow_list() {
        let (dir, _store, handler) = fixtures();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.pdf"), b"a").unwrap();
        fs::write(src.join("skip.png"), b"x").unwrap();
        fs::write(src.join("nested/b.docx"), b"b").unwrap();

        assert_eq!(count_files_to_import(&handler, &src), 2);
    }

    #[test]
    fn test_import_folder_tree_mirrors_hierarchy() {
        let (dir, store, handler) = fixtures();
        let src = dir.path().join("Projet");
        fs::create_dir_all(src.join("Annexes")).unwrap();
        fs::write(src.join("plan.pdf"), b"plan").unwrap();
        fs::write(src.join("Annexes/annexe.xlsx"), b"annexe").unwrap();
        fs::write(src.join("Annexes/ignored.tmp"), b"no").unwrap();

        let mut reports = Vec::new();
        let imported = import_folder_tree(
            &store,
            &handler,
            &src,
            None,
            Panel::Autre,
            &mut |current, total| reports.push((current, total)),
        )
        .unwrap();

        assert_eq!(imported, 2);
        assert_eq!(reports, vec![(1, 2), (2, 2)]);

        let roots = store.get_subfolders(None, Some(Panel::Autre)).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "Projet");

        let subs = store.get_subfolders(Some(roots[0].id), None).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].name, "Annexes");
        assert_eq!(subs[0].panel, Panel::Autre);

        assert_eq!(store.count_files_in_folder(roots[0].id, true).unwrap(), 2);
        let annexe_files = store.get_files_in_folder(subs[0].id).unwrap();
        assert_eq!(annexe_files.len(), 1);
        assert!(Path::new(&annexe_files[0].filepath).exists());
    }

    #[test]
    fn test_root_import_uses_virtual_container_and_counts_errors() {
        let (dir, store, handler) = fixtures();
        let good = dir.path().join("ok.pdf");
        let bad = dir.path().join("nope.png");
        fs::write(&good, b"ok").unwrap();
        fs::write(&bad, b"no").unwrap();

        let outcome = import_files_to_root(
            &store,
            &handler,
            &[good, bad],
            Panel::Entete,
            &mut |_, _| {},
        )
        .unwrap();

        assert_eq!(outcome.imported, 1);
        assert_eq!(outcome.errors, 1);
        assert!(!outcome.is_clean());

        let roots = store.get_subfolders(None, Some(Panel::Entete)).unwrap();
        assert_eq!(roots.len(), 1);
        assert!(roots[0].is_virtual_root());
        assert_eq!(store.get_files_in_folder(roots[0].id).unwrap().len(), 1);
    }

    #[test]
    fn test_same_name_twice_in_one_batch_gets_suffixed() {
        let (dir, store, handler) = fixtures();
        let first = dir.path().join("a/report.pdf");
        let second = dir.path().join("b/report.pdf");
        fs::create_dir_all(first.parent().unwrap()).unwrap();
        fs::create_dir_all(second.parent().unwrap()).unwrap();
        fs::write(&first, b"one").unwrap();
        fs::write(&second, b"two").unwrap();

        let outcome = import_files_to_root(
            &store,
            &handler,
            &[first, second],
            Panel::Autre,
            &mut |_, _| {},
        )
        .unwrap();
        assert_eq!(outcome.imported, 2);

        let root_id = store.ensure_virtual_root(Panel::Autre).unwrap();
        let names: Vec<String> = store
            .get_files_in_folder(root_id)
            .unwrap()
            .into_iter()
            .map(|f| f.filename)
            .collect();
        assert_eq!(names, vec!["report.pdf", "report_1.pdf"]);
    }

    #[test]
    fn test_import_into_vanished_folder_is_not_found() {
        let (dir, store, handler) = fixtures();
        let file = dir.path().join("x.pdf");
        fs::write(&file, b"x").unwrap();

        let folder = store.create_folder("Gone", None, Panel::Autre).unwrap();
        store.delete_folder(folder).unwrap();

        assert!(matches!(
            import_files_to_folder(&store, &handler, &[file], folder, &mut |_, _| {}),
            Err(Error::NotFound("folder"))
        ));
    }

    #[test]
    fn test_folder_without_valid_files_creates_nothing() {
        let (dir, store, handler) = fixtures();
        let src = dir.path().join("Brouillons");
        fs::create_dir_all(src.join("Sous")).unwrap();
        fs::write(src.join("notes.txt"), b"txt").unwrap();

        let mut reports = Vec::new();
        let result = import_folder_tree(
            &store,
            &handler,
            &src,
            None,
            Panel::Autre,
            &mut |current, total| reports.push((current, total)),
        );

        assert!(matches!(result, Err(Error::NoImportableFiles)));
        assert!(reports.is_empty());
        // Neither the root folder nor its empty subfolder were mirrored.
        assert!(store.get_all_folders(None).unwrap().is_empty());
    }

    #[test]
    fn test_empty_subtrees_are_not_mirrored() {
        let (dir, store, handler) = fixtures();
        let src = dir.path().join("Projet");
        fs::create_dir_all(src.join("Vide/Encore")).unwrap();
        fs::write(src.join("plan.pdf"), b"plan").unwrap();

        let imported =
            import_folder_tree(&store, &handler, &src, None, Panel::Autre, &mut |_, _| {})
                .unwrap();
        assert_eq!(imported, 1);

        let roots = store.get_subfolders(None, Some(Panel::Autre)).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "Projet");
        assert!(store.get_subfolders(Some(roots[0].id), None).unwrap().is_empty());
    }

    #[test]
    fn test_import_into_folder_reports_progress() {
        let (dir, store, handler) = fixtures();
        let folder = store.create_folder("Dest", None, Panel::Entete).unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.docx");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        let mut reports = Vec::new();
        let outcome = import_files_to_folder(
            &store,
            &handler,
            &[a, b],
            folder,
            &mut |current, total| reports.push((current, total)),
        )
        .unwrap();

        assert_eq!(outcome.imported, 2);
        assert_eq!(reports, vec![(1, 2), (2, 2)]);
    }
}
