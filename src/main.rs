use iced::{Element, Subscription, Task, Theme};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::path::{Path, PathBuf};

mod config;
mod drop_paths;
mod error;
mod files;
mod state;
mod ui;

use config::Config;
use drop_paths::parse_drop_paths;
use error::Error;
use files::import;
use files::FileHandler;
use state::data::{Folder, Panel};
use state::store::Store;
use state::tree::PanelTree;
use ui::search::TypeFilter;

/// Which screen the window currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Admin,
    Search,
}

/// Inline modal dialogs. At most one is open; it captures the next
/// confirm/cancel interaction.
#[derive(Debug, Clone)]
enum Dialog {
    /// Name prompt for a new folder (panel-root when `parent` is None).
    CreateFolder { parent: Option<i64>, name: String },
    RenameFolder { folder_id: i64, name: String },
    DeleteFolder { folder_id: i64, name: String },
    DeleteFile { file_id: i64, filename: String },
    /// Per-directory confirmation before a recursive import; the head of the
    /// queue is the directory currently being confirmed.
    ImportFolders { queue: Vec<PathBuf> },
    /// Destination chooser for dialog-selected files: panel root or one of
    /// the panel's existing folders (snapshotted when the dialog opens).
    ChooseDestination {
        paths: Vec<PathBuf>,
        folders: Vec<Folder>,
    },
}

/// One search result with the context needed to display and locate it.
#[derive(Debug, Clone)]
struct SearchHit {
    file: state::data::FileRecord,
    folder_name: Option<String>,
    panel: Option<Panel>,
}

/// Search screen state.
#[derive(Debug, Clone, Default)]
struct SearchState {
    name: String,
    kind: TypeFilter,
    hits: Vec<SearchHit>,
}

/// Result of a background import task.
#[derive(Debug, Clone)]
struct ImportReport {
    imported: usize,
    errors: usize,
    label: String,
}

/// Main application state
struct DocuDesk {
    store: Store,
    handler: FileHandler,
    screen: Screen,
    /// The panel being administered; fixed namespaces, switchable in the UI.
    panel: Panel,
    tree: PanelTree,
    dialog: Option<Dialog>,
    /// Paste-paths input of the drop zone (raw drag payload format).
    drop_payload: String,
    search: SearchState,
    /// Status line shown at the bottom of the window.
    status: String,
    importing: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    SwitchScreen(Screen),
    SelectPanel(Panel),
    Refresh,
    ToggleFolder(i64),

    NewFolder,
    AddSubfolder(i64),
    AddFilesToFolder(i64),
    RenameFolderRequested(i64),
    DeleteFolderRequested(i64),
    DeleteFileRequested(i64),
    OpenFile(i64),

    DialogInput(String),
    DialogConfirm,
    DialogCancel,
    DestinationChosen(Option<i64>),

    PickImportFolder,
    PickImportFiles,
    DropPayloadChanged(String),
    DropPayloadSubmitted,
    FileDropped(PathBuf),
    ImportComplete(ImportReport),

    SearchNameChanged(String),
    SearchSubmitted,
    SearchTypeSelected(TypeFilter),
    SearchCleared,
    LocateFile(i64),
}

impl DocuDesk {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = Config::load();

        // If these fail, the app cannot function: no catalog, no storage.
        let store = Store::open(config.db_path())
            .expect("Failed to initialize database. Check permissions and disk space.");
        let handler = FileHandler::new(config.upload_dir())
            .expect("Failed to create the document storage directory.");

        let panel = Panel::Certification;
        let tree = PanelTree::load(&store, panel).unwrap_or_default();
        let file_count = store.search_files("", "").map(|f| f.len()).unwrap_or(0);
        log::info!("🗂️ DocuDesk initialized with {} documents", file_count);

        let app = DocuDesk {
            store,
            handler,
            screen: Screen::Admin,
            panel,
            tree,
            dialog: None,
            drop_payload: String::new(),
            search: SearchState::default(),
            status: format!("Prêt. {} document(s) dans le catalogue.", file_count),
            importing: false,
        };
        (app, Task::none())
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SwitchScreen(screen) => {
                self.screen = screen;
                self.dialog = None;
                if screen == Screen::Search {
                    // Initial empty-criteria search shows the whole catalog.
                    self.run_search();
                }
                Task::none()
            }
            Message::SelectPanel(panel) => {
                self.panel = panel;
                self.reload_tree();
                self.status = format!("Panel: {}", panel.display_name());
                Task::none()
            }
            Message::Refresh => {
                self.reload_tree();
                Task::none()
            }
            Message::ToggleFolder(folder_id) => {
                // Pure presentation toggle, no store fetch.
                self.tree.toggle(folder_id);
                Task::none()
            }

            Message::NewFolder => {
                self.dialog = Some(Dialog::CreateFolder {
                    parent: None,
                    name: String::new(),
                });
                Task::none()
            }
            Message::AddSubfolder(parent_id) => {
                self.dialog = Some(Dialog::CreateFolder {
                    parent: Some(parent_id),
                    name: String::new(),
                });
                Task::none()
            }
            Message::AddFilesToFolder(folder_id) => {
                if self.importing {
                    self.status = "⏳ Importation déjà en cours".to_string();
                    return Task::none();
                }
                let title = match self.tree.find(folder_id) {
                    Some(node) => format!("Ajouter des fichiers à '{}'", node.folder.name),
                    None => "Ajouter des fichiers au dossier".to_string(),
                };
                let picked = rfd::FileDialog::new()
                    .set_title(&title)
                    .add_filter("Documents", &files::ALLOWED_EXTENSIONS)
                    .pick_files();
                match picked {
                    Some(paths) => self.spawn_file_import(paths, Some(folder_id)),
                    None => Task::none(),
                }
            }
            Message::RenameFolderRequested(folder_id) => {
                match self.store.get_folder(folder_id) {
                    Ok(Some(folder)) => {
                        self.dialog = Some(Dialog::RenameFolder {
                            folder_id,
                            name: folder.name,
                        });
                    }
                    Ok(None) => self.report_vanished("Dossier"),
                    Err(err) => self.report_error(err),
                }
                Task::none()
            }
            Message::DeleteFolderRequested(folder_id) => {
                match self.store.get_folder(folder_id) {
                    Ok(Some(folder)) => {
                        self.dialog = Some(Dialog::DeleteFolder {
                            folder_id,
                            name: folder.name,
                        });
                    }
                    Ok(None) => self.report_vanished("Dossier"),
                    Err(err) => self.report_error(err),
                }
                Task::none()
            }
            Message::DeleteFileRequested(file_id) => {
                match self.store.get_file(file_id) {
                    Ok(Some(file)) => {
                        self.dialog = Some(Dialog::DeleteFile {
                            file_id,
                            filename: file.filename,
                        });
                    }
                    Ok(None) => self.report_vanished("Fichier"),
                    Err(err) => self.report_error(err),
                }
                Task::none()
            }
            Message::OpenFile(file_id) => {
                match self.store.get_file(file_id) {
                    Ok(Some(file)) => {
                        if !Path::new(&file.filepath).exists() {
                            self.status = "❌ Le fichier n'existe plus".to_string();
                        } else if !self.handler.open_file(Path::new(&file.filepath)) {
                            self.status = "❌ Impossible d'ouvrir le fichier".to_string();
                        }
                    }
                    Ok(None) => self.report_vanished("Fichier"),
                    Err(err) => self.report_error(err),
                }
                Task::none()
            }

            Message::DialogInput(value) => {
                match &mut self.dialog {
                    Some(Dialog::CreateFolder { name, .. })
                    | Some(Dialog::RenameFolder { name, .. }) => *name = value,
                    _ => {}
                }
                Task::none()
            }
            Message::DialogConfirm => self.confirm_dialog(),
            Message::DialogCancel => {
                match &mut self.dialog {
                    // Skip the current directory, keep asking about the rest.
                    Some(Dialog::ImportFolders { queue }) => {
                        queue.remove(0);
                        if queue.is_empty() {
                            self.dialog = None;
                        }
                    }
                    _ => self.dialog = None,
                }
                Task::none()
            }
            Message::DestinationChosen(folder_id) => {
                if self.importing {
                    self.status = "⏳ Importation déjà en cours".to_string();
                    return Task::none();
                }
                let paths = match self.dialog.take() {
                    Some(Dialog::ChooseDestination { paths, .. }) => paths,
                    _ => return Task::none(),
                };
                self.spawn_file_import(paths, folder_id)
            }

            Message::PickImportFolder => {
                let folder = rfd::FileDialog::new()
                    .set_title("Sélectionner un dossier")
                    .pick_folder();
                if let Some(path) = folder {
                    self.dialog = Some(Dialog::ImportFolders { queue: vec![path] });
                }
                Task::none()
            }
            Message::PickImportFiles => {
                let picked = rfd::FileDialog::new()
                    .set_title("Sélectionner des fichiers")
                    .add_filter("Documents", &files::ALLOWED_EXTENSIONS)
                    .pick_files();
                if let Some(paths) = picked {
                    let folders = match self.store.get_all_folders(Some(self.panel)) {
                        Ok(folders) => folders
                            .into_iter()
                            .filter(|f| !f.is_virtual_root())
                            .collect(),
                        Err(err) => {
                            self.report_error(err);
                            Vec::new()
                        }
                    };
                    self.dialog = Some(Dialog::ChooseDestination { paths, folders });
                }
                Task::none()
            }

            Message::DropPayloadChanged(value) => {
                self.drop_payload = value;
                Task::none()
            }
            Message::DropPayloadSubmitted => {
                let payload = std::mem::take(&mut self.drop_payload);
                self.handle_drop_paths(parse_drop_paths(&payload))
            }
            Message::FileDropped(path) => self.handle_drop_paths(vec![path]),
            Message::ImportComplete(report) => {
                self.importing = false;
                self.status = if report.imported == 0 && report.errors == 0 {
                    format!("⚠️ {} : aucun fichier valide", report.label)
                } else if report.errors == 0 {
                    format!("✅ {} : {} fichier(s) importé(s)", report.label, report.imported)
                } else {
                    format!(
                        "⚠️ {} : {} importé(s), {} erreur(s)",
                        report.label, report.imported, report.errors
                    )
                };
                self.notify_changes();
                Task::none()
            }

            Message::SearchNameChanged(value) => {
                self.search.name = value;
                self.run_search();
                Task::none()
            }
            Message::SearchSubmitted => {
                self.run_search();
                Task::none()
            }
            Message::SearchTypeSelected(kind) => {
                self.search.kind = kind;
                self.run_search();
                Task::none()
            }
            Message::SearchCleared => {
                self.search.name.clear();
                self.search.kind = TypeFilter::All;
                self.run_search();
                Task::none()
            }
            Message::LocateFile(file_id) => {
                self.locate_file(file_id);
                Task::none()
            }
        }
    }

    /// Close and apply the open dialog.
    fn confirm_dialog(&mut self) -> Task<Message> {
        let dialog = match self.dialog.take() {
            Some(dialog) => dialog,
            None => return Task::none(),
        };

        match dialog {
            Dialog::CreateFolder { parent, name } => {
                match self.store.create_folder(&name, parent, self.panel) {
                    Ok(_) => {
                        self.status = "✅ Dossier créé".to_string();
                        self.notify_changes();
                    }
                    Err(Error::EmptyName) => {
                        self.status = "⚠️ Le nom ne peut pas être vide".to_string();
                    }
                    Err(err) => self.report_error(err),
                }
                Task::none()
            }
            Dialog::RenameFolder { folder_id, name } => {
                match self.store.update_folder(folder_id, &name) {
                    Ok(()) => {
                        self.status = "✅ Dossier renommé".to_string();
                        self.notify_changes();
                    }
                    Err(Error::EmptyName) => {
                        self.status = "⚠️ Le nom ne peut pas être vide".to_string();
                    }
                    Err(Error::NotFound(_)) => self.report_vanished("Dossier"),
                    Err(err) => self.report_error(err),
                }
                Task::none()
            }
            Dialog::DeleteFolder { folder_id, .. } => {
                match self.store.delete_folder(folder_id) {
                    Ok(()) => {
                        self.status = "✅ Dossier supprimé".to_string();
                        self.notify_changes();
                    }
                    Err(Error::NotFound(_)) => self.report_vanished("Dossier"),
                    Err(err) => self.report_error(err),
                }
                Task::none()
            }
            Dialog::DeleteFile { file_id, .. } => {
                match self.store.delete_file(file_id) {
                    Ok(()) => {
                        self.status = "✅ Fichier supprimé".to_string();
                        self.notify_changes();
                    }
                    Err(Error::NotFound(_)) => self.report_vanished("Fichier"),
                    Err(err) => self.report_error(err),
                }
                Task::none()
            }
            Dialog::ImportFolders { mut queue } => {
                // One background import at a time: keep the queue intact and
                // let the user confirm again once the running job reports in.
                if self.importing {
                    self.status = "⏳ Importation déjà en cours".to_string();
                    self.dialog = Some(Dialog::ImportFolders { queue });
                    return Task::none();
                }
                let dir = queue.remove(0);
                if !queue.is_empty() {
                    self.dialog = Some(Dialog::ImportFolders { queue });
                }
                self.spawn_folder_import(dir)
            }
            Dialog::ChooseDestination { paths, folders } => {
                if self.importing {
                    self.status = "⏳ Importation déjà en cours".to_string();
                    self.dialog = Some(Dialog::ChooseDestination { paths, folders });
                    return Task::none();
                }
                // The destination buttons send DestinationChosen directly;
                // a bare confirm defaults to the panel root.
                self.spawn_file_import(paths, None)
            }
        }
    }

    /// Route freshly parsed drop paths: directories go through the
    /// confirmation queue, regular files import straight to the panel root.
    fn handle_drop_paths(&mut self, paths: Vec<PathBuf>) -> Task<Message> {
        if self.importing {
            self.status = "⏳ Importation déjà en cours".to_string();
            return Task::none();
        }
        if paths.is_empty() {
            self.status = "❌ Aucun élément valide".to_string();
            return Task::none();
        }

        let (dirs, loose_files): (Vec<PathBuf>, Vec<PathBuf>) =
            paths.into_iter().partition(|p| p.is_dir());

        if !dirs.is_empty() {
            match &mut self.dialog {
                Some(Dialog::ImportFolders { queue }) => queue.extend(dirs),
                _ => self.dialog = Some(Dialog::ImportFolders { queue: dirs }),
            }
        }

        if !loose_files.is_empty() {
            return self.spawn_file_import(loose_files, None);
        }
        Task::none()
    }

    /// Launch a recursive directory import in the background.
    fn spawn_folder_import(&mut self, dir: PathBuf) -> Task<Message> {
        self.importing = true;
        self.status = format!("⏳ Importation de {}...", dir.display());
        Task::perform(
            import_folder_job(
                self.store.path().clone(),
                self.handler.upload_dir().to_path_buf(),
                dir,
                self.panel,
            ),
            Message::ImportComplete,
        )
    }

    /// Launch a loose-file import in the background (panel root when no
    /// destination folder was chosen).
    fn spawn_file_import(&mut self, paths: Vec<PathBuf>, destination: Option<i64>) -> Task<Message> {
        self.importing = true;
        self.status = format!("⏳ Importation de {} fichier(s)...", paths.len());
        Task::perform(
            import_files_job(
                self.store.path().clone(),
                self.handler.upload_dir().to_path_buf(),
                paths,
                self.panel,
                destination,
            ),
            Message::ImportComplete,
        )
    }

    /// Full reload from the store. The previous tree (and its expansion
    /// state) is discarded wholesale; the store is authoritative.
    fn reload_tree(&mut self) {
        match PanelTree::load(&self.store, self.panel) {
            Ok(tree) => self.tree = tree,
            Err(err) => {
                self.tree = PanelTree::default();
                self.report_error(err);
            }
        }
    }

    /// Post-mutation hook: refresh every view that renders store data.
    fn notify_changes(&mut self) {
        self.reload_tree();
        if self.screen == Screen::Search {
            self.run_search();
        }
    }

    fn run_search(&mut self) {
        match self
            .store
            .search_files(&self.search.name, self.search.kind.extension())
        {
            Ok(files) => {
                self.search.hits = files
                    .into_iter()
                    .map(|file| {
                        let folder = self.store.get_folder(file.folder_id).ok().flatten();
                        SearchHit {
                            panel: folder.as_ref().map(|f| f.panel),
                            folder_name: folder.map(|f| f.name),
                            file,
                        }
                    })
                    .collect();
            }
            Err(err) => self.report_error(err),
        }
    }

    /// Jump from a search hit to its folder on the admin screen.
    fn locate_file(&mut self, file_id: i64) {
        let folder = match self.store.get_file(file_id) {
            Ok(Some(file)) => match self.store.get_folder(file.folder_id) {
                Ok(folder) => folder,
                Err(err) => return self.report_error(err),
            },
            Ok(None) => return self.report_vanished("Fichier"),
            Err(err) => return self.report_error(err),
        };

        match folder {
            Some(folder) => {
                self.panel = folder.panel;
                self.screen = Screen::Admin;
                self.reload_tree();
                self.status = format!("📍 Localisé dans {}", folder.name);
            }
            None => self.report_vanished("Dossier"),
        }
    }

    /// Not-found flow of a concurrent deletion: tell the user and resync the
    /// view with the store's current state.
    fn report_vanished(&mut self, what: &str) {
        self.status = format!("❌ {} introuvable — vue rechargée", what);
        self.notify_changes();
    }

    fn report_error(&mut self, err: Error) {
        log::error!("❌ {}", err);
        self.status = format!("❌ Erreur: {}", err);
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        match self.screen {
            Screen::Admin => ui::admin::view(self),
            Screen::Search => ui::search::view(self),
        }
    }

    /// Window-level file drops feed the same import pipeline as the
    /// paste-paths input.
    fn subscription(&self) -> Subscription<Message> {
        iced::event::listen_with(|event, _status, _window| match event {
            iced::Event::Window(iced::window::Event::FileDropped(path)) => {
                Some(Message::FileDropped(path))
            }
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    TermLogger::init(
        LevelFilter::Info,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .ok();

    iced::application("DocuDesk", DocuDesk::update, DocuDesk::view)
        .subscription(DocuDesk::subscription)
        .theme(DocuDesk::theme)
        .centered()
        .run_with(DocuDesk::new)
}

/// Async recursive directory import.
/// Opens its own catalog connection: `rusqlite::Connection` is not Send, so
/// the main connection stays on the UI thread.
async fn import_folder_job(
    db_path: PathBuf,
    upload_dir: PathBuf,
    dir: PathBuf,
    panel: Panel,
) -> ImportReport {
    let label = format!("Import de {}", dir.display());
    let (store, handler) = match (Store::open(db_path), FileHandler::new(upload_dir)) {
        (Ok(store), Ok(handler)) => (store, handler),
        _ => {
            log::error!("❌ Import aborted: could not open catalog or storage");
            return ImportReport {
                imported: 0,
                errors: 1,
                label,
            };
        }
    };

    let mut progress = |current: usize, total: usize| {
        log::info!("⏳ Importation... ({}/{})", current, total);
    };

    match import::import_folder_tree(&store, &handler, &dir, None, panel, &mut progress) {
        Ok(imported) => ImportReport {
            imported,
            errors: 0,
            label,
        },
        Err(Error::NoImportableFiles) => {
            log::warn!("⚠️ {}: aucun fichier valide", label);
            ImportReport {
                imported: 0,
                errors: 0,
                label,
            }
        }
        Err(err) => {
            log::error!("❌ {}: {}", label, err);
            ImportReport {
                imported: 0,
                errors: 1,
                label,
            }
        }
    }
}

/// Async loose-file import, into the panel root container or a chosen folder.
async fn import_files_job(
    db_path: PathBuf,
    upload_dir: PathBuf,
    paths: Vec<PathBuf>,
    panel: Panel,
    destination: Option<i64>,
) -> ImportReport {
    let label = "Import de fichiers".to_string();
    let (store, handler) = match (Store::open(db_path), FileHandler::new(upload_dir)) {
        (Ok(store), Ok(handler)) => (store, handler),
        _ => {
            log::error!("❌ Import aborted: could not open catalog or storage");
            return ImportReport {
                imported: 0,
                errors: paths.len(),
                label,
            };
        }
    };

    let mut progress = |current: usize, total: usize| {
        log::info!("⏳ Importation... ({}/{})", current, total);
    };

    let outcome = match destination {
        None => import::import_files_to_root(&store, &handler, &paths, panel, &mut progress),
        Some(folder_id) => {
            import::import_files_to_folder(&store, &handler, &paths, folder_id, &mut progress)
        }
    };

    match outcome {
        Ok(outcome) => ImportReport {
            imported: outcome.imported,
            errors: outcome.errors,
            label,
        },
        Err(err) => {
            log::error!("❌ {}: {}", label, err);
            ImportReport {
                imported: 0,
                errors: paths.len(),
                label,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> DocuDesk {
        DocuDesk {
            store: Store::open_in_memory().unwrap(),
            handler: FileHandler::new(dir.path().join("uploads")).unwrap(),
            screen: Screen::Admin,
            panel: Panel::Certification,
            tree: PanelTree::default(),
            dialog: None,
            drop_payload: String::new(),
            search: SearchState::default(),
            status: String::new(),
            importing: false,
        }
    }

    #[test]
    fn test_drop_during_running_import_is_refused() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.pdf");
        std::fs::write(&file, b"a").unwrap();

        let mut app = app(&dir);
        app.importing = true;
        let _ = app.update(Message::FileDropped(file));

        assert_eq!(app.status, "⏳ Importation déjà en cours");
        assert!(app.dialog.is_none());
        assert!(app.importing);
    }

    #[test]
    fn test_queued_folder_confirm_waits_for_running_import() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("Docs");
        std::fs::create_dir_all(&sub).unwrap();

        let mut app = app(&dir);
        app.importing = true;
        app.dialog = Some(Dialog::ImportFolders {
            queue: vec![sub.clone()],
        });
        let _ = app.update(Message::DialogConfirm);

        // The queue head is still there for a later confirm.
        match &app.dialog {
            Some(Dialog::ImportFolders { queue }) => assert_eq!(queue, &vec![sub]),
            other => panic!("dialog was dropped: {:?}", other),
        }
        assert_eq!(app.status, "⏳ Importation déjà en cours");
    }

    #[test]
    fn test_destination_choice_waits_for_running_import() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.pdf");
        std::fs::write(&file, b"a").unwrap();

        let mut app = app(&dir);
        app.importing = true;
        app.dialog = Some(Dialog::ChooseDestination {
            paths: vec![file],
            folders: Vec::new(),
        });
        let _ = app.update(Message::DestinationChosen(None));

        assert!(matches!(
            &app.dialog,
            Some(Dialog::ChooseDestination { .. })
        ));
        assert_eq!(app.status, "⏳ Importation déjà en cours");
    }

    #[test]
    fn test_import_complete_without_valid_files_warns() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.importing = true;

        let _ = app.update(Message::ImportComplete(ImportReport {
            imported: 0,
            errors: 0,
            label: "Import de /tmp/vide".to_string(),
        }));

        assert!(!app.importing);
        assert_eq!(app.status, "⚠️ Import de /tmp/vide : aucun fichier valide");
    }
}
