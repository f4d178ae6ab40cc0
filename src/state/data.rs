/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the database layer and the UI layer. Folders and files are owned by the
/// store; the UI only holds transient copies for rendering.
use serde::{Deserialize, Serialize};

/// Reserved name prefix for the synthetic folder that holds files imported
/// directly at a panel's root. These folders are filtered out of normal
/// listings; only their files are surfaced.
pub const VIRTUAL_ROOT_PREFIX: &str = "_root_";

/// A top-level category. Each panel is a disjoint namespace of folders,
/// fixed for the lifetime of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Certification,
    Entete,
    InterfaceEmp,
    Autre,
    /// Fallback for unrecognized keys read back from the store.
    Unknown,
}

/// All panels a user can select, in display order.
pub const ALL_PANELS: [Panel; 4] = [
    Panel::Certification,
    Panel::Entete,
    Panel::InterfaceEmp,
    Panel::Autre,
];

impl Panel {
    /// Stable key persisted in the database. Must not change across versions.
    pub fn key(&self) -> &'static str {
        match self {
            Panel::Certification => "certification",
            Panel::Entete => "entete",
            Panel::InterfaceEmp => "interface_emp",
            Panel::Autre => "autre",
            Panel::Unknown => "unknown",
        }
    }

    /// Parse a persisted key back into a panel, falling back to `Unknown`.
    pub fn from_key(key: &str) -> Self {
        match key {
            "certification" => Panel::Certification,
            "entete" => Panel::Entete,
            "interface_emp" => Panel::InterfaceEmp,
            "autre" => Panel::Autre,
            _ => Panel::Unknown,
        }
    }

    /// Human-readable name shown in the UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            Panel::Certification => "Certification",
            Panel::Entete => "En-tête",
            Panel::InterfaceEmp => "Interface Employés",
            Panel::Autre => "Autre",
            Panel::Unknown => "Inconnu",
        }
    }

    /// Glyph shown next to the panel name.
    pub fn icon(&self) -> &'static str {
        match self {
            Panel::Certification => "📜",
            Panel::Entete => "📋",
            Panel::InterfaceEmp => "👥",
            Panel::Autre => "📦",
            Panel::Unknown => "📁",
        }
    }

    /// Name of this panel's virtual root container folder.
    pub fn virtual_root_name(&self) -> String {
        format!("{}{}", VIRTUAL_ROOT_PREFIX, self.key())
    }
}

impl std::fmt::Display for Panel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A folder in a panel's tree. `parent_id = None` means panel-root.
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    /// Unique database ID
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    /// Fixed at creation; descendants implicitly inherit it.
    pub panel: Panel,
}

impl Folder {
    /// Whether this is a synthetic root container rather than a user folder.
    pub fn is_virtual_root(&self) -> bool {
        self.name.starts_with(VIRTUAL_ROOT_PREFIX)
    }
}

/// A document stored in the catalog. Belongs to exactly one folder
/// (possibly a virtual root container).
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    /// Unique database ID
    pub id: i64,
    pub folder_id: i64,
    /// Filename only (e.g. "contract.pdf")
    pub filename: String,
    /// Full path of the stored copy inside the upload directory
    pub filepath: String,
    /// Size in bytes captured at import time (0 if unknown)
    pub file_size: u64,
}

impl FileRecord {
    /// Lowercased extension, empty when the filename has none.
    pub fn extension(&self) -> String {
        match self.filename.rsplit_once('.') {
            Some((_, ext)) => ext.to_lowercase(),
            None => String::new(),
        }
    }
}
