/// Filesystem side of the catalog
///
/// This module handles:
/// - The managed upload directory where imported documents are copied
/// - The allowed-extension policy and per-type glyphs
/// - Collision-safe copies (incrementing `_N` suffix before the extension)
/// - Recursive folder imports (import.rs)

pub mod import;

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Document types the catalog accepts. Everything else is rejected at
/// import time and counted as an error.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["pdf", "doc", "docx", "xls", "xlsx"];

/// Owns the base storage path and all copy operations into it.
#[derive(Debug, Clone)]
pub struct FileHandler {
    upload_dir: PathBuf,
}

impl FileHandler {
    /// Create a handler rooted at `upload_dir`, creating it if needed.
    pub fn new(upload_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&upload_dir)?;
        Ok(FileHandler { upload_dir })
    }

    /// Default storage location, next to the catalog database:
    /// `<data_dir>/docudesk/uploads`.
    pub fn default_upload_dir() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        path.push("docudesk");
        path.push("uploads");
        path
    }

    /// Base storage path.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Whether a filename is on the import allow-list.
    pub fn is_allowed_file(&self, filename: &str) -> bool {
        match extension_of(filename) {
            Some(ext) => ALLOWED_EXTENSIONS.contains(&ext.as_str()),
            None => false,
        }
    }

    pub fn is_pdf(&self, filename: &str) -> bool {
        extension_of(filename).as_deref() == Some("pdf")
    }

    /// Glyph for a (lowercased) extension, shown on file cards.
    pub fn file_icon(&self, extension: &str) -> &'static str {
        match extension {
            "pdf" => "📕",
            "doc" | "docx" => "📘",
            "xls" | "xlsx" => "📗",
            "txt" => "📃",
            "png" | "jpg" | "jpeg" => "🖼️",
            _ => "📄",
        }
    }

    /// Open a stored document with the system default application.
    /// Returns false on failure; the caller reports it to the user.
    pub fn open_file(&self, filepath: &Path) -> bool {
        match open::that(filepath) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("❌ Could not open {}: {}", filepath.display(), err);
                false
            }
        }
    }

    /// Copy `src` into the storage subdirectory for `dest_folder_name`,
    /// resolving filename collisions. Returns the final filename and the
    /// destination path.
    pub fn save_file(
        &self,
        src: &Path,
        filename: &str,
        dest_folder_name: &str,
    ) -> Result<(String, PathBuf)> {
        let dest_dir = self.upload_dir.join(sanitize_dir_name(dest_folder_name));
        std::fs::create_dir_all(&dest_dir)?;
        self.copy_unique(src, filename, &dest_dir)
    }

    /// Copy `src` directly into the base storage directory (root-level
    /// imports that land in a panel's virtual root container).
    pub fn save_file_to_root(&self, src: &Path, filename: &str) -> Result<(String, PathBuf)> {
        let dest_dir = self.upload_dir.clone();
        self.copy_unique(src, filename, &dest_dir)
    }

    fn copy_unique(
        &self,
        src: &Path,
        filename: &str,
        dest_dir: &Path,
    ) -> Result<(String, PathBuf)> {
        if !src.exists() {
            return Err(Error::NotFound("source file"));
        }
        if !self.is_allowed_file(filename) {
            return Err(Error::DisallowedFile(filename.to_string()));
        }

        let final_name = unique_filename(dest_dir, filename);
        let dest_path = dest_dir.join(&final_name);
        std::fs::copy(src, &dest_path)?;
        log::info!("   ✅ {} → {}", filename, dest_path.display());
        Ok((final_name, dest_path))
    }
}

/// Lowercased extension of a filename, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// First free filename in `dir`: the name itself, then `name_1.ext`,
/// `name_2.ext`, ... until one does not exist yet.
pub fn unique_filename(dir: &Path, filename: &str) -> String {
    if !dir.join(filename).exists() {
        return filename.to_string();
    }

    let (base, ext) = match filename.rsplit_once('.') {
        Some((base, ext)) => (base, Some(ext)),
        None => (filename, None),
    };

    let mut counter = 1;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{}_{}.{}", base, counter, ext),
            None => format!("{}_{}", base, counter),
        };
        if !dir.join(&candidate).exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Folder names become storage subdirectories; strip path syntax so a name
/// like "a/b" cannot escape the upload directory.
fn sanitize_dir_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            other => other,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.').to_string();
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed
    }
}
