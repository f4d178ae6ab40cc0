//! Best-effort recovery of filesystem paths from a drag-and-drop payload.
//!
//! Drop payloads arrive as one opaque string whose delimiting varies by OS
//! and toolkit: each path may be individually brace-wrapped, or the paths may
//! be space-separated even though filenames themselves can contain spaces.
//! The rules below are ordered and the first matching one wins; whatever they
//! produce then goes through one unconditional validation pass, so the caller
//! only ever sees paths that exist on disk (possibly none).

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// One brace-wrapped run: a `{`, the longest run of non-`}` characters, a `}`.
static BRACED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^}]+)\}").unwrap());

/// Parse a raw drop payload into the existing paths it names.
///
/// Duplicates are kept, order is preserved, and candidates that do not exist
/// are silently dropped. Empty or whitespace-only input yields an empty
/// vector.
pub fn parse_drop_paths(data: &str) -> Vec<PathBuf> {
    let data = data.trim();
    let mut candidates: Vec<String> = Vec::new();

    if data.contains('{') && data.contains('}') {
        // Rule 1: multi-path payload with each path individually wrapped.
        // Handles paths containing internal spaces.
        for capture in BRACED.captures_iter(data) {
            candidates.push(capture[1].trim().to_string());
        }
    } else if data.contains(' ') && !data.contains('{') && !data.contains('}') {
        // Rule 2: space-separated sequence. Greedy left-to-right
        // reconstruction so filenames with internal spaces survive: keep
        // accumulating tokens until the accumulated candidate exists.
        //
        // Inherently ambiguous when a proper prefix of a path also exists as
        // a path; the greedy-leftmost-match policy is intentional and kept.
        let mut accumulated = String::new();
        for token in data.split_whitespace() {
            accumulated.push_str(token);
            if Path::new(&accumulated).exists() {
                candidates.push(std::mem::take(&mut accumulated));
            } else {
                accumulated.push(' ');
            }
        }
        let residual = accumulated.trim();
        if !residual.is_empty() && Path::new(residual).exists() {
            candidates.push(residual.to_string());
        }
    } else if data.starts_with('{') && data.ends_with('}') {
        // Rule 3: a single brace-wrapped value spanning the whole payload.
        let inner = data[1..data.len() - 1].trim();
        if !inner.is_empty() {
            candidates.push(inner.to_string());
        }
    } else if !data.is_empty() {
        // Rule 4: the whole payload is one literal candidate.
        candidates.push(data.to_string());
    }

    // Final validation pass, regardless of which rule fired: scrub residual
    // whitespace and brace characters, keep only paths that exist right now.
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let cleaned = candidate
                .trim()
                .trim_matches(|c| c == '{' || c == '}')
                .trim();
            if !cleaned.is_empty() && Path::new(cleaned).exists() {
                Some(PathBuf::from(cleaned))
            } else {
                None
            }
        })
        .collect()
}
