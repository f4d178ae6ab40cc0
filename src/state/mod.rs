/// State management module
///
/// This module handles all application state, including:
/// - Database connections and queries (store.rs)
/// - Shared data structures (data.rs)
/// - The folder/file tree view model (tree.rs)

pub mod data;
pub mod store;
pub mod tree;
