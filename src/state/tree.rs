//! Folder/file tree view model for the admin screen.
//!
//! Pure traversal and expansion state, independent of any widget code. The
//! store stays authoritative: every structural mutation throws the whole tree
//! away and rebuilds it with [`PanelTree::load`] — there is no incremental
//! patching, and expansion state intentionally resets on reload.

use super::data::{FileRecord, Folder, Panel};
use super::store::Store;
use crate::error::Result;

/// One rendered folder with its direct files and subfolders.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub folder: Folder,
    /// Files render before subfolders, both in store order.
    pub files: Vec<FileRecord>,
    pub children: Vec<TreeNode>,
    /// Recursive file count, display annotation only.
    pub file_count: i64,
    /// Per-node toggle; fresh nodes always start expanded.
    pub expanded: bool,
}

impl TreeNode {
    /// A node gets a chevron iff there is anything beneath it.
    pub fn is_expandable(&self) -> bool {
        !self.files.is_empty() || !self.children.is_empty()
    }
}

/// The rendered tree of one panel.
#[derive(Debug, Clone, Default)]
pub struct PanelTree {
    /// Files of the virtual root container, shown before any folder.
    pub root_files: Vec<FileRecord>,
    /// ID of the virtual root container, when one exists.
    pub root_folder_id: Option<i64>,
    /// User-visible panel-root folders, in store order.
    pub roots: Vec<TreeNode>,
}

impl PanelTree {
    /// Build the full tree for a panel from the store's current state.
    ///
    /// Panel-root folders are partitioned: the reserved `_root_<panel>`
    /// container is never listed as a folder — only its files surface, as
    /// `root_files`.
    pub fn load(store: &Store, panel: Panel) -> Result<Self> {
        let root_folders = store.get_subfolders(None, Some(panel))?;

        let mut tree = PanelTree::default();
        for folder in root_folders {
            if folder.is_virtual_root() {
                tree.root_folder_id = Some(folder.id);
                tree.root_files = store.get_files_in_folder(folder.id)?;
            } else {
                tree.roots.push(Self::build_node(store, folder)?);
            }
        }
        Ok(tree)
    }

    /// Recursively materialize one folder node.
    fn build_node(store: &Store, folder: Folder) -> Result<TreeNode> {
        let files = store.get_files_in_folder(folder.id)?;
        let subfolders = store.get_subfolders(Some(folder.id), None)?;
        let file_count = store.count_files_in_folder(folder.id, true)?;

        let mut children = Vec::with_capacity(subfolders.len());
        for subfolder in subfolders {
            children.push(Self::build_node(store, subfolder)?);
        }

        Ok(TreeNode {
            folder,
            files,
            children,
            file_count,
            expanded: true,
        })
    }

    /// Whether there is anything at all to show.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.root_files.is_empty()
    }

    /// Flip the expansion flag of exactly one node.
    ///
    /// Pure presentation: no store fetch, and sibling/descendant flags are
    /// untouched. Returns false when the node is no longer in the tree.
    pub fn toggle(&mut self, folder_id: i64) -> bool {
        fn toggle_in(nodes: &mut [TreeNode], folder_id: i64) -> bool {
            for node in nodes {
                if node.folder.id == folder_id {
                    node.expanded = !node.expanded;
                    return true;
                }
                if toggle_in(&mut node.children, folder_id) {
                    return true;
                }
            }
            false
        }
        toggle_in(&mut self.roots, folder_id)
    }

    /// Look up a node by folder ID (used by per-node actions).
    pub fn find(&self, folder_id: i64) -> Option<&TreeNode> {
        fn find_in(nodes: &[TreeNode], folder_id: i64) -> Option<&TreeNode> {
            for node in nodes {
                if node.folder.id == folder_id {
                    return Some(node);
                }
                if let Some(found) = find_in(&node.children, folder_id) {
                    return Some(found);
                }
            }
            None
        }
        find_in(&self.roots, folder_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::open_in_memory().unwrap()
    }

    #[test]
    fn test_list_root_filters_virtual_container() {
        let store = store();
        let panel = Panel::Certification;
        let visible = store.create_folder("Diplomas", None, panel).unwrap();
        let root_id = store.ensure_virtual_root(panel).unwrap();
        store
            .add_file(root_id, "loose.pdf", "/tmp/loose.pdf", 1)
            .unwrap();

        let tree = PanelTree::load(&store, panel).unwrap();

        assert_eq!(tree.roots.len(), 1);
        assert_eq!(tree.roots[0].folder.id, visible);
        assert!(tree
            .roots
            .iter()
            .all(|node| !node.folder.is_virtual_root()));
        assert_eq!(tree.root_folder_id, Some(root_id));
        assert_eq!(tree.root_files.len(), 1);
        assert_eq!(tree.root_files[0].filename, "loose.pdf");
    }

    #[test]
    fn test_nodes_start_expanded_and_order_is_store_order() {
        let store = store();
        let panel = Panel::Autre;
        let parent = store.create_folder("Parent", None, panel).unwrap();
        let first = store.create_folder("B-first", Some(parent), panel).unwrap();
        let second = store.create_folder("A-second", Some(parent), panel).unwrap();
        store.add_file(parent, "z.pdf", "/tmp/z.pdf", 1).unwrap();
        store.add_file(parent, "a.pdf", "/tmp/a.pdf", 1).unwrap();

        let tree = PanelTree::load(&store, panel).unwrap();
        let node = &tree.roots[0];

        assert!(node.expanded);
        assert!(node.children.iter().all(|c| c.expanded));
        // No client-side re-sort: insertion order wins over names.
        assert_eq!(
            node.children.iter().map(|c| c.folder.id).collect::<Vec<_>>(),
            vec![first, second]
        );
        assert_eq!(
            node.files.iter().map(|f| f.filename.as_str()).collect::<Vec<_>>(),
            vec!["z.pdf", "a.pdf"]
        );
    }

    #[test]
    fn test_expandable_only_with_content() {
        let store = store();
        let panel = Panel::Entete;
        let empty = store.create_folder("Empty", None, panel).unwrap();
        let with_file = store.create_folder("WithFile", None, panel).unwrap();
        store
            .add_file(with_file, "doc.docx", "/tmp/doc.docx", 1)
            .unwrap();

        let tree = PanelTree::load(&store, panel).unwrap();
        let empty_node = tree.find(empty).unwrap();
        let full_node = tree.find(with_file).unwrap();

        assert!(!empty_node.is_expandable());
        assert!(full_node.is_expandable());
    }

    #[test]
    fn test_toggle_touches_exactly_one_node() {
        let store = store();
        let panel = Panel::Autre;
        let parent = store.create_folder("Parent", None, panel).unwrap();
        let child_a = store.create_folder("A", Some(parent), panel).unwrap();
        let child_b = store.create_folder("B", Some(parent), panel).unwrap();
        store.add_file(child_a, "a.pdf", "/tmp/a.pdf", 1).unwrap();
        store.add_file(child_b, "b.pdf", "/tmp/b.pdf", 1).unwrap();

        let mut tree = PanelTree::load(&store, panel).unwrap();
        assert!(tree.toggle(child_a));

        assert!(!tree.find(child_a).unwrap().expanded);
        assert!(tree.find(child_b).unwrap().expanded, "sibling untouched");
        assert!(tree.find(parent).unwrap().expanded, "parent untouched");

        // Toggling back restores the node without affecting anything else.
        assert!(tree.toggle(child_a));
        assert!(tree.find(child_a).unwrap().expanded);
    }

    #[test]
    fn test_toggle_unknown_node_is_a_no_op() {
        let store = store();
        let mut tree = PanelTree::load(&store, Panel::Autre).unwrap();
        assert!(!tree.toggle(42));
    }

    #[test]
    fn test_reload_after_delete_drops_the_subtree() {
        let store = store();
        let panel = Panel::Certification;
        let parent = store.create_folder("Parent", None, panel).unwrap();
        let child = store.create_folder("Child", Some(parent), panel).unwrap();
        store.add_file(child, "x.pdf", "/tmp/x.pdf", 1).unwrap();

        let before = PanelTree::load(&store, panel).unwrap();
        assert!(before.find(child).is_some());

        store.delete_folder(child).unwrap();

        // Full reload, not a patch: the old tree still holds the stale node,
        // the reloaded one does not.
        let after = PanelTree::load(&store, panel).unwrap();
        assert!(after.find(child).is_none());
        assert_eq!(after.find(parent).unwrap().file_count, 0);
    }

    #[test]
    fn test_empty_panel_tree() {
        let store = store();
        let tree = PanelTree::load(&store, Panel::Entete).unwrap();
        assert!(tree.is_empty());
        assert!(tree.root_folder_id.is_none());
    }
}
