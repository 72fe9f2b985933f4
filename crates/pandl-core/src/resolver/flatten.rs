//! Depth-first flattening of the provider's nested resource tree.

use crate::drive::types::ResourceNode;

/// One selectable (or at least listable) leaf of a torrent.
#[derive(Debug, Clone)]
pub struct FlatFileEntry {
    pub name: String,
    pub size: u64,
    /// Absent on the occasional leaf the provider does not index; such a
    /// leaf can never be selected.
    pub file_index: Option<i64>,
}

/// Collect every leaf under `resources`, depth-first. Directories are
/// descended into and never emitted themselves.
pub fn flatten_tree(resources: &[ResourceNode]) -> Vec<FlatFileEntry> {
    let mut out = Vec::new();
    collect(resources, &mut out);
    out
}

fn collect(resources: &[ResourceNode], out: &mut Vec<FlatFileEntry>) {
    for node in resources {
        if node.is_dir {
            if let Some(dir) = &node.dir {
                collect(&dir.resources, out);
            }
        } else {
            out.push(FlatFileEntry {
                name: node.name.clone(),
                size: node.file_size,
                file_index: node.file_index,
            });
        }
    }
}
