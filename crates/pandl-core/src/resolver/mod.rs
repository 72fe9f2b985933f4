//! Magnet resolution: list the resource tree, flatten it and pick the files
//! worth downloading.

mod flatten;
mod select;

pub use flatten::{flatten_tree, FlatFileEntry};
pub use select::{is_video_file, select_files, Selection};

use crate::config::SelectionConfig;
use crate::drive::DriveClient;
use crate::error::Result;

/// The computed download plan for one magnet.
#[derive(Debug, Clone)]
pub struct SelectionManifest {
    pub torrent_name: String,
    /// Total number of files in the torrent as reported by the provider.
    pub total_file_count: u64,
    /// Distinct provider indices of the chosen files, as strings.
    pub selected_file_indices: Vec<String>,
    /// Sum of the sizes of exactly the chosen files.
    pub selected_total_size: u64,
    pub selected_file_names: Vec<String>,
}

/// Resolve one magnet into a manifest, or fail with `Api` /
/// `NoEligibleFiles`.
pub async fn resolve(
    client: &DriveClient,
    magnet: &str,
    policy: &SelectionConfig,
) -> Result<SelectionManifest> {
    let root = client.list_resources(magnet).await?;
    let torrent_name = root.name.clone();

    let children = root
        .dir
        .as_ref()
        .map(|d| d.resources.as_slice())
        .unwrap_or(&[]);

    // Single-file torrent: no nested listing, take the whole file.
    if children.is_empty() {
        let index = root.file_index.unwrap_or(0);
        tracing::debug!("single-file torrent: {torrent_name}");
        return Ok(SelectionManifest {
            torrent_name: torrent_name.clone(),
            total_file_count: 1,
            selected_file_indices: vec![index.to_string()],
            selected_total_size: root.file_size,
            selected_file_names: vec![torrent_name],
        });
    }

    let flat = flatten_tree(children);
    let selection = select_files(&flat, policy)?;
    tracing::info!(
        "{}: selected {} of {} files ({} bytes)",
        torrent_name,
        selection.indices.len(),
        flat.len(),
        selection.total_size
    );

    let total_file_count = if root.file_count > 0 {
        root.file_count
    } else {
        flat.len() as u64
    };

    Ok(SelectionManifest {
        torrent_name,
        total_file_count,
        selected_file_indices: selection.indices,
        selected_total_size: selection.total_size,
        selected_file_names: selection.names,
    })
}
