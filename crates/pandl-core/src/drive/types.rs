//! Wire types for the drive API.

use serde::{Deserialize, Serialize};

/// One node of the provider's nested resource listing for a magnet.
///
/// Leaves carry a `file_index`; directories carry their children under
/// `dir.resources`. Anything the provider omits defaults to empty/zero.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceNode {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub is_dir: bool,
    /// Provider-assigned index within the torrent; absent on directories
    /// and on the occasional unindexed leaf.
    #[serde(default)]
    pub file_index: Option<i64>,
    #[serde(default)]
    pub file_count: u64,
    #[serde(default)]
    pub dir: Option<DirListing>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirListing {
    #[serde(default)]
    pub resources: Vec<ResourceNode>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceListResponse {
    pub list: Option<ResourceList>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceList {
    #[serde(default)]
    pub resources: Vec<ResourceNode>,
}

/// Body for `POST /drive/v1/task`. Numeric fields travel as strings,
/// matching what the provider expects.
#[derive(Debug, Serialize)]
pub struct TaskRequest {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub file_name: String,
    pub file_size: String,
    pub space: String,
    pub params: TaskParams,
}

#[derive(Debug, Serialize)]
pub struct TaskParams {
    pub target: String,
    pub url: String,
    pub parent_folder_id: String,
    pub total_file_count: String,
    /// Comma-joined list of selected file indices.
    pub sub_file_index: String,
}

#[derive(Debug, Deserialize)]
pub struct TaskResponse {
    /// Non-null when the provider rejected the task despite HTTP 200.
    #[serde(default)]
    pub error: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct FileListResponse {
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriveFile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub trashed: bool,
}

/// A destination folder offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_node_nested_dir() {
        let json = r#"{
            "name": "Show.S01",
            "file_size": 0,
            "is_dir": true,
            "file_count": 3,
            "dir": {
                "resources": [
                    { "name": "e01.mkv", "file_size": 1000, "is_dir": false, "file_index": 0 },
                    { "name": "sub", "is_dir": true, "dir": { "resources": [
                        { "name": "e02.mkv", "file_size": 2000, "is_dir": false, "file_index": 1 }
                    ] } }
                ]
            }
        }"#;
        let node: ResourceNode = serde_json::from_str(json).unwrap();
        assert!(node.is_dir);
        assert_eq!(node.file_count, 3);
        let children = &node.dir.as_ref().unwrap().resources;
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].file_index, Some(0));
        assert!(children[0].dir.is_none());
    }

    #[test]
    fn resource_node_leaf_without_index() {
        let json = r#"{ "name": "pad.bin", "file_size": 7, "is_dir": false }"#;
        let node: ResourceNode = serde_json::from_str(json).unwrap();
        assert!(node.file_index.is_none());
        assert_eq!(node.file_size, 7);
    }

    #[test]
    fn task_response_error_field() {
        let ok: TaskResponse = serde_json::from_str(r#"{"task":{"id":"t1"}}"#).unwrap();
        assert!(ok.error.is_null());
        let err: TaskResponse =
            serde_json::from_str(r#"{"error":"task_limit","error_code":123}"#).unwrap();
        assert!(!err.error.is_null());
    }

    #[test]
    fn task_request_serializes_type_key() {
        let req = TaskRequest {
            kind: "user#download-url",
            name: "n".into(),
            file_name: "n".into(),
            file_size: "42".into(),
            space: "s".into(),
            params: TaskParams {
                target: "s".into(),
                url: "magnet:?xt=urn:btih:abc".into(),
                parent_folder_id: "p".into(),
                total_file_count: "1".into(),
                sub_file_index: "0,2".into(),
            },
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["type"], "user#download-url");
        assert_eq!(v["params"]["sub_file_index"], "0,2");
    }
}
