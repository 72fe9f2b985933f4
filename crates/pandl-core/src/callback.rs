//! Structured callback data from the transport's choice buttons.
//!
//! The wire form is `action|param|param`. Only two actions exist: `cancel`
//! and `dl|<folderId>|<folderName>`. Anything else is a `Parse` error, not a
//! silent skip.

use crate::error::{PandlError, Result};

/// Validated callback action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Cancel,
    Download {
        folder_id: String,
        folder_name: String,
    },
}

impl CallbackAction {
    pub fn parse(data: &str) -> Result<Self> {
        if data == "cancel" {
            return Ok(CallbackAction::Cancel);
        }
        if let Some(rest) = data.strip_prefix("dl|") {
            // The name may itself contain '|'; split once.
            let (folder_id, folder_name) = rest
                .split_once('|')
                .ok_or_else(|| PandlError::Parse(data.to_string()))?;
            if folder_id.is_empty() {
                return Err(PandlError::Parse(data.to_string()));
            }
            return Ok(CallbackAction::Download {
                folder_id: folder_id.to_string(),
                folder_name: folder_name.to_string(),
            });
        }
        Err(PandlError::Parse(data.to_string()))
    }

    /// Encode back into the wire form used in button callback data.
    pub fn encode(&self) -> String {
        match self {
            CallbackAction::Cancel => "cancel".to_string(),
            CallbackAction::Download {
                folder_id,
                folder_name,
            } => format!("dl|{folder_id}|{folder_name}"),
        }
    }
}
