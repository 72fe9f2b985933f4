//! Orchestrator: routes inbound updates through the pending-batch state
//! machine and drives dispatch.
//!
//! Per conversation: Idle -> AwaitingFolderChoice (magnets arrive) ->
//! Dispatching (folder chosen) -> Idle, or Cancelled -> Idle. A choice or
//! cancel with nothing pending is answered as expired and changes nothing.

use std::time::Duration;

use anyhow::Result;
use pandl_core::callback::CallbackAction;
use pandl_core::config::PandlConfig;
use pandl_core::dispatcher;
use pandl_core::drive::{DriveClient, Folder};
use pandl_core::magnet;
use pandl_core::registry::PendingBatchRegistry;

use crate::telegram::{
    CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message, TelegramClient, Update,
};

/// Folder names are clipped to this many chars inside callback data, which
/// Telegram caps at 64 bytes.
const CALLBACK_NAME_LIMIT: usize = 10;

pub struct Handler {
    cfg: PandlConfig,
    drive: DriveClient,
    telegram: TelegramClient,
    registry: PendingBatchRegistry,
}

impl Handler {
    pub fn new(cfg: PandlConfig, drive: DriveClient, telegram: TelegramClient) -> Self {
        Self {
            cfg,
            drive,
            telegram,
            registry: PendingBatchRegistry::new(),
        }
    }

    /// Handle one update; errors are logged, never propagated into the poll
    /// loop.
    pub async fn handle_update(&self, update: Update) {
        let result = if let Some(message) = update.message {
            self.handle_message(message).await
        } else if let Some(callback) = update.callback_query {
            self.handle_callback(callback).await
        } else {
            Ok(())
        };
        if let Err(err) = result {
            tracing::error!("update {} failed: {err:#}", update.update_id);
        }
    }

    async fn handle_message(&self, message: Message) -> Result<()> {
        if message.chat.id != self.cfg.bot.chat_id {
            tracing::debug!("ignoring message from chat {}", message.chat.id);
            return Ok(());
        }
        let text = message.text.unwrap_or_default();
        let magnets = magnet::extract_magnets(&text);
        if magnets.is_empty() {
            self.telegram
                .send_message(message.chat.id, "Send a magnet link.", None)
                .await?;
            return Ok(());
        }

        let count = magnets.len();
        self.registry.insert(message.chat.id, magnets);

        // Folder listing failure still leaves the direct-download button.
        let folders = match self.drive.list_folders(&self.cfg.parent_folder_id).await {
            Ok(folders) => folders,
            Err(err) => {
                tracing::warn!("folder listing failed: {err}");
                Vec::new()
            }
        };
        let markup = folder_keyboard(&folders, &self.cfg.parent_folder_id);
        self.telegram
            .send_message(
                message.chat.id,
                &format!("Found {count} magnet link(s).\nChoose a destination:"),
                Some(&markup),
            )
            .await?;
        Ok(())
    }

    async fn handle_callback(&self, callback: CallbackQuery) -> Result<()> {
        let Some(message) = callback.message else {
            // Button on a message we can no longer see; just acknowledge.
            return self.telegram.answer_callback_query(&callback.id, "").await;
        };
        let chat_id = message.chat.id;
        let data = callback.data.unwrap_or_default();

        let action = match CallbackAction::parse(&data) {
            Ok(action) => action,
            Err(err) => {
                // Malformed callback data: acknowledge, change nothing.
                tracing::warn!("{err}");
                return self.telegram.answer_callback_query(&callback.id, "").await;
            }
        };

        match action {
            CallbackAction::Cancel => {
                self.telegram
                    .answer_callback_query(&callback.id, "Cancelled")
                    .await?;
                self.telegram
                    .delete_message(chat_id, message.message_id)
                    .await?;
                self.registry.cancel(chat_id);
                Ok(())
            }
            CallbackAction::Download {
                folder_id,
                folder_name,
            } => {
                let Some(magnets) = self.registry.take(chat_id) else {
                    return self
                        .telegram
                        .answer_callback_query(&callback.id, "Batch expired")
                        .await;
                };

                self.telegram
                    .answer_callback_query(&callback.id, "Working...")
                    .await?;
                self.telegram
                    .edit_message_text(
                        chat_id,
                        message.message_id,
                        &format!("Processing {} task(s)...", magnets.len()),
                    )
                    .await?;

                let report = dispatcher::dispatch_batch(
                    &self.drive,
                    &magnets,
                    &folder_id,
                    &folder_name,
                    &self.cfg.selection,
                    Duration::from_secs(self.cfg.dispatch_delay_secs),
                )
                .await;

                self.telegram
                    .edit_message_text(chat_id, message.message_id, &report.render())
                    .await?;
                Ok(())
            }
        }
    }
}

/// Destination keyboard: folder buttons two per row, or a single direct
/// button when there are no sub-folders, then a cancel row.
pub fn folder_keyboard(folders: &[Folder], parent_id: &str) -> InlineKeyboardMarkup {
    let download = |folder_id: &str, folder_name: &str| CallbackAction::Download {
        folder_id: folder_id.to_string(),
        folder_name: clip(folder_name),
    };
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    if folders.is_empty() {
        rows.push(vec![InlineKeyboardButton {
            text: "Download here".to_string(),
            callback_data: download(parent_id, "root").encode(),
        }]);
    } else {
        for chunk in folders.chunks(2) {
            rows.push(
                chunk
                    .iter()
                    .map(|folder| InlineKeyboardButton {
                        text: folder.name.clone(),
                        callback_data: download(&folder.id, &folder.name).encode(),
                    })
                    .collect(),
            );
        }
    }
    rows.push(vec![InlineKeyboardButton {
        text: "Cancel".to_string(),
        callback_data: CallbackAction::Cancel.encode(),
    }]);
    InlineKeyboardMarkup {
        inline_keyboard: rows,
    }
}

fn clip(name: &str) -> String {
    name.chars().take(CALLBACK_NAME_LIMIT).collect()
}
