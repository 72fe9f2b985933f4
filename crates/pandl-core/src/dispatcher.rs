//! Batch dispatch: resolve each magnet and create its remote task.
//!
//! Strictly sequential with a fixed pause between task creations; the pause
//! is rate limiting against the provider, not a tunable performance knob.
//! Per-magnet failures are folded into the report and never abort the batch.

use std::time::Duration;

use crate::config::SelectionConfig;
use crate::drive::DriveClient;
use crate::resolver;

/// How many example filenames a rendered report shows at most.
const MAX_REPORT_NAMES: usize = 5;

/// Outcome for one magnet in a batch.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    Success {
        torrent_name: String,
        file_names: Vec<String>,
    },
    Failure {
        magnet: String,
        reason: String,
    },
}

/// Aggregated result of one batch dispatch.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub destination_name: String,
    pub outcomes: Vec<TaskOutcome>,
}

impl DispatchReport {
    pub fn success_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TaskOutcome::Success { .. }))
            .count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    /// Human-readable summary: destination, counts, up to five names.
    pub fn render(&self) -> String {
        let mut text = format!(
            "Done. Folder: {}\nSuccess: {}, failed: {}\n",
            self.destination_name,
            self.success_count(),
            self.failure_count()
        );
        let names = self
            .outcomes
            .iter()
            .filter_map(|o| match o {
                TaskOutcome::Success { torrent_name, .. } => Some(torrent_name.as_str()),
                TaskOutcome::Failure { .. } => None,
            })
            .take(MAX_REPORT_NAMES);
        for name in names {
            text.push_str("- ");
            text.push_str(name);
            text.push('\n');
        }
        text
    }
}

/// Dispatch a batch of magnets to one destination folder.
pub async fn dispatch_batch(
    client: &DriveClient,
    magnets: &[String],
    folder_id: &str,
    folder_name: &str,
    policy: &SelectionConfig,
    pacing: Duration,
) -> DispatchReport {
    let mut outcomes = Vec::with_capacity(magnets.len());

    for (i, magnet) in magnets.iter().enumerate() {
        tracing::info!("task {}/{}: {}", i + 1, magnets.len(), truncated(magnet));
        let outcome = match resolver::resolve(client, magnet, policy).await {
            Ok(manifest) => match client.create_task(magnet, &manifest, folder_id).await {
                Ok(()) => {
                    tracing::info!("created task: {}", manifest.torrent_name);
                    TaskOutcome::Success {
                        torrent_name: manifest.torrent_name,
                        file_names: manifest.selected_file_names,
                    }
                }
                Err(err) => {
                    tracing::warn!("task creation failed for {}: {err}", truncated(magnet));
                    TaskOutcome::Failure {
                        magnet: magnet.clone(),
                        reason: err.to_string(),
                    }
                }
            },
            Err(err) => {
                tracing::warn!("resolution failed for {}: {err}", truncated(magnet));
                TaskOutcome::Failure {
                    magnet: magnet.clone(),
                    reason: err.to_string(),
                }
            }
        };
        outcomes.push(outcome);

        if i + 1 < magnets.len() && !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }
    }

    DispatchReport {
        destination_name: folder_name.to_string(),
        outcomes,
    }
}

fn truncated(magnet: &str) -> &str {
    let end = magnet
        .char_indices()
        .nth(80)
        .map(|(i, _)| i)
        .unwrap_or(magnet.len());
    &magnet[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PandlConfig;
    use crate::credential::CredentialStore;
    use httpmock::prelude::*;
    use std::sync::Arc;

    const MIB: u64 = 1024 * 1024;

    fn test_client(base: &str) -> DriveClient {
        let cfg = PandlConfig {
            api_host: base.trim_end_matches('/').to_string(),
            auth_token: "tok".into(),
            space: "space".into(),
            parent_folder_id: "root".into(),
            ..PandlConfig::default()
        };
        DriveClient::new(&cfg, Arc::new(CredentialStore::new("tok"))).unwrap()
    }

    fn single_file_listing(name: &str) -> serde_json::Value {
        serde_json::json!({
            "list": { "resources": [ {
                "name": name,
                "file_size": 700 * MIB,
                "is_dir": false,
                "file_count": 1
            } ] }
        })
    }

    #[tokio::test]
    async fn batch_aggregates_success_and_failure() {
        // Scenario D: first magnet creates fine, second is rejected by the
        // provider's error field.
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST)
                .path("/drive/v1/resource/list")
                .body_contains("btih:one");
            then.status(200).json_body(single_file_listing("one.mkv"));
        });
        server.mock(|when, then| {
            when.method(POST)
                .path("/drive/v1/resource/list")
                .body_contains("btih:two");
            then.status(200).json_body(single_file_listing("two.mkv"));
        });
        server.mock(|when, then| {
            when.method(POST)
                .path("/drive/v1/task")
                .body_contains("btih:one");
            then.status(200).json_body(serde_json::json!({ "task": { "id": "t1" } }));
        });
        server.mock(|when, then| {
            when.method(POST)
                .path("/drive/v1/task")
                .body_contains("btih:two");
            then.status(200).json_body(serde_json::json!({ "error": "denied" }));
        });

        let client = test_client(&server.base_url());
        let magnets = vec![
            "magnet:?xt=urn:btih:one".to_string(),
            "magnet:?xt=urn:btih:two".to_string(),
        ];
        let report = dispatch_batch(
            &client,
            &magnets,
            "folder-x",
            "X",
            &SelectionConfig::default(),
            Duration::ZERO,
        )
        .await;

        assert_eq!(report.destination_name, "X");
        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failure_count(), 1);
        assert!(matches!(
            &report.outcomes[0],
            TaskOutcome::Success { torrent_name, .. } if torrent_name == "one.mkv"
        ));
        assert!(matches!(&report.outcomes[1], TaskOutcome::Failure { .. }));
    }

    #[tokio::test]
    async fn resolution_failure_does_not_stop_the_batch() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST)
                .path("/drive/v1/resource/list")
                .body_contains("btih:bad");
            then.status(500);
        });
        server.mock(|when, then| {
            when.method(POST)
                .path("/drive/v1/resource/list")
                .body_contains("btih:good");
            then.status(200).json_body(single_file_listing("good.mkv"));
        });
        let task_mock = server.mock(|when, then| {
            when.method(POST).path("/drive/v1/task");
            then.status(200).json_body(serde_json::json!({}));
        });

        let client = test_client(&server.base_url());
        let magnets = vec![
            "magnet:?xt=urn:btih:bad".to_string(),
            "magnet:?xt=urn:btih:good".to_string(),
        ];
        let report = dispatch_batch(
            &client,
            &magnets,
            "f",
            "dest",
            &SelectionConfig::default(),
            Duration::ZERO,
        )
        .await;

        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failure_count(), 1);
        // Only the resolvable magnet reached task creation.
        task_mock.assert_hits(1);
    }

    #[test]
    fn report_render_caps_example_names() {
        let outcomes: Vec<TaskOutcome> = (0..7)
            .map(|i| TaskOutcome::Success {
                torrent_name: format!("name-{i}"),
                file_names: vec![],
            })
            .collect();
        let report = DispatchReport {
            destination_name: "X".into(),
            outcomes,
        };
        let text = report.render();
        assert!(text.contains("Success: 7, failed: 0"));
        assert_eq!(text.matches("- name-").count(), 5);
    }
}
