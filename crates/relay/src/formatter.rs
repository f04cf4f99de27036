//! Build event → chat message.
//!
//! [`format_message`] is infallible: every well-formed [`BuildEvent`] yields a
//! [`ChatMessage`], with optional fields dropped when their data is missing.
//!
//! Field order is fixed:
//!
//! | Field | Present when |
//! |-------|--------------|
//! | Status | always |
//! | Duration | status is not `WORKING` |
//! | Repository | the build has a repository source |
//! | Branch | the build has a repository source |
//! | Commit Author | enrichment found a commit with an author name |
//! | Type | the build is tagged `deploy` |

use tracing::debug;

use crate::message::{ATTACHMENT_TITLE, BOT_ICON_EMOJI, BOT_USERNAME, FOOTER, FOOTER_ICON};
use crate::{
    humanize_duration, Attachment, BuildEvent, BuildStatus, ChatMessage, Color, Enrichment, Field,
};

const DEPLOY_TAG: &str = "deploy";

/// Renders the chat message for `event`.
pub fn format_message(event: &BuildEvent, enrichment: &Enrichment) -> ChatMessage {
    let working = event.is_working();

    let text = if working {
        format!("Build `{}` started", event.display_id())
    } else {
        format!("Build `{}` finished", event.display_id())
    };

    let shown_time = if working {
        event.start_time
    } else {
        event.finish_time
    };

    let mut fields = vec![Field::short("Status", event.status.as_str())];

    if !working {
        fields.push(Field::short("Duration", duration_text(event)));
    }

    if let Some(repo) = event.repo_source() {
        fields.push(Field::short(
            "Repository",
            repo.repo_name.as_ref().map(|n| n.as_str()).unwrap_or_default(),
        ));
        fields.push(Field::short(
            "Branch",
            repo.branch_name.as_ref().map(|b| b.as_str()).unwrap_or_default(),
        ));
    }

    if let Some(commit) = enrichment.commit() {
        match commit.author_name() {
            Some(name) => fields.push(Field::short("Commit Author", name)),
            None => debug!(sha = %commit.sha, "commit has no author name; omitting field"),
        }
    }

    if event.has_tag(DEPLOY_TAG) {
        fields.push(Field::short("Type", DEPLOY_TAG));
    }

    ChatMessage {
        text,
        mrkdwn: Some(true),
        username: Some(BOT_USERNAME.to_string()),
        icon_emoji: Some(BOT_ICON_EMOJI.to_string()),
        attachments: vec![Attachment {
            color: status_color(&event.status).as_hex().to_string(),
            title: ATTACHMENT_TITLE.to_string(),
            title_link: event.log_url.clone(),
            fields,
            footer: FOOTER.to_string(),
            footer_icon: FOOTER_ICON.to_string(),
            ts: shown_time.map(|t| t.epoch_seconds_rounded()),
        }],
    }
}

/// Attachment color for a build status.
pub fn status_color(status: &BuildStatus) -> Color {
    match status {
        BuildStatus::Success => Color::Green,
        BuildStatus::Failure | BuildStatus::InternalError => Color::Red,
        BuildStatus::Timeout => Color::Yellow,
        BuildStatus::Queued | BuildStatus::Working | BuildStatus::Other(_) => Color::Blue,
    }
}

fn duration_text(event: &BuildEvent) -> String {
    match (event.start_time, event.finish_time) {
        (Some(start), Some(finish)) => humanize_duration(finish.millis_between(start)),
        _ => {
            debug!(build_id = event.display_id(), "build is missing start or finish time");
            "unknown".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{CommitAuthor, CommitInfo, CommitLookupError, CommitSha, EnrichmentError};

    fn event(value: serde_json::Value) -> BuildEvent {
        serde_json::from_value(value).unwrap()
    }

    fn finished(status: &str) -> BuildEvent {
        event(json!({
            "id": "b1",
            "status": status,
            "startTime": "2024-05-01T10:00:00Z",
            "finishTime": "2024-05-01T10:02:05Z",
            "logUrl": "http://x",
        }))
    }

    fn titles(message: &ChatMessage) -> Vec<&str> {
        message
            .attachment()
            .unwrap()
            .fields
            .iter()
            .map(|f| f.title.as_str())
            .collect()
    }

    fn commit(author: Option<CommitAuthor>) -> Enrichment {
        Enrichment::Found(CommitInfo {
            sha: CommitSha::new("abc123").unwrap(),
            author,
        })
    }

    #[test]
    fn test_finished_build() {
        let message = format_message(&finished("SUCCESS"), &Enrichment::Unavailable);

        assert_eq!(message.text, "Build `b1` finished");
        assert_eq!(message.username.as_deref(), Some("gcb-bot"));
        assert_eq!(message.icon_emoji.as_deref(), Some(":robot_face:"));
        assert_eq!(message.mrkdwn, Some(true));
        assert_eq!(titles(&message), vec!["Status", "Duration"]);
        assert_eq!(message.field("Status").unwrap().value, "SUCCESS");
        assert_eq!(message.field("Duration").unwrap().value, "2 minutes, 5 seconds");

        let attachment = message.attachment().unwrap();
        assert_eq!(attachment.title, "Build logs");
        assert_eq!(attachment.title_link, "http://x");
        assert_eq!(attachment.footer, "Google Cloud Build");
        assert_eq!(attachment.footer_icon, FOOTER_ICON);
        // 2024-05-01T10:02:05Z
        assert_eq!(attachment.ts, Some(1_714_557_725));
    }

    #[test]
    fn test_working_build_uses_start_time_and_omits_duration() {
        let message = format_message(
            &event(json!({
                "id": "b1",
                "status": "WORKING",
                "startTime": "2024-05-01T10:00:00.600Z",
                "logUrl": "http://x",
            })),
            &Enrichment::Unavailable,
        );

        assert_eq!(message.text, "Build `b1` started");
        assert!(message.field("Duration").is_none());
        assert_eq!(message.attachment().unwrap().ts, Some(1_714_557_601));
        assert_eq!(message.attachment().unwrap().color, Color::Blue.as_hex());
    }

    #[test]
    fn test_status_colors() {
        for (status, color) in [
            ("SUCCESS", Color::Green),
            ("FAILURE", Color::Red),
            ("INTERNAL_ERROR", Color::Red),
            ("TIMEOUT", Color::Yellow),
            ("QUEUED", Color::Blue),
            ("CANCELLED", Color::Blue),
        ] {
            let message = format_message(&finished(status), &Enrichment::Unavailable);
            assert_eq!(message.attachment().unwrap().color, color.as_hex(), "{status}");
        }
    }

    #[test]
    fn test_missing_times_render_unknown_duration() {
        let message = format_message(
            &event(json!({"id": "b1", "status": "FAILURE"})),
            &Enrichment::Unavailable,
        );
        assert_eq!(message.field("Duration").unwrap().value, "unknown");
        assert_eq!(message.attachment().unwrap().ts, None);
    }

    #[test]
    fn test_source_fields_in_order() {
        let mut build = finished("SUCCESS");
        build.tags = vec!["deploy".to_string()];
        build.source = Some(serde_json::from_value(json!({
            "repoSource": {"repoName": "github_acme_webapp", "branchName": "main"}
        })).unwrap());

        let enrichment = commit(Some(CommitAuthor {
            name: Some("Ada Lovelace".to_string()),
            email: None,
            date: None,
        }));
        let message = format_message(&build, &enrichment);

        assert_eq!(
            titles(&message),
            vec!["Status", "Duration", "Repository", "Branch", "Commit Author", "Type"]
        );
        assert_eq!(message.field("Repository").unwrap().value, "github_acme_webapp");
        assert_eq!(message.field("Branch").unwrap().value, "main");
        assert_eq!(message.field("Commit Author").unwrap().value, "Ada Lovelace");
        assert_eq!(message.field("Type").unwrap().value, "deploy");
    }

    #[test]
    fn test_repo_source_without_branch_keeps_branch_field() {
        let mut build = finished("SUCCESS");
        build.source = Some(serde_json::from_value(json!({
            "repoSource": {"repoName": "github_acme_webapp", "tagName": "v1"}
        })).unwrap());

        let message = format_message(&build, &Enrichment::Unavailable);
        assert_eq!(message.field("Branch").unwrap().value, "");
    }

    #[test]
    fn test_missing_id_renders_unknown() {
        let message = format_message(
            &event(json!({"status": "SUCCESS", "tags": null})),
            &Enrichment::Unavailable,
        );
        assert_eq!(message.text, "Build `unknown` finished");
    }

    #[test]
    fn test_commit_without_author_omits_field() {
        let message = format_message(&finished("SUCCESS"), &commit(None));
        assert!(message.field("Commit Author").is_none());
    }

    #[test]
    fn test_failed_enrichment_omits_author() {
        let failed = Enrichment::Failed(EnrichmentError::Lookup(CommitLookupError::Network {
            message: "connection refused".to_string(),
        }));
        let message = format_message(&finished("FAILURE"), &failed);
        assert!(message.field("Commit Author").is_none());
        assert_eq!(titles(&message), vec!["Status", "Duration"]);
    }

    #[test]
    fn test_non_deploy_tags_add_no_type() {
        let mut build = finished("SUCCESS");
        build.tags = vec!["deployment".to_string(), "prod".to_string()];
        assert!(format_message(&build, &Enrichment::Unavailable).field("Type").is_none());
    }

    #[test]
    fn test_finish_before_start_renders_gap() {
        let build = event(json!({
            "id": "b1",
            "status": "SUCCESS",
            "startTime": "2024-05-01T10:00:10Z",
            "finishTime": "2024-05-01T10:00:00Z",
        }));
        let message = format_message(&build, &Enrichment::Unavailable);
        assert_eq!(message.field("Duration").unwrap().value, "10 seconds");
    }
}
