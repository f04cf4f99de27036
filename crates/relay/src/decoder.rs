//! Pub/Sub payload decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;

use crate::{BuildEvent, DecodeError};

/// Decodes a base64-encoded JSON build resource.
///
/// Surrounding whitespace is ignored. A JSON document without a non-null
/// `status` member is rejected with [`DecodeError::MissingStatus`].
pub fn decode_event(data: &str) -> Result<BuildEvent, DecodeError> {
    let bytes = STANDARD.decode(data.trim())?;
    let text = String::from_utf8(bytes)?;
    let value: Value = serde_json::from_str(&text)?;

    if value.get("status").map_or(true, Value::is_null) {
        return Err(DecodeError::MissingStatus);
    }

    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuildStatus;

    fn encode(json: &str) -> String {
        STANDARD.encode(json)
    }

    #[test]
    fn test_decode_minimal_build() {
        let event = decode_event(&encode(r#"{"id":"b1","status":"QUEUED"}"#)).unwrap();
        assert_eq!(event.display_id(), "b1");
        assert_eq!(event.status, BuildStatus::Queued);
        assert!(event.tags.is_empty());
        assert!(event.source.is_none());
        assert!(event.start_time.is_none());
    }

    #[test]
    fn test_decode_full_build() {
        let json = r#"{
            "id": "b2",
            "projectId": "proj",
            "status": "FAILURE",
            "startTime": "2024-05-01T10:00:00.123456789Z",
            "finishTime": "2024-05-01T10:02:05.123456789Z",
            "logUrl": "https://console.cloud.google.com/cloud-build/builds/b2",
            "source": {"repoSource": {"repoName": "github_acme_webapp", "branchName": "main"}},
            "sourceProvenance": {"resolvedRepoSource": {"commitSha": "abc123"}},
            "tags": ["deploy", "prod"]
        }"#;
        let event = decode_event(&encode(json)).unwrap();
        assert_eq!(event.status, BuildStatus::Failure);
        assert_eq!(event.commit_sha().map(|s| s.as_str()), Some("abc123"));
        let repo = event.repo_source().unwrap();
        assert_eq!(repo.repo_name.as_ref().unwrap().as_str(), "github_acme_webapp");
        assert_eq!(repo.branch_name.as_ref().unwrap().as_str(), "main");
        assert!(event.has_tag("deploy"));
        let start = event.start_time.unwrap();
        let finish = event.finish_time.unwrap();
        assert_eq!(finish.millis_between(start), 125_000);
    }

    #[test]
    fn test_decode_tolerates_surrounding_whitespace() {
        let data = format!("  {}\n", encode(r#"{"id":"b1","status":"SUCCESS"}"#));
        assert!(decode_event(&data).is_ok());
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        assert!(matches!(decode_event("not base64!"), Err(DecodeError::Base64(_))));
    }

    #[test]
    fn test_decode_rejects_non_json() {
        assert!(matches!(decode_event(&encode("hello")), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_decode_rejects_missing_status() {
        assert!(matches!(
            decode_event(&encode(r#"{"id":"b1"}"#)),
            Err(DecodeError::MissingStatus)
        ));
        assert!(matches!(
            decode_event(&encode(r#"{"id":"b1","status":null}"#)),
            Err(DecodeError::MissingStatus)
        ));
    }

    #[test]
    fn test_decode_accepts_null_tags() {
        let event =
            decode_event(&encode(r#"{"id":"b1","status":"SUCCESS","tags":null}"#)).unwrap();
        assert!(event.tags.is_empty());
        assert_eq!(event.status, BuildStatus::Success);
    }

    #[test]
    fn test_decode_accepts_missing_id() {
        let event = decode_event(&encode(r#"{"status":"FAILURE","logUrl":"http://x"}"#)).unwrap();
        assert!(event.id.is_none());
        assert_eq!(event.display_id(), "unknown");
        assert_eq!(event.log_url, "http://x");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let data = STANDARD.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(decode_event(&data), Err(DecodeError::Utf8(_))));
    }
}
