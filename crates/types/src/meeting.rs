//! Telemost conference payloads.

use serde::{Deserialize, Serialize};

/// Live-stream settings sent when creating a conference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveStreamRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_level: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// A cohost invited by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cohost {
    pub email: String,
}

/// Body of `POST /conferences`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub waiting_room_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_stream: Option<LiveStreamRequest>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cohosts: Vec<Cohost>,
}

/// Live-stream part of a created conference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveStream {
    pub watch_url: String,
}

/// A created Telemost conference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub join_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_stream: Option<LiveStream>,
}

/// Structured error body returned by the Telemost API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_skips_empty_parts() {
        let req = MeetingRequest {
            waiting_room_level: "PUBLIC".into(),
            ..MeetingRequest::default()
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"waiting_room_level":"PUBLIC"}"#);
    }

    #[test]
    fn test_meeting_without_live_stream() {
        let m: Meeting = serde_json::from_str(r#"{"id":"abc","join_url":"https://x/y"}"#).unwrap();
        assert_eq!(m.id, "abc");
        assert_eq!(m.join_url, "https://x/y");
        assert!(m.live_stream.is_none());
    }

    #[test]
    fn test_meeting_with_live_stream() {
        let m: Meeting = serde_json::from_str(
            r#"{"id":"abc","join_url":"https://x/y","live_stream":{"watch_url":"https://w"}}"#,
        )
        .unwrap();
        assert_eq!(m.live_stream.unwrap().watch_url, "https://w");
    }
}
