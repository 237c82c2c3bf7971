//! Analysis request envelope.
//!
//! The analysis API receives the record as the `device_fingerprint` field of a
//! JSON body, next to request context it gathers elsewhere. The record travels
//! in its flat [`WireFingerprint`] form. This module only builds that body;
//! sending it is the caller's business.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::fingerprint::record::FingerprintRecord;
use crate::fingerprint::wire::WireFingerprint;

/// JSON body accepted by the analysis endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub user_id: String,
    pub ip_address: String,
    pub email: String,
    pub user_agent: String,
    pub timestamp: DateTime<Utc>,
    /// Free-form session events, passed through untouched.
    #[serde(default)]
    pub session_events: Vec<Value>,
    pub device_fingerprint: WireFingerprint,
}

impl AnalysisRequest {
    /// Wraps a record, taking the user agent from its identity block.
    ///
    /// Without a known user, a random `anon-` id is assigned.
    pub fn new(record: FingerprintRecord) -> Self {
        Self {
            user_id: format!("anon-{}", Uuid::new_v4()),
            ip_address: String::new(),
            email: String::new(),
            user_agent: record.identity.user_agent.clone(),
            timestamp: Utc::now(),
            session_events: Vec::new(),
            device_fingerprint: WireFingerprint::from(&record),
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = ip_address.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_session_events(mut self, events: Vec<Value>) -> Self {
        self.session_events = events;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_fields() {
        let mut record = FingerprintRecord::default();
        record.identity.user_agent = "TestAgent/1.0".to_string();
        record.hash = Some("abc".to_string());

        let request = AnalysisRequest::new(record)
            .with_user_id("user-42")
            .with_ip_address("203.0.113.7")
            .with_email("user@example.com");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["user_id"], "user-42");
        assert_eq!(json["ip_address"], "203.0.113.7");
        assert_eq!(json["user_agent"], "TestAgent/1.0");
        assert_eq!(json["device_fingerprint"]["hash"], "abc");
        assert_eq!(json["device_fingerprint"]["userAgent"], "TestAgent/1.0");
        assert!(json["session_events"].as_array().unwrap().is_empty());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_session_events_pass_through() {
        let events = vec![
            serde_json::json!({ "type": "login", "success": true }),
            serde_json::json!({ "type": "page_view", "path": "/checkout" }),
        ];
        let request =
            AnalysisRequest::new(FingerprintRecord::default()).with_session_events(events.clone());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["session_events"], serde_json::Value::Array(events));
    }

    #[test]
    fn test_anonymous_user_id() {
        let request = AnalysisRequest::new(FingerprintRecord::default());
        assert!(request.user_id.starts_with("anon-"));
    }
}
