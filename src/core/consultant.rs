//! Consultant payloads - The request/response bodies exchanged with the external
//! question-answering service.
//!
//! Each question is sent together with a full snapshot of the motel's tables;
//! the service keeps no state between calls.

use crate::{
    entities::{expense, product, room, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tables included with every question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotelSnapshot {
    /// Every room with its occupancy
    pub rooms: Vec<room::Model>,
    /// The ledger
    pub transactions: Vec<transaction::Model>,
    /// The menu
    pub products: Vec<product::Model>,
    /// Cash outflows
    pub expenses: Vec<expense::Model>,
    /// When the snapshot was taken
    pub captured_at: DateTime<Utc>,
}

/// Body sent to the consultant service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultantRequest {
    /// Operator's question
    pub question: String,
    /// JSON encoding of a [`MotelSnapshot`]
    #[serde(rename = "motelData")]
    pub motel_data: String,
}

impl ConsultantRequest {
    /// Builds a request carrying `snapshot` as its data.
    ///
    /// # Errors
    /// Returns a validation error for an empty question, or a serialization error.
    pub fn from_snapshot(question: &str, snapshot: &MotelSnapshot) -> Result<Self> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::Validation {
                message: "Question cannot be empty".to_string(),
            });
        }
        Ok(Self {
            question: question.to_string(),
            motel_data: serde_json::to_string(snapshot)?,
        })
    }

    /// Request body as JSON.
    ///
    /// # Errors
    /// Returns a serialization error.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Into::into)
    }
}

/// Body returned by the consultant service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultantResponse {
    /// Generated answer
    pub answer: String,
}

impl ConsultantResponse {
    /// Parses a response body.
    ///
    /// # Errors
    /// Returns a serialization error if the body is not a valid response.
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_request_embeds_snapshot_as_string() {
        let snapshot = MotelSnapshot {
            captured_at: Utc.with_ymd_and_hms(2024, 5, 10, 18, 0, 0).unwrap(),
            ..MotelSnapshot::default()
        };
        let request = ConsultantRequest::from_snapshot(" ¿Cuántas rentas hubo? ", &snapshot).unwrap();
        assert_eq!(request.question, "¿Cuántas rentas hubo?");

        let body: serde_json::Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();
        let data = body["motelData"].as_str().unwrap();
        let decoded: MotelSnapshot = serde_json::from_str(data).unwrap();
        assert_eq!(decoded, snapshot);
        assert!(data.contains("\"capturedAt\""));
    }

    #[test]
    fn test_empty_question_rejected() {
        let result = ConsultantRequest::from_snapshot("  ", &MotelSnapshot::default());
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_parse_response() {
        let response = ConsultantResponse::parse(r#"{"answer":"Hubo 3 rentas."}"#).unwrap();
        assert_eq!(response.answer, "Hubo 3 rentas.");
        assert!(ConsultantResponse::parse("{}").is_err());
    }
}
