use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::future::Future;
use uuid::Uuid;

/// Which form a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Corporate,
    Individual,
}

impl FormKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FormKind::Corporate => "corporate",
            FormKind::Individual => "individual",
        }
    }
}

/// A validated record ready to hand to the submission collaborator.
///
/// Carries a SHA-256 checksum of the serialized payload so whoever receives
/// it can detect a payload altered after validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionEnvelope {
    pub form: FormKind,
    pub session_id: Uuid,
    /// Scheme reference code; links individual submissions to their scheme.
    pub pstr_id: String,
    pub submitted_at: DateTime<Utc>,
    pub payload: Value,
    /// SHA-256 of the serialized payload (hex encoded).
    pub checksum: String,
}

impl SubmissionEnvelope {
    /// Wraps a validated record.
    pub fn new<T: Serialize>(
        form: FormKind,
        session_id: Uuid,
        pstr_id: &str,
        record: &T,
    ) -> Result<Self, AppError> {
        let payload = serde_json::to_value(record).map_err(|e| {
            AppError::InternalError(format!("Failed to serialize {} record: {}", form.as_str(), e))
        })?;
        let checksum = Self::compute_checksum(&payload);

        Ok(Self {
            form,
            session_id,
            pstr_id: pstr_id.to_string(),
            submitted_at: Utc::now(),
            payload,
            checksum,
        })
    }

    /// Computes SHA-256 checksum of the payload's canonical JSON text.
    fn compute_checksum(payload: &Value) -> String {
        let mut hasher = Sha256::new();
        hasher.update(payload.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Returns true if the payload still matches its checksum.
    pub fn verify(&self) -> bool {
        Self::compute_checksum(&self.payload) == self.checksum
    }
}

/// Acknowledgement returned by a submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub reference: String,
    pub checksum: String,
    pub accepted_at: DateTime<Utc>,
}

/// The external collaborator a validated record is handed to.
///
/// One attempt per call; any retry policy belongs to the implementation.
pub trait Submitter: Send + Sync {
    fn submit(
        &self,
        envelope: &SubmissionEnvelope,
    ) -> impl Future<Output = Result<SubmissionReceipt, AppError>> + Send;
}

/// Submitter that only logs the validated payload.
#[derive(Debug, Clone, Default)]
pub struct LoggingSubmitter {
    pretty: bool,
}

impl LoggingSubmitter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render(&self, payload: &Value) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(payload)
        } else {
            serde_json::to_string(payload)
        };
        rendered.unwrap_or_else(|_| payload.to_string())
    }
}

impl Submitter for LoggingSubmitter {
    async fn submit(&self, envelope: &SubmissionEnvelope) -> Result<SubmissionReceipt, AppError> {
        if !envelope.verify() {
            return Err(AppError::Submission(format!(
                "Payload checksum mismatch for session {}",
                envelope.session_id
            )));
        }

        tracing::info!(
            form = envelope.form.as_str(),
            session_id = %envelope.session_id,
            pstr_id = %envelope.pstr_id,
            checksum = %envelope.checksum,
            "✓ Validated submission"
        );
        tracing::info!("{}", self.render(&envelope.payload));

        Ok(SubmissionReceipt {
            reference: format!("{}-{}", envelope.form.as_str(), envelope.session_id),
            checksum: envelope.checksum.clone(),
            accepted_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_validation() {
        let envelope = SubmissionEnvelope::new(
            FormKind::Individual,
            Uuid::new_v4(),
            "00123456RA",
            &json!({"name": "Jane"}),
        )
        .unwrap();

        assert!(envelope.verify());
        assert_eq!(envelope.checksum.len(), 64);
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let mut envelope = SubmissionEnvelope::new(
            FormKind::Corporate,
            Uuid::new_v4(),
            "00123456RA",
            &json!({"schemeName": "Acme SSAS"}),
        )
        .unwrap();

        envelope.payload = json!({"schemeName": "Other SSAS"});
        assert!(!envelope.verify());
    }

    #[test]
    fn test_checksum_consistency() {
        let payload = json!({"a": 1, "b": [true, false]});
        let first = SubmissionEnvelope::new(FormKind::Corporate, Uuid::nil(), "x", &payload).unwrap();
        let second = SubmissionEnvelope::new(FormKind::Corporate, Uuid::nil(), "x", &payload).unwrap();

        assert_eq!(first.checksum, second.checksum);
    }

    #[tokio::test]
    async fn test_logging_submitter_returns_receipt() {
        let envelope = SubmissionEnvelope::new(
            FormKind::Individual,
            Uuid::nil(),
            "00123456RA",
            &json!({"employeeNumber": 1}),
        )
        .unwrap();

        let receipt = LoggingSubmitter::new(true).submit(&envelope).await.unwrap();

        assert_eq!(
            receipt.reference,
            "individual-00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(receipt.checksum, envelope.checksum);
    }
}
