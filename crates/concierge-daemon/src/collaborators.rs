//! Console-deployment collaborators.
//!
//! The console daemon has no transport, attendance queue, or feedback
//! spreadsheet behind it: replies print to stdout, hand-offs are logged,
//! and feedback lands in a local JSONL file.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::info;

use concierge_dialogue::{FeedbackSink, HumanHandoff, OutboundSink};
use concierge_types::{CollaboratorError, ReplyTag, TurnOutput};

/// Prints replies to stdout.
pub struct ConsoleOutbound;

#[async_trait]
impl OutboundSink for ConsoleOutbound {
    async fn deliver(
        &self,
        _conversation_id: &str,
        output: &TurnOutput,
    ) -> Result<(), CollaboratorError> {
        let tag = match output.tag {
            ReplyTag::Menu => "menu",
            ReplyTag::Answer => "answer",
            ReplyTag::Error => "error",
        };
        println!("\n[{tag}] {}\n", output.text);
        Ok(())
    }
}

/// Logs hand-off requests. There is no queue service on the console, so
/// length lookups report unavailable and the engine degrades to its vague
/// estimate.
pub struct LoggingHandoff;

#[async_trait]
impl HumanHandoff for LoggingHandoff {
    async fn enqueue(
        &self,
        conversation_id: &str,
        sector: &str,
    ) -> Result<(), CollaboratorError> {
        info!(conversation_id, sector, "Hand-off requested");
        Ok(())
    }

    async fn queue_length(&self, _sector: &str) -> Result<u32, CollaboratorError> {
        Err(CollaboratorError::Unavailable(
            "no queue service on the console".to_string(),
        ))
    }
}

/// Appends feedback records to a local JSONL file.
pub struct JsonlFeedbackSink {
    path: PathBuf,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum FeedbackRecord<'a> {
    Nps {
        timestamp: String,
        conversation_id: &'a str,
        score: u8,
        comment: &'a str,
    },
    Unanswered {
        timestamp: String,
        conversation_id: &'a str,
        question: &'a str,
    },
}

impl JsonlFeedbackSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn append(&self, record: &FeedbackRecord<'_>) -> Result<(), CollaboratorError> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| CollaboratorError::Unavailable(e.to_string()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| CollaboratorError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl FeedbackSink for JsonlFeedbackSink {
    async fn record_nps(
        &self,
        score: u8,
        comment: &str,
        conversation_id: &str,
    ) -> Result<(), CollaboratorError> {
        self.append(&FeedbackRecord::Nps {
            timestamp: Utc::now().to_rfc3339(),
            conversation_id,
            score,
            comment,
        })
        .await
    }

    async fn record_unanswered(
        &self,
        question: &str,
        conversation_id: &str,
    ) -> Result<(), CollaboratorError> {
        self.append(&FeedbackRecord::Unanswered {
            timestamp: Utc::now().to_rfc3339(),
            conversation_id,
            question,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_jsonl_sink_appends_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.jsonl");
        let sink = JsonlFeedbackSink::new(&path);

        sink.record_nps(5, "5 great", "user-1").await.unwrap();
        sink.record_unanswered("what is X?", "user-1").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"kind\":\"nps\""));
        assert!(lines[0].contains("\"score\":5"));
        assert!(lines[1].contains("\"kind\":\"unanswered\""));
        assert!(lines[1].contains("what is X?"));
    }
}
