//! Knowledge base loading from TOML files.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use concierge_embeddings::Embedder;
use concierge_types::{CollaboratorError, KnowledgeBase, KnowledgeEntry, TopicEntries};

/// Errors from loading or validating a knowledge base.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("failed to read knowledge file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse knowledge file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to embed knowledge entries: {0}")]
    Embedding(#[from] CollaboratorError),

    #[error("invalid knowledge file: {0}")]
    Invalid(String),
}

/// Loads the knowledge base the retrieval engine searches.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Load and embed the full knowledge base.
    async fn load(&self) -> Result<KnowledgeBase, KnowledgeError>;
}

#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    #[serde(default)]
    topics: Vec<TopicFile>,
}

#[derive(Debug, Deserialize)]
struct TopicFile {
    label: String,
    #[serde(default)]
    entries: Vec<EntryFile>,
}

#[derive(Debug, Deserialize)]
struct EntryFile {
    question: String,
    answer: String,
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    sector: Option<String>,
}

/// File-backed knowledge store.
///
/// Parses the curated TOML file, composes one embedding document per entry,
/// and batch-encodes all documents in a single embedder call.
pub struct TomlKnowledgeStore {
    path: PathBuf,
    embedder: Arc<dyn Embedder>,
    question_weight: usize,
}

impl TomlKnowledgeStore {
    /// Create a store reading from `path`.
    ///
    /// `question_weight` is how many times the question is repeated in the
    /// embedding document relative to one copy of the answer. Incoming
    /// questions are matched against question phrasing far more than answer
    /// wording, so the question dominates the vector.
    pub fn new(
        path: impl Into<PathBuf>,
        embedder: Arc<dyn Embedder>,
        question_weight: usize,
    ) -> Self {
        Self {
            path: path.into(),
            embedder,
            question_weight: question_weight.max(1),
        }
    }

    fn document_text(&self, entry: &EntryFile) -> String {
        let mut doc = String::new();
        for _ in 0..self.question_weight {
            doc.push_str(&entry.question);
            doc.push('\n');
        }
        doc.push_str(&entry.answer);
        doc
    }

    fn validate(file: &KnowledgeFile) -> Result<(), KnowledgeError> {
        if file.topics.is_empty() {
            return Err(KnowledgeError::Invalid("no topics defined".to_string()));
        }

        let mut seen = std::collections::BTreeSet::new();
        for topic in &file.topics {
            let label = topic.label.trim();
            if label.is_empty() {
                return Err(KnowledgeError::Invalid(
                    "topic with empty label".to_string(),
                ));
            }
            if !seen.insert(label.to_string()) {
                return Err(KnowledgeError::Invalid(format!(
                    "duplicate topic label: {label}"
                )));
            }
            for entry in &topic.entries {
                if entry.question.trim().is_empty() || entry.answer.trim().is_empty() {
                    return Err(KnowledgeError::Invalid(format!(
                        "topic {label} has an entry with an empty question or answer"
                    )));
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl KnowledgeStore for TomlKnowledgeStore {
    async fn load(&self) -> Result<KnowledgeBase, KnowledgeError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let file: KnowledgeFile = toml::from_str(&raw)?;
        Self::validate(&file)?;

        // One batch across every topic: the embedder call dominates load
        // time, and per-topic batches would multiply it.
        let mut documents = Vec::new();
        for topic in &file.topics {
            for entry in &topic.entries {
                documents.push(self.document_text(entry));
            }
        }
        let mut vectors = self.embedder.encode_batch(&documents).await?.into_iter();

        let mut topics = BTreeMap::new();
        for topic in file.topics {
            let mut entries = Vec::with_capacity(topic.entries.len());
            for entry in topic.entries {
                let embedding = vectors.next().ok_or_else(|| {
                    KnowledgeError::Invalid("embedder returned short batch".to_string())
                })?;
                entries.push(KnowledgeEntry {
                    question: entry.question,
                    answer: entry.answer,
                    reference: entry.reference,
                    sector: entry.sector,
                    embedding,
                });
            }
            topics.insert(topic.label.trim().to_string(), TopicEntries { entries });
        }

        let base = KnowledgeBase::new(topics);
        info!(
            path = %self.path.display(),
            topics = base.topics.len(),
            entries = base.entry_count(),
            "Knowledge base loaded"
        );

        Ok(base)
    }
}
