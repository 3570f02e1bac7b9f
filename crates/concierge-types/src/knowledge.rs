//! Knowledge base structures.
//!
//! Entries are grouped by topic and immutable after load. Reloading replaces
//! the whole structure atomically so readers never observe a partially
//! updated topic.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// One row of the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Canonical phrasing of the question this entry answers.
    pub question: String,

    /// Raw answer text, before humanization.
    pub answer: String,

    /// Optional legal or authoritative reference backing the answer.
    #[serde(default)]
    pub reference: Option<String>,

    /// Optional label of the sector responsible for the subject.
    #[serde(default)]
    pub sector: Option<String>,

    /// Precomputed embedding of the entry's document text.
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl KnowledgeEntry {
    /// Combined searchable text: question plus answer.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.question, self.answer)
    }
}

/// The ordered entries of one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TopicEntries {
    /// Entries in load order; each carries its own embedding vector.
    pub entries: Vec<KnowledgeEntry>,
}

impl TopicEntries {
    /// Number of entries under this topic.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the topic has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Topic-grouped knowledge entries with their stacked vectors.
///
/// Topics are keyed in a `BTreeMap` so that every cross-topic scan iterates
/// in lexicographic order; ties between equally scored topics therefore
/// resolve deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KnowledgeBase {
    /// Topic label to its entries.
    pub topics: BTreeMap<String, TopicEntries>,
}

impl KnowledgeBase {
    /// Build a knowledge base from topic/entries pairs.
    pub fn new(topics: BTreeMap<String, TopicEntries>) -> Self {
        Self { topics }
    }

    /// All topic labels in lexicographic order.
    pub fn topic_labels(&self) -> Vec<&str> {
        self.topics.keys().map(String::as_str).collect()
    }

    /// Entries for a topic, if the topic exists. Labels are matched after
    /// trimming surrounding whitespace on the lookup key.
    pub fn topic(&self, label: &str) -> Option<&TopicEntries> {
        self.topics.get(label.trim())
    }

    /// Total number of entries across all topics.
    pub fn entry_count(&self) -> usize {
        self.topics.values().map(TopicEntries::len).sum()
    }
}

/// Transient result of a retrieval attempt: the winning entry plus its
/// similarity score. Scores may exceed 1.0 after keyword boosting and are a
/// ranking signal, not a probability. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateAnswer {
    /// The entry that won the similarity argmax.
    pub entry: KnowledgeEntry,

    /// Topic the entry was found under.
    pub topic: String,

    /// Boosted cosine similarity score.
    pub score: f32,
}

/// Shared handle to the current knowledge base.
///
/// Cloning the handle is cheap; `current()` yields an immutable snapshot and
/// `replace()` swaps in a freshly loaded base wholesale. The inner lock is
/// held only long enough to clone or swap the `Arc`.
#[derive(Debug, Clone, Default)]
pub struct SharedKnowledge {
    inner: Arc<RwLock<Arc<KnowledgeBase>>>,
}

impl SharedKnowledge {
    /// Wrap a freshly loaded knowledge base.
    pub fn new(base: KnowledgeBase) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(base))),
        }
    }

    /// Snapshot of the current base. Later replacements do not affect the
    /// returned snapshot.
    pub fn current(&self) -> Arc<KnowledgeBase> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Swap in a new base. In-flight readers keep their old snapshot.
    pub fn replace(&self, base: KnowledgeBase) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(base);
    }
}
