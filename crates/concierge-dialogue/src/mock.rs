//! Mock collaborators for tests and offline runs.

use std::sync::Mutex;

use async_trait::async_trait;

use concierge_types::{AudioRef, CollaboratorError, TurnOutput};

use crate::contracts::{FeedbackSink, HumanHandoff, OutboundSink, Synthesizer};

/// Hand-off collaborator with a scripted queue length.
pub struct MockHandoff {
    queue_length: u32,
    fail: bool,
    enqueued: Mutex<Vec<(String, String)>>,
}

impl MockHandoff {
    pub fn new() -> Self {
        Self {
            queue_length: 0,
            fail: false,
            enqueued: Mutex::new(Vec::new()),
        }
    }

    pub fn with_queue_length(mut self, length: u32) -> Self {
        self.queue_length = length;
        self
    }

    /// Make both calls fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// (conversation_id, sector) pairs enqueued so far.
    pub fn enqueued(&self) -> Vec<(String, String)> {
        self.enqueued.lock().unwrap().clone()
    }
}

impl Default for MockHandoff {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HumanHandoff for MockHandoff {
    async fn enqueue(
        &self,
        conversation_id: &str,
        sector: &str,
    ) -> Result<(), CollaboratorError> {
        if self.fail {
            return Err(CollaboratorError::Unavailable("mock handoff".to_string()));
        }
        self.enqueued
            .lock()
            .unwrap()
            .push((conversation_id.to_string(), sector.to_string()));
        Ok(())
    }

    async fn queue_length(&self, _sector: &str) -> Result<u32, CollaboratorError> {
        if self.fail {
            return Err(CollaboratorError::Unavailable("mock handoff".to_string()));
        }
        Ok(self.queue_length)
    }
}

/// Feedback sink recording everything in memory.
pub struct MockFeedbackSink {
    fail: bool,
    scores: Mutex<Vec<(u8, String, String)>>,
    unanswered: Mutex<Vec<(String, String)>>,
}

impl MockFeedbackSink {
    pub fn new() -> Self {
        Self {
            fail: false,
            scores: Mutex::new(Vec::new()),
            unanswered: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// (score, comment, conversation_id) triples recorded so far.
    pub fn scores(&self) -> Vec<(u8, String, String)> {
        self.scores.lock().unwrap().clone()
    }

    /// (question, conversation_id) pairs recorded so far.
    pub fn unanswered(&self) -> Vec<(String, String)> {
        self.unanswered.lock().unwrap().clone()
    }
}

impl Default for MockFeedbackSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedbackSink for MockFeedbackSink {
    async fn record_nps(
        &self,
        score: u8,
        comment: &str,
        conversation_id: &str,
    ) -> Result<(), CollaboratorError> {
        if self.fail {
            return Err(CollaboratorError::Unavailable("mock feedback".to_string()));
        }
        self.scores.lock().unwrap().push((
            score,
            comment.to_string(),
            conversation_id.to_string(),
        ));
        Ok(())
    }

    async fn record_unanswered(
        &self,
        question: &str,
        conversation_id: &str,
    ) -> Result<(), CollaboratorError> {
        if self.fail {
            return Err(CollaboratorError::Unavailable("mock feedback".to_string()));
        }
        self.unanswered
            .lock()
            .unwrap()
            .push((question.to_string(), conversation_id.to_string()));
        Ok(())
    }
}

/// Outbound sink capturing delivered replies.
pub struct MockOutbound {
    delivered: Mutex<Vec<(String, TurnOutput)>>,
}

impl MockOutbound {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// (conversation_id, output) pairs delivered so far.
    pub fn delivered(&self) -> Vec<(String, TurnOutput)> {
        self.delivered.lock().unwrap().clone()
    }
}

impl Default for MockOutbound {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutboundSink for MockOutbound {
    async fn deliver(
        &self,
        conversation_id: &str,
        output: &TurnOutput,
    ) -> Result<(), CollaboratorError> {
        self.delivered
            .lock()
            .unwrap()
            .push((conversation_id.to_string(), output.clone()));
        Ok(())
    }
}

/// Synthesizer returning a fixed reference, or failing.
pub struct MockSynthesizer {
    fail: bool,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self { fail: false }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<AudioRef, CollaboratorError> {
        if self.fail {
            return Err(CollaboratorError::Unavailable("mock synthesizer".to_string()));
        }
        Ok(AudioRef(format!("audio:{}", text.len())))
    }
}
