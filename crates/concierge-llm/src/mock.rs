//! Scripted language model for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use concierge_types::CollaboratorError;

use crate::model::{LanguageModel, RewriteContext, Safety, Verdict};

/// Language model with scripted responses and call recording.
///
/// Each judgment call can be scripted independently; unscripted calls fall
/// back to permissive defaults (no classification, safe, echo the raw
/// answer, approve). Any call can be switched to fail to exercise
/// degradation paths.
pub struct MockModel {
    classify_response: Mutex<Option<Option<String>>>,
    privacy_response: Mutex<Option<Safety>>,
    rewrite_response: Mutex<Option<String>>,
    verify_response: Mutex<Option<Verdict>>,
    fail_classify: bool,
    fail_privacy: bool,
    fail_rewrite: bool,
    fail_verify: bool,
    classify_calls: Mutex<Vec<String>>,
    rewrite_calls: Mutex<Vec<String>>,
    verify_calls: Mutex<Vec<(String, String)>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self {
            classify_response: Mutex::new(None),
            privacy_response: Mutex::new(None),
            rewrite_response: Mutex::new(None),
            verify_response: Mutex::new(None),
            fail_classify: false,
            fail_privacy: false,
            fail_rewrite: false,
            fail_verify: false,
            classify_calls: Mutex::new(Vec::new()),
            rewrite_calls: Mutex::new(Vec::new()),
            verify_calls: Mutex::new(Vec::new()),
        }
    }

    /// Script the classification result.
    pub fn with_classification(self, label: Option<&str>) -> Self {
        *self.classify_response.lock().unwrap() = Some(label.map(|s| s.to_string()));
        self
    }

    /// Script the privacy screen result.
    pub fn with_privacy(self, safety: Safety) -> Self {
        *self.privacy_response.lock().unwrap() = Some(safety);
        self
    }

    /// Script the rewrite output.
    pub fn with_rewrite(self, text: &str) -> Self {
        *self.rewrite_response.lock().unwrap() = Some(text.to_string());
        self
    }

    /// Script the verification verdict.
    pub fn with_verdict(self, verdict: Verdict) -> Self {
        *self.verify_response.lock().unwrap() = Some(verdict);
        self
    }

    /// Make classification calls fail.
    pub fn failing_classify(mut self) -> Self {
        self.fail_classify = true;
        self
    }

    /// Make privacy calls fail.
    pub fn failing_privacy(mut self) -> Self {
        self.fail_privacy = true;
        self
    }

    /// Make rewrite calls fail.
    pub fn failing_rewrite(mut self) -> Self {
        self.fail_rewrite = true;
        self
    }

    /// Make verification calls fail.
    pub fn failing_verify(mut self) -> Self {
        self.fail_verify = true;
        self
    }

    /// Questions passed to `classify` so far.
    pub fn classify_calls(&self) -> Vec<String> {
        self.classify_calls.lock().unwrap().clone()
    }

    /// Raw answers passed to `rewrite` so far.
    pub fn rewrite_calls(&self) -> Vec<String> {
        self.rewrite_calls.lock().unwrap().clone()
    }

    /// (question, answer) pairs passed to `verify` so far.
    pub fn verify_calls(&self) -> Vec<(String, String)> {
        self.verify_calls.lock().unwrap().clone()
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn classify(
        &self,
        question: &str,
        _labels: &[String],
    ) -> Result<Option<String>, CollaboratorError> {
        self.classify_calls
            .lock()
            .unwrap()
            .push(question.to_string());
        if self.fail_classify {
            return Err(CollaboratorError::Unavailable("mock classify".to_string()));
        }
        Ok(self
            .classify_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(None))
    }

    async fn check_privacy(&self, _question: &str) -> Result<Safety, CollaboratorError> {
        if self.fail_privacy {
            return Err(CollaboratorError::Unavailable("mock privacy".to_string()));
        }
        Ok(self
            .privacy_response
            .lock()
            .unwrap()
            .unwrap_or(Safety::Safe))
    }

    async fn rewrite(
        &self,
        raw_answer: &str,
        _question: &str,
        _context: &RewriteContext,
    ) -> Result<String, CollaboratorError> {
        self.rewrite_calls
            .lock()
            .unwrap()
            .push(raw_answer.to_string());
        if self.fail_rewrite {
            return Err(CollaboratorError::Unavailable("mock rewrite".to_string()));
        }
        Ok(self
            .rewrite_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| raw_answer.to_string()))
    }

    async fn verify(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<Verdict, CollaboratorError> {
        self.verify_calls
            .lock()
            .unwrap()
            .push((question.to_string(), answer.to_string()));
        if self.fail_verify {
            return Err(CollaboratorError::Unavailable("mock verify".to_string()));
        }
        Ok(self
            .verify_response
            .lock()
            .unwrap()
            .unwrap_or(Verdict::Approved))
    }
}
