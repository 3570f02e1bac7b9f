//! # concierge-llm
//!
//! Language model collaborators for the Concierge engine.
//!
//! The engine delegates four judgment calls to a language model behind the
//! [`LanguageModel`] trait:
//! - **classify**: map a free-text question onto one of the curated topic
//!   labels (or decline)
//! - **check_privacy**: flag questions carrying personal data
//! - **rewrite**: rephrase a stored answer conversationally without adding
//!   facts
//! - **verify**: audit whether a reply actually addresses the question
//!
//! [`ApiModel`] talks to an OpenAI-compatible chat endpoint; [`MockModel`]
//! scripts responses for tests.

pub mod api;
pub mod mask;
pub mod mock;
pub mod model;
pub mod prompts;

pub use api::{ApiModel, ApiModelConfig};
pub use mask::mask_sensitive;
pub use mock::MockModel;
pub use model::{match_topic_label, LanguageModel, RewriteContext, Safety, Verdict};
