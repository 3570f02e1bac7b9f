//! Tiered similarity search over the knowledge base.

use tracing::debug;

use concierge_knowledge::cosine_similarity;
use concierge_types::{CandidateAnswer, KnowledgeBase, RetrievalSettings, TopicEntries};

/// Confidence tier of a within-topic match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Score at or above the strong threshold. Answer directly.
    Strong,
    /// Score between the medium and strong thresholds. Answer, but the
    /// match may be approximate.
    Medium,
}

/// Result of one retrieval attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    /// The declared topic held a good enough match.
    Match {
        candidate: CandidateAnswer,
        tier: MatchTier,
    },
    /// The declared topic missed, but another topic cleared the global
    /// floor.
    Fallback { candidate: CandidateAnswer },
    /// Nothing in the base cleared any threshold.
    NoMatch,
}

/// Scores questions against knowledge entries and applies the tier rules.
///
/// The engine is pure: the question vector comes from the embedding
/// collaborator, the base from the knowledge store. Scores are cosine
/// similarity plus configured keyword bonuses, compared against three
/// thresholds: strong and medium inside the declared topic, and a separate
/// floor for the global fallback scan.
#[derive(Debug, Clone)]
pub struct RetrievalEngine {
    settings: RetrievalSettings,
}

impl RetrievalEngine {
    pub fn new(settings: RetrievalSettings) -> Self {
        Self { settings }
    }

    /// Score one entry: cosine similarity plus keyword bonuses.
    ///
    /// A bonus applies when the configured keyword appears in both the
    /// question and the entry text. Sector acronyms are near-invisible to
    /// the embedding model, so an exact mention is rewarded explicitly.
    fn score(&self, question_lower: &str, question_vec: &[f32], entry_text_lower: &str, embedding: &[f32]) -> f32 {
        let mut score = cosine_similarity(question_vec, embedding);
        for boost in &self.settings.keyword_boosts {
            let keyword = boost.keyword.to_lowercase();
            if !keyword.is_empty()
                && question_lower.contains(&keyword)
                && entry_text_lower.contains(&keyword)
            {
                score += boost.bonus;
            }
        }
        score
    }

    /// Best-scoring entry inside one topic, if the topic has entries.
    ///
    /// Ties keep the earliest entry, so results are stable across runs.
    pub fn best_in_topic(
        &self,
        question: &str,
        question_vec: &[f32],
        entries: &TopicEntries,
    ) -> Option<(usize, f32)> {
        let question_lower = question.to_lowercase();
        let mut best: Option<(usize, f32)> = None;

        for (index, entry) in entries.entries.iter().enumerate() {
            if entry.embedding.len() != question_vec.len() {
                continue;
            }
            let entry_text_lower = entry.combined_text().to_lowercase();
            let score = self.score(&question_lower, question_vec, &entry_text_lower, &entry.embedding);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((index, score)),
            }
        }

        best
    }

    /// Best score a topic can offer for this question, for topic duels.
    pub fn topic_score(
        &self,
        question: &str,
        question_vec: &[f32],
        base: &KnowledgeBase,
        topic: &str,
    ) -> Option<f32> {
        base.topic(topic)
            .and_then(|entries| self.best_in_topic(question, question_vec, entries))
            .map(|(_, score)| score)
    }

    /// Run the full tiered search for a question anchored to `topic`.
    pub fn search(
        &self,
        question: &str,
        question_vec: &[f32],
        topic: &str,
        base: &KnowledgeBase,
    ) -> RetrievalOutcome {
        if let Some(entries) = base.topic(topic) {
            if let Some((index, score)) = self.best_in_topic(question, question_vec, entries) {
                let tier = if score >= self.settings.strong_threshold {
                    Some(MatchTier::Strong)
                } else if score >= self.settings.medium_threshold {
                    Some(MatchTier::Medium)
                } else {
                    None
                };

                if let Some(tier) = tier {
                    debug!(topic, score, tier = ?tier, "Retrieval matched in declared topic");
                    return RetrievalOutcome::Match {
                        candidate: CandidateAnswer {
                            entry: entries.entries[index].clone(),
                            topic: topic.trim().to_string(),
                            score,
                        },
                        tier,
                    };
                }
            }
        }

        match self.global_best(question, question_vec, base, topic) {
            Some(candidate) => {
                debug!(
                    declared = topic,
                    found = %candidate.topic,
                    score = candidate.score,
                    "Retrieval fell back to global scan"
                );
                RetrievalOutcome::Fallback { candidate }
            }
            None => {
                debug!(topic, "Retrieval found no match");
                RetrievalOutcome::NoMatch
            }
        }
    }

    /// Scan every other topic for the best entry at or above the global
    /// floor.
    ///
    /// Topics are visited in lexicographic order and a later topic replaces
    /// the leader only on a strictly greater score, so equal scores resolve
    /// to the lexicographically first topic.
    fn global_best(
        &self,
        question: &str,
        question_vec: &[f32],
        base: &KnowledgeBase,
        skip_topic: &str,
    ) -> Option<CandidateAnswer> {
        let skip = skip_topic.trim();
        let mut best: Option<CandidateAnswer> = None;

        for (label, entries) in &base.topics {
            if label == skip {
                continue;
            }
            if let Some((index, score)) = self.best_in_topic(question, question_vec, entries) {
                if score < self.settings.global_floor {
                    continue;
                }
                let better = match &best {
                    Some(current) => score > current.score,
                    None => true,
                };
                if better {
                    best = Some(CandidateAnswer {
                        entry: entries.entries[index].clone(),
                        topic: label.clone(),
                        score,
                    });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_types::{KeywordBoost, KnowledgeEntry, TopicEntries};
    use std::collections::BTreeMap;

    fn entry(question: &str, embedding: Vec<f32>) -> KnowledgeEntry {
        KnowledgeEntry {
            question: question.to_string(),
            answer: format!("answer to {question}"),
            reference: None,
            sector: None,
            embedding,
        }
    }

    fn base(topics: Vec<(&str, Vec<KnowledgeEntry>)>) -> KnowledgeBase {
        let topics: BTreeMap<_, _> = topics
            .into_iter()
            .map(|(label, entries)| (label.to_string(), TopicEntries { entries }))
            .collect();
        KnowledgeBase::new(topics)
    }

    fn engine() -> RetrievalEngine {
        RetrievalEngine::new(RetrievalSettings::default())
    }

    #[test]
    fn test_strong_match_in_declared_topic() {
        let base = base(vec![(
            "Payroll",
            vec![entry("payday", vec![1.0, 0.0]), entry("payslip", vec![0.0, 1.0])],
        )]);

        let outcome = engine().search("when is payday", &[1.0, 0.0], "Payroll", &base);
        match outcome {
            RetrievalOutcome::Match { candidate, tier } => {
                assert_eq!(tier, MatchTier::Strong);
                assert_eq!(candidate.entry.question, "payday");
                assert!((candidate.score - 1.0).abs() < 0.001);
            }
            other => panic!("expected strong match, got {other:?}"),
        }
    }

    #[test]
    fn test_medium_match_in_declared_topic() {
        // cos(q, e) about 0.6: above medium (0.35), below strong (0.65).
        let base = base(vec![("Payroll", vec![entry("payday", vec![0.6, 0.8])])]);

        let outcome = engine().search("payday", &[1.0, 0.0], "Payroll", &base);
        match outcome {
            RetrievalOutcome::Match { tier, .. } => assert_eq!(tier, MatchTier::Medium),
            other => panic!("expected medium match, got {other:?}"),
        }
    }

    #[test]
    fn test_miss_falls_back_to_global_scan() {
        let base = base(vec![
            ("Benefits", vec![entry("dependents", vec![0.0, 1.0])]),
            ("Payroll", vec![entry("payday", vec![1.0, 0.0])]),
        ]);

        // Question matches Payroll but is asked under Benefits.
        let outcome = engine().search("payday", &[1.0, 0.0], "Benefits", &base);
        match outcome {
            RetrievalOutcome::Fallback { candidate } => {
                assert_eq!(candidate.topic, "Payroll");
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_global_scan_skips_declared_topic() {
        // The only entry is in the declared topic and below medium;
        // the global scan must not rediscover it.
        let base = base(vec![("Payroll", vec![entry("payday", vec![0.0, 1.0])])]);

        let outcome = engine().search("payday", &[1.0, 0.0], "Payroll", &base);
        assert_eq!(outcome, RetrievalOutcome::NoMatch);
    }

    #[test]
    fn test_global_floor_applies() {
        // cos = 0.3, below the 0.40 global floor.
        let base = base(vec![
            ("Benefits", vec![]),
            ("Payroll", vec![entry("payday", vec![0.3, (1.0f32 - 0.09).sqrt()])]),
        ]);

        let outcome = engine().search("payday", &[1.0, 0.0], "Benefits", &base);
        assert_eq!(outcome, RetrievalOutcome::NoMatch);
    }

    #[test]
    fn test_global_tie_keeps_first_topic() {
        let base = base(vec![
            ("Alpha", vec![entry("same", vec![1.0, 0.0])]),
            ("Beta", vec![entry("same", vec![1.0, 0.0])]),
            ("Declared", vec![]),
        ]);

        let outcome = engine().search("same", &[1.0, 0.0], "Declared", &base);
        match outcome {
            RetrievalOutcome::Fallback { candidate } => assert_eq!(candidate.topic, "Alpha"),
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_keyword_boost_lifts_score() {
        let settings = RetrievalSettings {
            keyword_boosts: vec![KeywordBoost {
                keyword: "BENE".to_string(),
                bonus: 0.25,
            }],
            ..Default::default()
        };
        let engine = RetrievalEngine::new(settings);

        let boosted = entry("BENE enrollment steps", vec![0.5, (1.0f32 - 0.25).sqrt()]);
        let plain = entry("enrollment steps", vec![0.5, (1.0f32 - 0.25).sqrt()]);
        let base = base(vec![("Benefits", vec![plain, boosted])]);

        let entries = base.topic("Benefits").unwrap();
        let (index, score) = engine
            .best_in_topic("how does BENE enrollment work", &[1.0, 0.0], entries)
            .unwrap();
        assert_eq!(index, 1);
        assert!(score > 0.7); // 0.5 cosine + 0.25 bonus
    }

    #[test]
    fn test_boost_requires_keyword_in_question() {
        let settings = RetrievalSettings {
            keyword_boosts: vec![KeywordBoost {
                keyword: "BENE".to_string(),
                bonus: 0.25,
            }],
            ..Default::default()
        };
        let engine = RetrievalEngine::new(settings);

        let base = base(vec![(
            "Benefits",
            vec![entry("BENE enrollment steps", vec![1.0, 0.0])],
        )]);
        let entries = base.topic("Benefits").unwrap();
        let (_, score) = engine
            .best_in_topic("how does enrollment work", &[1.0, 0.0], entries)
            .unwrap();
        assert!((score - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_dimension_mismatch_entries_skipped() {
        let base = base(vec![(
            "Payroll",
            vec![entry("stale", vec![1.0]), entry("fresh", vec![1.0, 0.0])],
        )]);
        let entries = base.topic("Payroll").unwrap();
        let (index, _) = engine().best_in_topic("q", &[1.0, 0.0], entries).unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn test_unknown_topic_goes_straight_to_global() {
        let base = base(vec![("Payroll", vec![entry("payday", vec![1.0, 0.0])])]);
        let outcome = engine().search("payday", &[1.0, 0.0], "Nonexistent", &base);
        assert!(matches!(outcome, RetrievalOutcome::Fallback { .. }));
    }
}
