//! Human hand-off.

use std::sync::Arc;

use tracing::{info, warn};

use crate::contracts::HumanHandoff;
use crate::messages;

/// Escalates a conversation to a human agent and estimates the wait.
pub struct EscalationManager {
    handoff: Arc<dyn HumanHandoff>,
    default_sector: String,
}

impl EscalationManager {
    pub fn new(handoff: Arc<dyn HumanHandoff>, default_sector: impl Into<String>) -> Self {
        Self {
            handoff,
            default_sector: default_sector.into(),
        }
    }

    /// Enqueue the conversation for its sector and return the hand-off
    /// message with a coarse queue-time estimate.
    ///
    /// Neither collaborator call can fail the turn: a failed enqueue is
    /// logged (the agent team monitors the queue out of band) and a failed
    /// length lookup degrades to a vague estimate.
    pub async fn escalate(&self, conversation_id: &str, sector_label: Option<&str>) -> String {
        let sector = routing_sector(sector_label, &self.default_sector);
        info!(conversation_id, sector = %sector, "Escalating to human agent");

        if let Err(e) = self.handoff.enqueue(conversation_id, &sector).await {
            warn!(error = %e, sector = %sector, "Hand-off enqueue failed");
        }

        let estimate = match self.handoff.queue_length(&sector).await {
            Ok(length) => messages::queue_estimate(length),
            Err(e) => {
                warn!(error = %e, sector = %sector, "Queue length unavailable");
                messages::QUEUE_ESTIMATE_UNKNOWN
            }
        };

        messages::escalation_message(estimate)
    }
}

/// The sector the hand-off queue is keyed by.
///
/// Menu sector labels carry a parenthesized acronym ("Billing (SEFAT)");
/// the queue is keyed by the acronym when one is present, else by the
/// whole label, else by the configured default.
fn routing_sector(label: Option<&str>, default_sector: &str) -> String {
    let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) else {
        return default_sector.to_string();
    };

    if let (Some(open), Some(close)) = (label.rfind('('), label.rfind(')')) {
        if open < close {
            let acronym = label[open + 1..close].trim();
            if !acronym.is_empty() {
                return acronym.to_string();
            }
        }
    }

    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHandoff;

    #[test]
    fn test_routing_sector_extracts_acronym() {
        assert_eq!(routing_sector(Some("Billing (SEFAT)"), "General"), "SEFAT");
        assert_eq!(routing_sector(Some("Benefits"), "General"), "Benefits");
        assert_eq!(routing_sector(Some("  "), "General"), "General");
        assert_eq!(routing_sector(None, "General"), "General");
        assert_eq!(routing_sector(Some("Odd ()"), "General"), "Odd ()");
    }

    #[tokio::test]
    async fn test_escalate_reports_queue_band() {
        let handoff = Arc::new(MockHandoff::new().with_queue_length(4));
        let manager = EscalationManager::new(handoff.clone(), "General");

        let message = manager.escalate("user-1", Some("Billing (SEFAT)")).await;
        assert!(message.contains("15 to 30 minutes"));
        assert_eq!(handoff.enqueued(), vec![("user-1".to_string(), "SEFAT".to_string())]);
    }

    #[tokio::test]
    async fn test_queue_failure_degrades_to_vague_estimate() {
        let handoff = Arc::new(MockHandoff::new().failing());
        let manager = EscalationManager::new(handoff, "General");

        let message = manager.escalate("user-1", None).await;
        assert!(message.contains("a few minutes"));
    }
}
