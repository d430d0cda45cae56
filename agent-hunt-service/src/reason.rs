//! Validation of the free-text reason attached to an action.
//!
//! An upvote must say why, a spam flag may, and both are bounded in length.
//! A duplicate flag must carry a link to the original listing on this site.

use agent_hunt_shared::types::{ActionKind, AgentId};
use regex::Regex;

use crate::errors::ServiceError;

/// A reason that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidReason {
    /// Trimmed text to store, `None` when no reason was given.
    pub text: Option<String>,
    /// Agent a duplicate flag points at.
    pub original: Option<AgentId>,
}

#[derive(Debug, Clone)]
pub struct ReasonPolicy {
    agent_link: Regex,
    max_len: usize,
}

impl ReasonPolicy {
    /// Builds a policy accepting duplicate links of the form
    /// `[http[s]://]<site host>/agents/<id>`.
    pub fn new(site_url: &str, max_len: usize) -> Result<Self, ServiceError> {
        let host = site_url
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        if host.is_empty() {
            return Err(ServiceError::Configuration(format!(
                "site url has no host: {site_url:?}"
            )));
        }

        let pattern = format!(r"^(?:https?://)?{}/agents/(\d+)$", regex::escape(host));
        let agent_link = Regex::new(&pattern)
            .map_err(|e| ServiceError::Configuration(format!("invalid agent link pattern: {e}")))?;
        Ok(Self { agent_link, max_len })
    }

    /// Extracts the agent id from a link to its listing page.
    pub fn parse_agent_link(&self, link: &str) -> Option<AgentId> {
        self.agent_link
            .captures(link.trim())
            .and_then(|caps| caps.get(1))
            .and_then(|id| id.as_str().parse().ok())
    }

    /// Validates `reason` for an action of `kind`.
    ///
    /// Existence of the referenced original is checked by the ledger, which
    /// owns the agent repository.
    pub fn validate(&self, kind: ActionKind, reason: Option<&str>) -> Result<ValidReason, ServiceError> {
        let text = reason.map(str::trim).filter(|text| !text.is_empty());

        match kind {
            ActionKind::DuplicateFlag => {
                let link = text.ok_or_else(|| {
                    ServiceError::invalid_reason("a duplicate flag requires a link to the original agent")
                })?;
                let original = self.parse_agent_link(link).ok_or_else(|| {
                    ServiceError::invalid_reason(format!("not a link to an agent on this site: {link}"))
                })?;
                Ok(ValidReason {
                    text: Some(link.to_string()),
                    original: Some(original),
                })
            }
            ActionKind::Upvote | ActionKind::SpamFlag => {
                if kind == ActionKind::Upvote && text.is_none() {
                    return Err(ServiceError::invalid_reason("an upvote requires a reason"));
                }
                if let Some(text) = text {
                    if text.chars().count() > self.max_len {
                        return Err(ServiceError::invalid_reason(format!(
                            "reason must be at most {} characters",
                            self.max_len
                        )));
                    }
                }
                Ok(ValidReason {
                    text: text.map(str::to_string),
                    original: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ReasonPolicy {
        ReasonPolicy::new("https://agenthunt.example.com/", 280).unwrap()
    }

    #[test]
    fn test_parse_agent_link() {
        let policy = policy();
        assert_eq!(policy.parse_agent_link("https://agenthunt.example.com/agents/42"), Some(42));
        assert_eq!(policy.parse_agent_link("http://agenthunt.example.com/agents/7"), Some(7));
        assert_eq!(policy.parse_agent_link("agenthunt.example.com/agents/7"), Some(7));
        assert_eq!(policy.parse_agent_link("https://other.example.com/agents/7"), None);
        assert_eq!(policy.parse_agent_link("https://agenthunt.example.com/agents/abc"), None);
        assert_eq!(policy.parse_agent_link("https://agenthuntXexample.com/agents/1"), None);
    }

    #[test]
    fn test_duplicate_requires_link() {
        let policy = policy();
        assert!(matches!(
            policy.validate(ActionKind::DuplicateFlag, None),
            Err(ServiceError::InvalidReason(_))
        ));
        assert!(matches!(
            policy.validate(ActionKind::DuplicateFlag, Some("same as the other one")),
            Err(ServiceError::InvalidReason(_))
        ));

        let valid = policy
            .validate(ActionKind::DuplicateFlag, Some(" https://agenthunt.example.com/agents/3 "))
            .unwrap();
        assert_eq!(valid.original, Some(3));
        assert_eq!(valid.text.as_deref(), Some("https://agenthunt.example.com/agents/3"));
    }

    #[test]
    fn test_free_text_length() {
        let policy = policy();
        let at_limit = "a".repeat(280);
        let over_limit = "a".repeat(281);

        assert!(policy.validate(ActionKind::SpamFlag, Some(&at_limit)).is_ok());
        assert!(matches!(
            policy.validate(ActionKind::Upvote, Some(&over_limit)),
            Err(ServiceError::InvalidReason(_))
        ));
    }

    #[test]
    fn test_upvote_requires_reason() {
        let policy = policy();
        for reason in [None, Some(""), Some("   ")] {
            assert!(matches!(
                policy.validate(ActionKind::Upvote, reason),
                Err(ServiceError::InvalidReason(_))
            ));
        }
    }

    #[test]
    fn test_spam_reason_is_optional() {
        let policy = policy();
        let valid = policy.validate(ActionKind::SpamFlag, Some("   ")).unwrap();
        assert_eq!(valid, ValidReason { text: None, original: None });
        assert!(policy.validate(ActionKind::SpamFlag, None).is_ok());
    }

    #[test]
    fn test_site_without_host() {
        assert!(matches!(
            ReasonPolicy::new("https://", 280),
            Err(ServiceError::Configuration(_))
        ));
    }
}
