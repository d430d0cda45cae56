//! Configuration types for the service components.

use chrono::Duration;

/// Default number of agents per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Default maximum length of a free-text reason.
pub const DEFAULT_MAX_REASON_LEN: usize = 280;

/// Quotas enforced by the rate limiter over a trailing window.
///
/// A quota of `None` disables that limit.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Agents an identity may create per window. Defaults to 5.
    pub creation_quota: Option<u32>,
    /// Upvotes and flags an identity may add per window. Defaults to 10.
    pub action_quota: Option<u32>,
    /// Length of the trailing window. Defaults to 24 hours.
    pub window: Duration,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            creation_quota: Some(5),
            action_quota: Some(10),
            window: Duration::hours(24),
        }
    }
}

impl LimitsConfig {
    /// A config with both quotas disabled.
    pub fn unlimited() -> Self {
        Self {
            creation_quota: None,
            action_quota: None,
            ..Self::default()
        }
    }

    pub fn with_creation_quota(mut self, quota: Option<u32>) -> Self {
        self.creation_quota = quota;
        self
    }

    pub fn with_action_quota(mut self, quota: Option<u32>) -> Self {
        self.action_quota = quota;
        self
    }
}

/// Configuration for the listing query engine.
#[derive(Debug, Clone)]
pub struct ListingConfig {
    pub page_size: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListingConfig {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }
}

/// Everything needed to assemble the service components.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub limits: LimitsConfig,
    pub listing: ListingConfig,
    /// Canonical site URL; duplicate flags must link to `<site>/agents/<id>`.
    pub site_url: String,
    pub max_reason_len: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            limits: LimitsConfig::default(),
            listing: ListingConfig::default(),
            site_url: "http://localhost:3000".to_string(),
            max_reason_len: DEFAULT_MAX_REASON_LEN,
        }
    }
}
