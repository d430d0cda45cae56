//! Agent submissions.
//!
//! An agent is written once: the avatar goes to the blob store first and the
//! row is inserted only after the upload succeeded. A failed upload leaves
//! no row behind; a failed insert may leave an orphaned object.

use std::sync::Arc;

use agent_hunt_repository::AgentsRepository;
use agent_hunt_shared::types::{Agent, NewAgent, Skill};
use blob_store::BlobStore;
use chrono::Utc;
use tracing::{info, warn};
use url::Url;

use crate::errors::ServiceError;
use crate::identity::IdentityResolver;
use crate::rate_limiter::{QuotaKind, RateLimiter};

/// Largest accepted avatar upload.
pub const MAX_AVATAR_BYTES: usize = 3 * 1024 * 1024;

const DEFAULT_AVATAR_CONTENT_TYPE: &str = "image/jpeg";

/// An uploaded avatar file.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Raw form fields of a submission, before validation.
#[derive(Debug, Clone, Default)]
pub struct AgentSubmission {
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub why_hunt: Option<String>,
    pub skill: Option<String>,
    pub other_skill_detail: Option<String>,
    pub avatar: Option<AvatarUpload>,
    /// Avatar reference used when no file is uploaded.
    pub fallback_avatar_ref: Option<String>,
    pub author_address: Option<String>,
}

enum AvatarSource {
    Upload(AvatarUpload),
    Reference(String),
}

struct ValidSubmission {
    name: String,
    url: String,
    description: String,
    why_hunt: String,
    skill: Skill,
    other_skill_detail: Option<String>,
    avatar: AvatarSource,
    author_address: String,
}

pub struct AgentRegistry {
    identities: IdentityResolver,
    agents: Arc<dyn AgentsRepository>,
    limiter: Arc<RateLimiter>,
    blobs: Arc<dyn BlobStore>,
}

impl AgentRegistry {
    pub fn new(
        identities: IdentityResolver,
        agents: Arc<dyn AgentsRepository>,
        limiter: Arc<RateLimiter>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            identities,
            agents,
            limiter,
            blobs,
        }
    }

    /// Validates and stores a new agent.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - a required field, the author or the avatar is
    ///   missing, or a field is malformed
    /// * `QuotaExceeded` - the author reached the creation quota
    /// * `BlobStore` - the avatar upload failed; nothing was written
    pub async fn create_agent(&self, submission: AgentSubmission) -> Result<Agent, ServiceError> {
        let valid = validate(submission)?;

        let author = self.identities.resolve(Some(&valid.author_address)).await?;
        self.limiter.ensure_quota(&author, QuotaKind::Create).await?;

        let avatar_url = match valid.avatar {
            AvatarSource::Upload(upload) => {
                let key = avatar_key(Utc::now().timestamp_millis(), &upload.file_name);
                let content_type = upload
                    .content_type
                    .as_deref()
                    .filter(|ct| !ct.trim().is_empty())
                    .unwrap_or(DEFAULT_AVATAR_CONTENT_TYPE)
                    .to_string();
                self.blobs
                    .put(&key, upload.bytes, &content_type)
                    .await
                    .inspect_err(|e| warn!(key = %key, error = %e, "Avatar upload failed"))?
            }
            AvatarSource::Reference(reference) => reference,
        };

        let agent = self
            .agents
            .insert_agent(&NewAgent {
                name: valid.name,
                avatar_url,
                url: valid.url,
                description: valid.description,
                why_hunt: valid.why_hunt,
                skill: valid.skill,
                other_skill_detail: valid.other_skill_detail,
                author_id: author.id,
                created_at: Utc::now(),
            })
            .await?;

        info!(agent_id = agent.id, author = %author.address, skill = agent.skill.as_str(), "Agent created");
        Ok(agent)
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate(submission: AgentSubmission) -> Result<ValidSubmission, ServiceError> {
    let mut missing = Vec::new();
    let mut require = |field: &'static str, value: Option<String>| {
        let value = present(value);
        if value.is_none() {
            missing.push(field);
        }
        value.unwrap_or_default()
    };

    let name = require("name", submission.name);
    let url = require("url", submission.url);
    let description = require("description", submission.description);
    let why_hunt = require("whyHunt", submission.why_hunt);
    let skill = require("skill", submission.skill);
    let author_address = require("authorAddress", submission.author_address);

    let avatar = match (
        submission.avatar.filter(|upload| !upload.bytes.is_empty()),
        present(submission.fallback_avatar_ref),
    ) {
        (Some(upload), _) => Some(AvatarSource::Upload(upload)),
        (None, Some(reference)) => Some(AvatarSource::Reference(reference)),
        (None, None) => {
            missing.push("avatar");
            None
        }
    };

    let Some(avatar) = avatar.filter(|_| missing.is_empty()) else {
        return Err(ServiceError::invalid_argument(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    };

    if let AvatarSource::Upload(upload) = &avatar {
        if upload.bytes.len() > MAX_AVATAR_BYTES {
            return Err(ServiceError::invalid_argument(format!(
                "avatar exceeds {} bytes",
                MAX_AVATAR_BYTES
            )));
        }
    }

    let skill = skill
        .parse::<Skill>()
        .map_err(|e| ServiceError::invalid_argument(e.to_string()))?;
    let other_skill_detail = present(submission.other_skill_detail);
    if skill.requires_detail() && other_skill_detail.is_none() {
        return Err(ServiceError::invalid_argument(
            "otherSkillDetail is required when skill is OTHER",
        ));
    }

    Ok(ValidSubmission {
        name,
        url: check_agent_url(&url)?,
        description,
        why_hunt,
        skill,
        other_skill_detail: other_skill_detail.filter(|_| skill.requires_detail()),
        avatar,
        author_address,
    })
}

/// Accepts `https://host/...`, `http://host/...` or a bare `host/...` whose
/// host contains a dot. The value is stored as given.
fn check_agent_url(raw: &str) -> Result<String, ServiceError> {
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    let invalid = || ServiceError::invalid_argument(format!("invalid agent url: {raw}"));
    let parsed = Url::parse(&with_scheme).map_err(|_| invalid())?;
    match parsed.host_str() {
        Some(host)
            if host.contains('.')
                && !host.starts_with('.')
                && !host.ends_with('.') =>
        {
            Ok(raw.to_string())
        }
        _ => Err(invalid()),
    }
}

/// Object key for an uploaded avatar: `avatars/agent-<millis>-<file name>`.
fn avatar_key(millis: i64, file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let sanitized = sanitized.trim_matches('.');
    let sanitized = if sanitized.is_empty() { "avatar" } else { sanitized };
    format!("avatars/agent-{millis}-{sanitized}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitsConfig;
    use crate::test_support::Fixture;

    fn submission() -> AgentSubmission {
        AgentSubmission {
            name: Some("Scout".to_string()),
            url: Some("scout.example.com/bot".to_string()),
            description: Some("Finds alpha".to_string()),
            why_hunt: Some("It is fast".to_string()),
            skill: Some("research".to_string()),
            other_skill_detail: None,
            avatar: Some(AvatarUpload {
                file_name: "my avatar.png".to_string(),
                content_type: Some("image/png".to_string()),
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
            }),
            fallback_avatar_ref: None,
            author_address: Some("0xauthor".to_string()),
        }
    }

    #[test]
    fn test_avatar_key() {
        assert_eq!(avatar_key(1700, "my avatar.png"), "avatars/agent-1700-my-avatar.png");
        assert_eq!(avatar_key(1700, "../../etc/passwd"), "avatars/agent-1700-passwd");
        assert_eq!(avatar_key(1700, "C:\\pics\\me.jpg"), "avatars/agent-1700-me.jpg");
        assert_eq!(avatar_key(1700, ""), "avatars/agent-1700-avatar");
    }

    #[test]
    fn test_check_agent_url() {
        assert!(check_agent_url("https://scout.example.com").is_ok());
        assert!(check_agent_url("scout.example.com/bot").is_ok());
        assert!(check_agent_url("http://localhost:8080").is_err());
        assert!(check_agent_url("not a url").is_err());
        assert!(check_agent_url("ftp://scout.example.com").is_err());
    }

    #[tokio::test]
    async fn test_create_uploads_then_inserts() {
        let fixture = Fixture::new();

        let agent = fixture
            .services
            .registry
            .create_agent(submission())
            .await
            .unwrap();

        assert_eq!(agent.name, "Scout");
        assert_eq!(agent.skill, Skill::Research);
        assert_eq!(agent.url, "scout.example.com/bot");
        assert!(agent.avatar_url.starts_with("http://localhost/blobs/avatars/agent-"));
        assert!(agent.avatar_url.ends_with("-my-avatar.png"));
        assert_eq!(fixture.blobs.len(), 1);

        let stored = fixture.services.listing.get_agent(agent.id, None).await.unwrap();
        assert_eq!(stored.author.address, "0xauthor");
    }

    #[tokio::test]
    async fn test_default_content_type() {
        let fixture = Fixture::new();
        let mut request = submission();
        if let Some(avatar) = request.avatar.as_mut() {
            avatar.content_type = None;
        }

        let agent = fixture.services.registry.create_agent(request).await.unwrap();
        let key = agent
            .avatar_url
            .trim_start_matches("http://localhost/blobs/")
            .to_string();
        let object = fixture.blobs.object(&key).unwrap();
        assert_eq!(object.content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_fallback_avatar_only_without_upload() {
        let fixture = Fixture::new();

        let mut with_both = submission();
        with_both.fallback_avatar_ref = Some("/avatars/default.svg".to_string());
        let uploaded = fixture.services.registry.create_agent(with_both).await.unwrap();
        assert_ne!(uploaded.avatar_url, "/avatars/default.svg");

        let mut fallback_only = submission();
        fallback_only.avatar = None;
        fallback_only.fallback_avatar_ref = Some("/avatars/default.svg".to_string());
        let agent = fixture.services.registry.create_agent(fallback_only).await.unwrap();
        assert_eq!(agent.avatar_url, "/avatars/default.svg");
        assert_eq!(fixture.blobs.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let fixture = Fixture::new();
        let mut request = submission();
        request.name = Some("  ".to_string());
        request.avatar = None;
        request.author_address = None;

        match fixture.services.registry.create_agent(request).await {
            Err(ServiceError::InvalidArgument(msg)) => {
                assert!(msg.contains("name"));
                assert!(msg.contains("authorAddress"));
                assert!(msg.contains("avatar"));
            }
            other => panic!("Expected InvalidArgument, got {other:?}"),
        }
        assert_eq!(fixture.store.agent_count().await, 0);
    }

    #[tokio::test]
    async fn test_other_skill_requires_detail() {
        let fixture = Fixture::new();
        let mut request = submission();
        request.skill = Some("OTHER".to_string());

        assert!(matches!(
            fixture.services.registry.create_agent(request.clone()).await,
            Err(ServiceError::InvalidArgument(_))
        ));

        request.other_skill_detail = Some("Memes".to_string());
        let agent = fixture.services.registry.create_agent(request).await.unwrap();
        assert_eq!(agent.skill, Skill::Other);
        assert_eq!(agent.other_skill_detail.as_deref(), Some("Memes"));
    }

    #[tokio::test]
    async fn test_unknown_skill_rejected() {
        let fixture = Fixture::new();
        let mut request = submission();
        request.skill = Some("MEMES".to_string());

        let result = fixture.services.registry.create_agent(request).await;
        assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
        assert_eq!(fixture.store.agent_count().await, 0);
        assert!(fixture.blobs.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_avatar_rejected() {
        let fixture = Fixture::new();
        let mut request = submission();
        if let Some(avatar) = request.avatar.as_mut() {
            avatar.bytes = vec![0; MAX_AVATAR_BYTES + 1];
        }

        assert!(matches!(
            fixture.services.registry.create_agent(request).await,
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(fixture.blobs.is_empty());
    }

    #[tokio::test]
    async fn test_blob_failure_writes_no_row() {
        let fixture = Fixture::new();
        fixture.blobs.set_failing(true);

        let result = fixture.services.registry.create_agent(submission()).await;
        assert!(matches!(result, Err(ServiceError::BlobStore(_))));
        assert_eq!(fixture.store.agent_count().await, 0);
    }

    #[tokio::test]
    async fn test_creation_quota() {
        let fixture = Fixture::with_limits(LimitsConfig::default().with_creation_quota(Some(2)));
        let registry = &fixture.services.registry;

        registry.create_agent(submission()).await.unwrap();
        registry.create_agent(submission()).await.unwrap();
        let third = registry.create_agent(submission()).await;

        assert!(matches!(
            third,
            Err(ServiceError::QuotaExceeded { kind: QuotaKind::Create, current: 2, limit: 2 })
        ));
        assert_eq!(fixture.store.agent_count().await, 2);
    }
}
