use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{Config, PLACEHOLDER_TOKEN};
use crate::error::RelayError;
use crate::profiles::{self, BotProfile};

/// Where an identity's credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Set explicitly for this identity.
    Configured,
    /// Borrowed from the primary identity for demo purposes.
    Fallback,
}

/// One bot persona: credential plus behavior.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub name: String,
    pub credential: String,
    pub credential_source: CredentialSource,
    pub webhook_path: String,
    pub profile: BotProfile,
}

impl BotIdentity {
    pub fn new(profile: BotProfile, credential: String, source: CredentialSource) -> Self {
        Self {
            name: profile.name.to_string(),
            credential,
            credential_source: source,
            webhook_path: profile.webhook_path.to_string(),
            profile,
        }
    }
}

/// The configured identities. Read-only after startup.
#[derive(Debug, Clone)]
pub struct Registry {
    identities: Vec<Arc<BotIdentity>>,
}

fn usable_token(token: Option<&str>) -> Option<String> {
    token
        .filter(|t| !t.is_empty() && *t != PLACEHOLDER_TOKEN)
        .map(str::to_string)
}

impl Registry {
    /// Build lawsense (primary) and densa (secondary) from `config`.
    ///
    /// The primary token is mandatory. Without its own token densa reuses
    /// the primary one.
    pub fn initialize(config: &Config) -> Result<Self, RelayError> {
        let primary = usable_token(config.bot_token.as_deref()).ok_or_else(|| {
            RelayError::MissingCredential(
                "BOT_TOKEN is not set. Set the BOT_TOKEN environment variable.".to_string(),
            )
        })?;

        let (secondary, secondary_source) = match usable_token(config.med_bot_token.as_deref()) {
            Some(token) => (token, CredentialSource::Configured),
            None => {
                warn!("MED_BOT_TOKEN is not set, densa shares the lawsense token");
                (primary.clone(), CredentialSource::Fallback)
            }
        };

        Self::from_identities(vec![
            BotIdentity::new(profiles::lawsense(), primary, CredentialSource::Configured),
            BotIdentity::new(profiles::densa(), secondary, secondary_source),
        ])
    }

    /// Wrap `identities`, rejecting duplicate webhook paths.
    pub fn from_identities(identities: Vec<BotIdentity>) -> Result<Self, RelayError> {
        for (i, a) in identities.iter().enumerate() {
            if let Some(b) = identities[i + 1..]
                .iter()
                .find(|b| b.webhook_path == a.webhook_path)
            {
                return Err(RelayError::DuplicateWebhookPath {
                    path: a.webhook_path.clone(),
                    first: a.name.clone(),
                    second: b.name.clone(),
                });
            }
        }

        for identity in &identities {
            info!(
                "Bot {} on {} ({:?} credential)",
                identity.name, identity.webhook_path, identity.credential_source
            );
        }

        Ok(Self {
            identities: identities.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<BotIdentity>> {
        self.identities.iter()
    }

    pub fn identities(&self) -> &[Arc<BotIdentity>] {
        &self.identities
    }

    pub fn by_path(&self, path: &str) -> Option<&Arc<BotIdentity>> {
        self.identities.iter().find(|i| i.webhook_path == path)
    }
}
