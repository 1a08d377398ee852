use std::sync::Arc;

use tracing::{error, info};

use crate::platform::ChatPlatform;
use crate::registry::{BotIdentity, CredentialSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered { url: String },
    Skipped { reason: String },
    Failed { error: String },
}

impl std::fmt::Display for RegistrationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationOutcome::Registered { url } => write!(f, "registered at {}", url),
            RegistrationOutcome::Skipped { reason } => write!(f, "skipped ({})", reason),
            RegistrationOutcome::Failed { error } => write!(f, "failed: {}", error),
        }
    }
}

/// What happened to one identity's webhook registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookRegistrationResult {
    pub identity: String,
    pub outcome: RegistrationOutcome,
}

impl WebhookRegistrationResult {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, RegistrationOutcome::Registered { .. })
    }
}

/// Point every identity's webhook at `public_base_url` + its path.
///
/// Never fails: a missing base URL skips everything, an identity running on
/// a borrowed credential is skipped, and an API error is logged and recorded
/// without stopping the remaining identities.
pub async fn register_all(
    identities: &[Arc<BotIdentity>],
    platform: &dyn ChatPlatform,
    public_base_url: Option<&str>,
) -> Vec<WebhookRegistrationResult> {
    let Some(base) = public_base_url else {
        info!("Set WEBHOOK_URL to register webhooks automatically");
        return identities
            .iter()
            .map(|identity| WebhookRegistrationResult {
                identity: identity.name.clone(),
                outcome: RegistrationOutcome::Skipped {
                    reason: "WEBHOOK_URL not set".to_string(),
                },
            })
            .collect();
    };
    let base = base.trim_end_matches('/');

    let mut results = Vec::with_capacity(identities.len());
    for identity in identities {
        let outcome = if identity.credential_source == CredentialSource::Fallback {
            info!(
                "Skipping webhook for {}: no credential of its own",
                identity.name
            );
            RegistrationOutcome::Skipped {
                reason: "shares another identity's credential".to_string(),
            }
        } else {
            let url = format!("{}{}", base, identity.webhook_path);
            match platform.set_callback_url(identity, &url).await {
                Ok(()) => {
                    info!("Webhook set for {}: {}", identity.name, url);
                    RegistrationOutcome::Registered { url }
                }
                Err(e) => {
                    error!("Failed to set webhook for {}: {:#}", identity.name, e);
                    RegistrationOutcome::Failed {
                        error: format!("{:#}", e),
                    }
                }
            }
        };

        results.push(WebhookRegistrationResult {
            identity: identity.name.clone(),
            outcome,
        });
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::platform::testing::RecordingPlatform;
    use crate::profiles::{DENSA, LAWSENSE};
    use crate::registry::Registry;

    fn registry(med: Option<&str>) -> Registry {
        let config = Config::from_lookup(|key| match key {
            "BOT_TOKEN" => Some("law".to_string()),
            "MED_BOT_TOKEN" => med.map(str::to_string),
            _ => None,
        })
        .unwrap();
        Registry::initialize(&config).unwrap()
    }

    #[tokio::test]
    async fn test_no_base_url_skips_everything() {
        let platform = RecordingPlatform::default();
        let results = register_all(registry(Some("med")).identities(), &platform, None).await;

        assert_eq!(results.len(), 2);
        assert!(results
            .iter()
            .all(|r| matches!(r.outcome, RegistrationOutcome::Skipped { .. })));
        assert!(platform.callbacks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_registers_both_with_own_tokens() {
        let platform = RecordingPlatform::default();
        let results = register_all(
            registry(Some("med")).identities(),
            &platform,
            Some("https://relay.example.com/"),
        )
        .await;

        assert!(results.iter().all(|r| r.succeeded()));
        let callbacks = platform.callbacks.lock().await.clone();
        assert_eq!(
            callbacks,
            vec![
                (
                    LAWSENSE.to_string(),
                    "https://relay.example.com/webhook/lawsense".to_string()
                ),
                (
                    DENSA.to_string(),
                    "https://relay.example.com/webhook/densa".to_string()
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_fallback_identity_is_skipped() {
        let platform = RecordingPlatform::default();
        let results = register_all(
            registry(None).identities(),
            &platform,
            Some("https://relay.example.com"),
        )
        .await;

        assert!(results[0].succeeded());
        assert_eq!(results[1].identity, DENSA);
        assert!(matches!(
            results[1].outcome,
            RegistrationOutcome::Skipped { .. }
        ));
        assert_eq!(platform.callbacks.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_other_identity() {
        let platform = RecordingPlatform {
            failing_callbacks: vec![LAWSENSE.to_string()],
            ..Default::default()
        };
        let results = register_all(
            registry(Some("med")).identities(),
            &platform,
            Some("https://relay.example.com"),
        )
        .await;

        assert!(matches!(
            &results[0].outcome,
            RegistrationOutcome::Failed { error } if error.contains("refused")
        ));
        assert!(results[1].succeeded());
        assert_eq!(
            results[1].outcome.to_string(),
            "registered at https://relay.example.com/webhook/densa"
        );
    }
}
