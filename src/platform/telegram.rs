use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, UpdateKind};
use tracing::debug;

use crate::error::RelayError;
use crate::platform::{parse_message, ChatPlatform, InboundUpdate};
use crate::registry::{BotIdentity, Registry};
use crate::reply::{ReplyFormat, ReplyPayload};

/// Decode a webhook body into an [`InboundUpdate`].
///
/// Malformed JSON is an error, and so is a known update kind whose body
/// does not parse. Well-formed updates that are not text messages (edits,
/// callbacks, stickers, ...) decode to `None`.
pub fn decode_update(body: &[u8]) -> Result<Option<InboundUpdate>, RelayError> {
    let update: Update = serde_json::from_slice(body)?;

    let msg = match update.kind {
        UpdateKind::Message(msg) => msg,
        // teloxide keeps unparsable bodies of known kinds as raw JSON
        UpdateKind::Error(value) => {
            let kind = value
                .as_object()
                .and_then(|fields| fields.keys().find(|key| *key != "update_id"))
                .cloned()
                .unwrap_or_else(|| "payload".to_string());
            return Err(RelayError::MalformedUpdate {
                update_id: format!("{:?}", update.id),
                kind,
            });
        }
        other => {
            debug!("Ignoring update {:?}: {:?}", update.id, other);
            return Ok(None);
        }
    };

    let text = match msg.text() {
        Some(t) => t.to_string(),
        None => return Ok(None),
    };

    let (sender_id, username) = match msg.from.as_ref() {
        Some(user) => (Some(user.id.0), user.username.clone()),
        None => (None, None),
    };

    Ok(Some(parse_message(msg.chat.id.0, sender_id, username, Some(text))))
}

/// Telegram Bot API client, one `Bot` per identity.
pub struct TelegramPlatform {
    bots: HashMap<String, Bot>,
}

impl TelegramPlatform {
    pub fn new(registry: &Registry) -> Result<Self> {
        let client = teloxide::net::default_reqwest_settings()
            .build()
            .context("Failed to build Telegram HTTP client")?;

        let bots = registry
            .iter()
            .map(|identity| {
                (
                    identity.name.clone(),
                    Bot::with_client(&identity.credential, client.clone()),
                )
            })
            .collect();

        Ok(Self { bots })
    }

    fn bot(&self, identity: &BotIdentity) -> Result<&Bot> {
        self.bots
            .get(&identity.name)
            .with_context(|| format!("No Telegram client for {}", identity.name))
    }
}

#[async_trait]
impl ChatPlatform for TelegramPlatform {
    async fn send_reply(
        &self,
        identity: &BotIdentity,
        chat_id: i64,
        payload: &ReplyPayload,
    ) -> Result<()> {
        let bot = self.bot(identity)?;
        let mut request = bot.send_message(ChatId(chat_id), payload.body.clone());
        if payload.format == ReplyFormat::Html {
            request = request.parse_mode(ParseMode::Html);
        }

        request.await.map_err(|e| RelayError::ReplyDelivery {
            identity: identity.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    async fn set_callback_url(&self, identity: &BotIdentity, url: &str) -> Result<()> {
        let bot = self.bot(identity)?;
        let url = reqwest::Url::parse(url)
            .with_context(|| format!("Invalid webhook URL: {}", url))?;

        bot.set_webhook(url)
            .await
            .map_err(|e| RelayError::Registration {
                identity: identity.name.clone(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
