pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

use crate::registry::BotIdentity;
use crate::reply::ReplyPayload;

/// Shown instead of a missing username.
pub const PLACEHOLDER_SENDER: &str = "Пользователь";

/// A text message received on one of the webhooks, already split into
/// command token and argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUpdate {
    pub chat_id: i64,
    pub sender_id: Option<u64>,
    /// Username, or [`PLACEHOLDER_SENDER`].
    pub sender_name: String,
    pub text: Option<String>,
    /// Command name without the leading slash or `@botname` suffix.
    pub command: Option<String>,
    /// Text after the command, trimmed. `None` when empty.
    pub argument: Option<String>,
}

/// Build an [`InboundUpdate`] from the raw message fields.
pub fn parse_message(
    chat_id: i64,
    sender_id: Option<u64>,
    username: Option<String>,
    text: Option<String>,
) -> InboundUpdate {
    let (command, argument) = match text.as_deref().and_then(parse_command) {
        Some((command, argument)) => (Some(command), argument),
        None => (None, None),
    };

    InboundUpdate {
        chat_id,
        sender_id,
        sender_name: username
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_SENDER.to_string()),
        text,
        command,
        argument,
    }
}

/// Split `/name@bot rest of text` into `("name", Some("rest of text"))`.
fn parse_command(text: &str) -> Option<(String, Option<String>)> {
    let body = text.strip_prefix('/')?;
    let (token, rest) = match body.find(char::is_whitespace) {
        Some(pos) => (&body[..pos], &body[pos..]),
        None => (body, ""),
    };
    let name = token.split('@').next().unwrap_or("");
    if name.is_empty() {
        return None;
    }

    let rest = rest.trim();
    let argument = (!rest.is_empty()).then(|| rest.to_string());
    Some((name.to_string(), argument))
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Send `payload` to `chat_id` as `identity`.
    async fn send_reply(
        &self,
        identity: &BotIdentity,
        chat_id: i64,
        payload: &ReplyPayload,
    ) -> Result<()>;

    /// Tell the platform where to deliver updates for `identity`.
    async fn set_callback_url(&self, identity: &BotIdentity, url: &str) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tokio::sync::Mutex;

    /// Records outbound calls instead of talking to Telegram.
    #[derive(Default)]
    pub struct RecordingPlatform {
        pub sent: Mutex<Vec<(String, i64, ReplyPayload)>>,
        pub callbacks: Mutex<Vec<(String, String)>>,
        /// Identities whose sends fail.
        pub failing_sends: Vec<String>,
        /// Identities whose callback registration fails.
        pub failing_callbacks: Vec<String>,
    }

    impl RecordingPlatform {
        pub async fn sent_to(&self, identity: &str) -> Vec<ReplyPayload> {
            self.sent
                .lock()
                .await
                .iter()
                .filter(|(name, _, _)| name == identity)
                .map(|(_, _, payload)| payload.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ChatPlatform for RecordingPlatform {
        async fn send_reply(
            &self,
            identity: &BotIdentity,
            chat_id: i64,
            payload: &ReplyPayload,
        ) -> Result<()> {
            if self.failing_sends.contains(&identity.name) {
                anyhow::bail!("send to {} refused", identity.name);
            }
            self.sent
                .lock()
                .await
                .push((identity.name.clone(), chat_id, payload.clone()));
            Ok(())
        }

        async fn set_callback_url(&self, identity: &BotIdentity, url: &str) -> Result<()> {
            if self.failing_callbacks.contains(&identity.name) {
                anyhow::bail!("setWebhook for {} refused", identity.name);
            }
            self.callbacks
                .lock()
                .await
                .push((identity.name.clone(), url.to_string()));
            Ok(())
        }
    }
}
