use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tracing::{error, warn};
use uuid::Uuid;

use crate::platform::{ChatPlatform, InboundUpdate};
use crate::registry::{BotIdentity, Registry};
use crate::reply::select_candidate;
use crate::router::{self, DeferredReply};
use crate::scheduler::DeferredScheduler;

/// Everything a webhook request needs, built once in `main`.
pub struct AppContext {
    pub registry: Registry,
    pub platform: Arc<dyn ChatPlatform>,
    pub scheduler: Arc<dyn DeferredScheduler>,
    pub ask_delay: Duration,
}

/// What happened to one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Nothing to answer (no text).
    Ignored,
    /// Reply sent; `deferred` is the pending follow-up, if any.
    Sent { deferred: Option<Uuid> },
    /// The immediate reply could not be sent.
    Failed,
}

impl AppContext {
    /// Route `update` for `identity`, send the reply and queue any
    /// follow-up. Returns once the immediate reply is out; the follow-up
    /// runs on the scheduler.
    pub async fn handle_update(
        &self,
        identity: &Arc<BotIdentity>,
        update: &InboundUpdate,
    ) -> Delivery {
        let Some(routed) = router::route(&identity.profile, update) else {
            return Delivery::Ignored;
        };

        if let Err(e) = self
            .platform
            .send_reply(identity, update.chat_id, &routed.reply)
            .await
        {
            error!("Failed to send reply as {}: {:#}", identity.name, e);
            return Delivery::Failed;
        }

        let deferred = match routed.deferred {
            Some(deferred) => self.defer(identity, update.chat_id, deferred).await,
            None => None,
        };
        Delivery::Sent { deferred }
    }

    async fn defer(
        &self,
        identity: &Arc<BotIdentity>,
        chat_id: i64,
        deferred: DeferredReply,
    ) -> Option<Uuid> {
        let platform = Arc::clone(&self.platform);
        let identity_for_task = Arc::clone(identity);
        let task = async move {
            // chosen at send time
            let payload = {
                let mut rng = rand::thread_rng();
                select_candidate(&deferred.candidates, &mut rng)
            };
            if let Err(e) = platform
                .send_reply(&identity_for_task, chat_id, &payload)
                .await
            {
                warn!(
                    "Failed to send deferred reply as {}: {:#}",
                    identity_for_task.name, e
                );
            }
        }
        .boxed();

        let name = format!("{}-reply-{}", identity.name, chat_id);
        match self.scheduler.schedule(&name, self.ask_delay, task).await {
            Ok(id) => Some(id),
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }
}
