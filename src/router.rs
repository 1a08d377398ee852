use tracing::{debug, info};

use crate::intent::classify;
use crate::platform::InboundUpdate;
use crate::profiles::BotProfile;
use crate::reply::{render, select_reply, ReplyFormat, ReplyPayload, TemplateVars};

/// What a command does once its argument check passes.
#[derive(Debug, Clone)]
pub enum CommandAction {
    /// Reply immediately with the rendered HTML template.
    Reply(&'static str),
    /// Acknowledge now, answer later with one of `candidates`.
    Deferred {
        ack: &'static str,
        candidates: &'static [&'static str],
    },
}

#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub name: &'static str,
    /// If set, the command needs an argument and this hint is sent without one.
    pub usage_hint: Option<&'static str>,
    pub action: CommandAction,
}

/// Reply bodies to choose from once the deferred delay has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredReply {
    pub candidates: Vec<String>,
}

/// Result of routing one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routed {
    pub reply: ReplyPayload,
    pub deferred: Option<DeferredReply>,
}

impl Routed {
    fn now(reply: ReplyPayload) -> Self {
        Self {
            reply,
            deferred: None,
        }
    }
}

/// Route an update through `profile`'s command table or, for free text,
/// its keyword rules.
///
/// Returns `None` for updates that carry no text. Unknown commands are
/// classified as free text.
pub fn route(profile: &BotProfile, update: &InboundUpdate) -> Option<Routed> {
    let text = update.text.as_deref()?;

    info!(
        "[{}] Message from @{}: {}",
        profile.tag, update.sender_name, text
    );

    let command = update
        .command
        .as_deref()
        .and_then(|name| profile.command(name));

    match command {
        Some(spec) => Some(run_command(spec, update)),
        None => {
            if let Some(name) = &update.command {
                debug!("[{}] Unknown command /{}, treating as text", profile.tag, name);
            }
            let intent = classify(text, &profile.intents);
            debug!("[{}] Intent: {:?}", profile.tag, intent);
            Some(Routed::now(select_reply(
                intent,
                text,
                &profile.intents,
                profile.fallback_template,
            )))
        }
    }
}

fn run_command(spec: &CommandSpec, update: &InboundUpdate) -> Routed {
    let arg = update.argument.as_deref().unwrap_or("");

    if let Some(hint) = spec.usage_hint {
        if arg.is_empty() {
            return Routed::now(ReplyPayload::plain(hint));
        }
    }

    let vars = TemplateVars {
        username: &update.sender_name,
        user_id: update.sender_id,
        arg,
        text: update.text.as_deref().unwrap_or(""),
    };

    match &spec.action {
        CommandAction::Reply(template) => {
            Routed::now(ReplyPayload::html(render(template, &vars, ReplyFormat::Html)))
        }
        CommandAction::Deferred { ack, candidates } => Routed {
            reply: ReplyPayload::plain(*ack),
            deferred: Some(DeferredReply {
                candidates: candidates
                    .iter()
                    .map(|template| render(template, &vars, ReplyFormat::Html))
                    .collect(),
            }),
        },
    }
}
