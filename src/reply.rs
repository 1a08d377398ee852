use rand::seq::SliceRandom;
use rand::Rng;
use teloxide::utils::html;

use crate::intent::{Intent, IntentRule};

/// Sent when the deferred `/ask` path has no candidate to choose from.
pub const EMPTY_CANDIDATES_REPLY: &str = "Произошла внутренняя ошибка: отсутствует ответ.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFormat {
    Html,
    Plain,
}

/// A message to send back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPayload {
    pub body: String,
    pub format: ReplyFormat,
}

impl ReplyPayload {
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            format: ReplyFormat::Html,
        }
    }

    pub fn plain(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            format: ReplyFormat::Plain,
        }
    }
}

/// Values substituted into reply templates.
///
/// Everything here comes from the user, so it is escaped before landing in
/// an HTML body.
#[derive(Debug, Clone, Default)]
pub struct TemplateVars<'a> {
    pub username: &'a str,
    pub user_id: Option<u64>,
    pub arg: &'a str,
    pub text: &'a str,
}

/// Fill `{username}`, `{user_id}`, `{arg}` and `{text}` in `template`.
///
/// Single pass: substituted values are never re-scanned, so user text that
/// happens to contain `{arg}` stays literal. Unknown placeholders are kept.
pub fn render(template: &str, vars: &TemplateVars<'_>, format: ReplyFormat) -> String {
    let escape = |value: &str| match format {
        ReplyFormat::Html => html::escape(value),
        ReplyFormat::Plain => value.to_string(),
    };

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('}') else {
            rest = tail;
            break;
        };
        let value = match &tail[1..close] {
            "username" => Some(escape(vars.username)),
            "user_id" => Some(
                vars.user_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            ),
            "arg" => Some(escape(vars.arg)),
            "text" => Some(escape(vars.text)),
            _ => None,
        };
        match value {
            Some(value) => {
                out.push_str(&value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Render the reply for `intent`, embedding the original `text`.
/// Intents without a rule of their own (`Generic`) use `fallback`.
pub fn select_reply(intent: Intent, text: &str, rules: &[IntentRule], fallback: &str) -> ReplyPayload {
    let template = rules
        .iter()
        .find(|rule| rule.intent == intent)
        .map(|rule| rule.template)
        .unwrap_or(fallback);
    let vars = TemplateVars {
        text,
        ..Default::default()
    };
    ReplyPayload::html(render(template, &vars, ReplyFormat::Html))
}

/// Choose one rendered candidate uniformly at random.
///
/// An empty list yields [`EMPTY_CANDIDATES_REPLY`] instead of nothing.
pub fn select_candidate<R: Rng + ?Sized>(candidates: &[String], rng: &mut R) -> ReplyPayload {
    match candidates.choose(rng) {
        Some(body) => ReplyPayload::html(body.clone()),
        None => ReplyPayload::html(EMPTY_CANDIDATES_REPLY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_render_substitutes_all_placeholders() {
        let vars = TemplateVars {
            username: "alice",
            user_id: Some(42),
            arg: "116",
            text: "hi",
        };
        let out = render(
            "@{username} {user_id} {arg} {text}",
            &vars,
            ReplyFormat::Html,
        );
        assert_eq!(out, "@alice 42 116 hi");
    }

    #[test]
    fn test_render_escapes_html_only_for_html() {
        let vars = TemplateVars {
            arg: "<b>1</b>",
            ..Default::default()
        };
        assert_eq!(
            render("{arg}", &vars, ReplyFormat::Html),
            "&lt;b&gt;1&lt;/b&gt;"
        );
        assert_eq!(render("{arg}", &vars, ReplyFormat::Plain), "<b>1</b>");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let vars = TemplateVars {
            arg: "{text}",
            text: "secret",
            ..Default::default()
        };
        assert_eq!(
            render("{arg} {unknown} {", &vars, ReplyFormat::Plain),
            "{text} {unknown} {"
        );
    }

    #[test]
    fn test_render_unknown_user_id() {
        let out = render("ID: {user_id}", &TemplateVars::default(), ReplyFormat::Html);
        assert_eq!(out, "ID: unknown");
    }

    #[test]
    fn test_traffic_reply_mentions_articles() {
        let profile = profiles::lawsense();
        let reply = select_reply(
            Intent::TrafficOrAccident,
            "У меня была авария, было ДТП",
            &profile.intents,
            profile.fallback_template,
        );
        assert_eq!(reply.format, ReplyFormat::Html);
        assert!(reply.body.contains("115-118"));
        assert!(reply.body.contains("юрист"));
    }

    #[test]
    fn test_pain_reply_mentions_emergency_number() {
        let profile = profiles::densa();
        let reply = select_reply(
            Intent::PainReported,
            "очень болит живот",
            &profile.intents,
            profile.fallback_template,
        );
        assert!(reply.body.contains("103"));
        assert!(reply.body.contains("Болевые ощущения"));
    }

    #[test]
    fn test_legal_fallback_echoes_message() {
        let profile = profiles::lawsense();
        let reply = select_reply(
            Intent::Generic,
            "Права <потребителя>",
            &profile.intents,
            profile.fallback_template,
        );
        assert!(reply
            .body
            .starts_with("Обработка вопроса: \"Права &lt;потребителя&gt;\""));
    }

    #[test]
    fn test_generic_medical_reply_does_not_echo() {
        let profile = profiles::densa();
        let reply = select_reply(
            Intent::Generic,
            "привет",
            &profile.intents,
            profile.fallback_template,
        );
        assert!(reply.body.starts_with("Спасибо за обращение!"));
        assert!(!reply.body.contains("привет"));
    }

    #[test]
    fn test_select_candidate_empty_list_falls_back() {
        let mut rng = StdRng::seed_from_u64(7);
        let reply = select_candidate(&[], &mut rng);
        assert_eq!(reply, ReplyPayload::html(EMPTY_CANDIDATES_REPLY));
    }

    #[test]
    fn test_select_candidate_covers_every_body() {
        let candidates = vec!["first".to_string(), "second".to_string()];
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen_first = 0;
        let mut seen_second = 0;
        for _ in 0..200 {
            match select_candidate(&candidates, &mut rng).body.as_str() {
                "first" => seen_first += 1,
                "second" => seen_second += 1,
                other => panic!("unexpected body {other}"),
            }
        }
        assert!(seen_first > 0);
        assert!(seen_second > 0);
    }
}
