//! Per-identity command and keyword tables.
//!
//! Both bots run through the same [`crate::router::CommandRouter`]; what
//! differs between them lives here as data.

use crate::intent::{Intent, IntentRule};
use crate::router::{CommandAction, CommandSpec};

/// Behavior of one bot identity.
#[derive(Debug, Clone)]
pub struct BotProfile {
    pub name: &'static str,
    /// Short tag used in log lines.
    pub tag: &'static str,
    pub webhook_path: &'static str,
    pub commands: Vec<CommandSpec>,
    /// Checked in order; first match wins.
    pub intents: Vec<IntentRule>,
    /// Reply template when no intent rule matches.
    pub fallback_template: &'static str,
}

impl BotProfile {
    pub fn command(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|c| c.name == name)
    }
}

pub const LAWSENSE: &str = "lawsense";
pub const DENSA: &str = "densa";

/// LawSense, the legal assistant.
pub fn lawsense() -> BotProfile {
    BotProfile {
        name: LAWSENSE,
        tag: "LAW",
        webhook_path: "/webhook/lawsense",
        commands: vec![
            CommandSpec {
                name: "start",
                usage_hint: None,
                action: CommandAction::Reply(
                    "Привет, @{username}!\n\n\
                     Это LawSense - юридический помощник.\n\n\
                     Доступные команды:\n\
                     /help - помощь\n\
                     /article [номер] - найти статью\n\
                     /ask [вопрос] - задать юридический вопрос\n\
                     /stats - статистика",
                ),
            },
            CommandSpec {
                name: "help",
                usage_hint: None,
                action: CommandAction::Reply(
                    "Помощь по LawSense:\n\n\
                     Основные команды:\n\
                     /start - начать работу\n\
                     /article 116 - найти статью 116\n\
                     /ask - задать юридический вопрос\n\
                     /stats - посмотреть статистику\n\n\
                     Примеры вопросов:\n\
                     • \"Что делать при нарушении ПДД?\"\n\
                     • \"Как подать в суд?\"\n\
                     • \"Права потребителя\"",
                ),
            },
            CommandSpec {
                name: "article",
                usage_hint: Some("Укажите номер статьи. Например: /article 116"),
                action: CommandAction::Reply(
                    "Статья {arg}\n\n\
                     Ищу статью {arg} в базе данных...\n\n\
                     В демо-версии показывается заглушка.",
                ),
            },
            CommandSpec {
                name: "ask",
                usage_hint: Some("Задайте ваш вопрос. Например: /ask Что делать при ДТП?"),
                action: CommandAction::Deferred {
                    ack: "Обрабатываю ваш вопрос...",
                    candidates: &[
                        "По вашему вопросу \"{arg}\":\n\n\
                         Рекомендую обратиться к статьям 115-118 КоАП РК.\n\
                         Для точной консультации свяжитесь с юристом.\n\n\
                         (Демо-ответ.)",
                        "Анализ вопроса: \"{arg}\"\n\n\
                         Найдены релевантные статьи в базе.\n\
                         В продакшене здесь будет развернутый ответ с ссылками.",
                    ],
                },
            },
            CommandSpec {
                name: "stats",
                usage_hint: None,
                // Demo numbers, there is no store behind them.
                action: CommandAction::Reply(
                    "Статистика пользователя\n\n\
                     ID: <code>{user_id}</code>\n\
                     Запросов сегодня: 5\n\
                     Всего запросов: 23\n\
                     Подписка: Базовая\n\n\
                     В реальной версии данные берутся из PostgreSQL",
                ),
            },
        ],
        intents: vec![
            IntentRule {
                intent: Intent::TrafficOrAccident,
                keywords: &["пдд", "дтп"],
                template: "Вопрос по ПДД/ДТП:\n\n\
                           Рекомендую изучить статьи 115-118 КоАП РК.\n\
                           При серьезных нарушениях обращайтесь к юристу.",
            },
            IntentRule {
                intent: Intent::JudicialProcess,
                keywords: &["суд", "иск"],
                template: "Судебные вопросы:\n\n\
                           Для подачи иска необходимо:\n\
                           • Составить исковое заявление\n\
                           • Собрать доказательства\n\
                           • Оплатить госпошлину\n\n\
                           Рекомендуется консультация с юристом.",
            },
        ],
        fallback_template: "Обработка вопроса: \"{text}\"\n\n\
                            В реальной версии тут будет AI-анализ и ссылки на законы.\n\
                            Используйте /help или /ask [вопрос]",
    }
}

/// Densa, the medical assistant.
pub fn densa() -> BotProfile {
    BotProfile {
        name: DENSA,
        tag: "MED",
        webhook_path: "/webhook/densa",
        commands: vec![CommandSpec {
            name: "start",
            usage_hint: None,
            action: CommandAction::Reply(
                "Привет, @{username}!\n\n\
                 Densa - медицинский помощник.\n\n\
                 Важно: информация не заменяет консультацию врача!\n\n\
                 Доступные команды:\n\
                 /help - помощь\n\
                 /symptoms - описать симптомы\n\
                 /emergency - экстренные случаи",
            ),
        }],
        intents: vec![IntentRule {
            intent: Intent::PainReported,
            keywords: &["болит", "боль"],
            template: "Болевые ощущения\n\n\
                       При сильной боли обратитесь к врачу!\n\
                       Экстренная помощь: 103\n\n\
                       Это не замена медицинской консультации.",
        }],
        fallback_template: "Спасибо за обращение!\n\n\
                            Для точного диагноза и лечения обязательно обратитесь к врачу.\n\
                            Экстренная помощь: 103",
    }
}
