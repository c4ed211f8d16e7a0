//! Back-office assistant: packs the roster, the sites and the latest punches
//! into one prompt and relays it to a text-generation service.

pub mod gemini;

use std::sync::Arc;

use chrono::TimeZone;
use serde::Serialize;
use tracing::{error, warn};

use crate::{
    model::{employee::Employee, site::Site, time_log::TimeLog},
    utils::locale,
};
use gemini::TextGenerator;

/// How many of the most recent logs go into the context.
pub const CONTEXT_LOGS: usize = 50;

pub const NO_KEY_REPLY: &str = "Erro: Chave de API não configurada.";
pub const FAILURE_REPLY: &str = "Erro ao comunicar com a IA. Verifique sua conexão ou chave de API.";
pub const EMPTY_REPLY: &str = "Não foi possível gerar o relatório.";

const UNKNOWN: &str = "Unknown";

#[derive(Serialize)]
struct EmployeeContext<'a> {
    name: &'a str,
    role: &'a str,
    rate: f64,
}

#[derive(Serialize)]
struct SiteContext<'a> {
    id: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct LogContext<'a> {
    employee: &'a str,
    site: &'a str,
    #[serde(rename = "type")]
    direction: &'a str,
    time: String,
}

#[derive(Serialize)]
struct DataContext<'a> {
    employees: Vec<EmployeeContext<'a>>,
    sites: Vec<SiteContext<'a>>,
    logs: Vec<LogContext<'a>>,
}

/// Renders the prompt: fixed instructions, the data as pretty JSON, then the
/// question verbatim.
pub fn build_prompt<Tz: TimeZone>(
    employees: &[Employee],
    logs: &[TimeLog],
    sites: &[Site],
    question: &str,
    tz: &Tz,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let recent = &logs[logs.len().saturating_sub(CONTEXT_LOGS)..];
    let context = DataContext {
        employees: employees
            .iter()
            .map(|e| EmployeeContext {
                name: &e.name,
                role: e.role.as_ref(),
                rate: e.hourly_rate,
            })
            .collect(),
        sites: sites
            .iter()
            .map(|s| SiteContext {
                id: &s.id,
                name: &s.name,
            })
            .collect(),
        logs: recent
            .iter()
            .map(|l| LogContext {
                employee: employees
                    .iter()
                    .find(|e| e.id == l.employee_id)
                    .map(|e| e.name.as_str())
                    .unwrap_or(UNKNOWN),
                site: sites
                    .iter()
                    .find(|s| s.id == l.site_id)
                    .map(|s| s.name.as_str())
                    .unwrap_or(UNKNOWN),
                direction: l.direction.as_ref(),
                time: locale::from_millis(tz, l.timestamp)
                    .map(|at| locale::datetime_br(&at))
                    .unwrap_or_default(),
            })
            .collect(),
    };
    let data = serde_json::to_string_pretty(&context).unwrap_or_else(|_| "{}".to_string());

    format!(
        "Você é um assistente administrativo sênior de uma construtora.\n\
         Analise os dados abaixo e responda à solicitação do usuário.\n\
         Responda sempre em Português do Brasil, de forma profissional e sucinta.\n\
         \n\
         Dados (JSON):\n\
         {data}\n\
         \n\
         Solicitação do Usuário: \"{question}\"\n"
    )
}

pub struct AssistantRelay {
    generator: Arc<dyn TextGenerator>,
}

impl AssistantRelay {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// One independent question. Always returns displayable text: the
    /// service's answer or one of the fixed fallback replies.
    pub async fn ask<Tz: TimeZone>(
        &self,
        employees: &[Employee],
        logs: &[TimeLog],
        sites: &[Site],
        question: &str,
        tz: &Tz,
    ) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        if !self.generator.is_configured() {
            warn!("Assistant called without an API key");
            return NO_KEY_REPLY.to_string();
        }

        let prompt = build_prompt(employees, logs, sites, question, tz);
        match self.generator.generate(prompt).await {
            Ok(Some(text)) => text,
            Ok(None) => EMPTY_REPLY.to_string(),
            Err(e) => {
                error!(error = %e, "Assistant request failed");
                FAILURE_REPLY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::time_log::Direction;
    use crate::store::seed;
    use anyhow::anyhow;
    use chrono::FixedOffset;
    use futures::FutureExt;
    use futures::future::BoxFuture;
    use std::sync::Mutex;

    enum Reply {
        Text(&'static str),
        Empty,
        Fail,
    }

    struct CannedGenerator {
        configured: bool,
        reply: Reply,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedGenerator {
        fn new(configured: bool, reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                configured,
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    impl TextGenerator for CannedGenerator {
        fn is_configured(&self) -> bool {
            self.configured
        }

        fn generate<'a>(&'a self, prompt: String) -> BoxFuture<'a, anyhow::Result<Option<String>>> {
            self.prompts.lock().unwrap().push(prompt);
            let result = match self.reply {
                Reply::Text(text) => Ok(Some(text.to_string())),
                Reply::Empty => Ok(None),
                Reply::Fail => Err(anyhow!("connection reset")),
            };
            async move { result }.boxed()
        }
    }

    fn logs(count: usize) -> Vec<TimeLog> {
        (0..count)
            .map(|i| TimeLog {
                id: i.to_string(),
                employee_id: if i % 2 == 0 { "1" } else { "99" }.into(),
                site_id: "2".into(),
                timestamp: 1_792_146_600_000 + i as i64 * 60_000,
                direction: Direction::In,
                photo_snapshot: "data:image/jpeg;base64,AAAA".into(),
            })
            .collect()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn prompt_embeds_roster_and_only_recent_logs() {
        let prompt = build_prompt(
            &seed::employees(),
            &logs(60),
            &seed::sites(),
            "Quem trabalhou hoje?",
            &utc(),
        );

        assert!(prompt.contains("\"rate\": 35.0"));
        assert!(prompt.contains("\"role\": \"Engenheiro\""));
        assert!(prompt.contains("Reforma Shopping Centro"));
        assert!(prompt.contains("Solicitação do Usuário: \"Quem trabalhou hoje?\""));
        assert!(prompt.contains("\"employee\": \"Unknown\""));
        assert_eq!(prompt.matches("\"type\": \"ENTRADA\"").count(), CONTEXT_LOGS);
        // first ten logs fall outside the window
        assert!(!prompt.contains("16/10/2026, 10:30:00"));
        assert!(prompt.contains("16/10/2026, 10:40:00"));
        assert!(!prompt.contains("base64"));
    }

    #[actix_web::test]
    async fn answer_is_returned_verbatim() {
        let generator = CannedGenerator::new(true, Reply::Text("Total: 42 horas."));
        let relay = AssistantRelay::new(generator.clone());

        let answer = relay
            .ask(&seed::employees(), &[], &seed::sites(), "Resumo?", &utc())
            .await;
        assert_eq!(answer, "Total: 42 horas.");
        assert_eq!(generator.prompts.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn missing_key_short_circuits() {
        let generator = CannedGenerator::new(false, Reply::Text("unused"));
        let relay = AssistantRelay::new(generator.clone());

        let answer = relay.ask(&[], &[], &[], "Resumo?", &utc()).await;
        assert_eq!(answer, NO_KEY_REPLY);
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn failures_fall_back_to_fixed_replies() {
        let failing = AssistantRelay::new(CannedGenerator::new(true, Reply::Fail));
        assert_eq!(failing.ask(&[], &[], &[], "?", &utc()).await, FAILURE_REPLY);

        let empty = AssistantRelay::new(CannedGenerator::new(true, Reply::Empty));
        assert_eq!(empty.ask(&[], &[], &[], "?", &utc()).await, EMPTY_REPLY);
    }
}
