//! Reply generator: drafts a suggested response for a classified email.
//!
//! Uses the remote service with a per-label prompt when available and a
//! fixed template otherwise. An error or a blank answer also yields the
//! template.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, FinishReason, LlmProvider};
use crate::pipeline::types::{ClassificationLabel, Decided};

/// Canned reply for actionable emails.
pub const ACTIONABLE_TEMPLATE: &str = "Prezado(a),\n\n\
Obrigado pelo seu email. Nossa equipe técnica irá analisá-lo e retornaremos em até 24h.\n\n\
Atenciosamente,\n\
Equipe de Suporte Técnico";

/// Canned reply for courtesy emails.
pub const NON_ACTIONABLE_TEMPLATE: &str = "Prezado(a),\n\n\
Muito obrigado pela sua mensagem! Desejamos um excelente dia.\n\n\
Atenciosamente,\n\
Equipe de Atendimento";

/// Configuration for reply generation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// LLM temperature for reply generation.
    pub temperature: f32,
    pub top_p: f32,
    /// Max tokens for LLM response.
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 300,
        }
    }
}

/// Template reply for a label.
pub fn template_reply(label: ClassificationLabel) -> &'static str {
    match label {
        ClassificationLabel::Actionable => ACTIONABLE_TEMPLATE,
        ClassificationLabel::NonActionable => NON_ACTIONABLE_TEMPLATE,
    }
}

/// Generates suggested replies.
pub struct ResponseGenerator {
    llm: Option<Arc<dyn LlmProvider>>,
    config: GeneratorConfig,
}

impl ResponseGenerator {
    pub fn new(llm: Option<Arc<dyn LlmProvider>>, config: GeneratorConfig) -> Self {
        Self { llm, config }
    }

    /// Generate a reply. Never fails.
    pub async fn generate(&self, text: &str, label: ClassificationLabel) -> String {
        self.generate_decided(text, label).await.value
    }

    /// Generate a reply and report which path produced it.
    pub async fn generate_decided(
        &self,
        text: &str,
        label: ClassificationLabel,
    ) -> Decided<String> {
        let Some(llm) = &self.llm else {
            return Decided::fallback(template_reply(label).to_string());
        };

        match self.draft_remote(llm.as_ref(), text, label).await {
            Ok(reply) if !reply.is_empty() => Decided::remote(reply),
            Ok(_) => {
                debug!(label = label.as_str(), "Remote reply was blank, using template");
                Decided::fallback(template_reply(label).to_string())
            }
            Err(e) => {
                warn!(
                    model = llm.model_name(),
                    label = label.as_str(),
                    error = %e,
                    "Remote reply generation failed, using template"
                );
                Decided::fallback(template_reply(label).to_string())
            }
        }
    }

    async fn draft_remote(
        &self,
        llm: &dyn LlmProvider,
        text: &str,
        label: ClassificationLabel,
    ) -> Result<String, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(build_reply_system_prompt(label)),
            ChatMessage::user(build_reply_user_prompt(text)),
        ])
        .with_temperature(self.config.temperature)
        .with_top_p(self.config.top_p)
        .with_max_tokens(self.config.max_tokens);

        let response = llm.complete(request).await?;
        debug!(
            label = label.as_str(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = ?response.finish_reason,
            response_id = response.response_id.as_deref().unwrap_or("-"),
            "Remote reply drafted"
        );
        if response.finish_reason == FinishReason::Length {
            warn!(
                max_tokens = self.config.max_tokens,
                "Remote reply hit the token limit and may be cut short"
            );
        }
        Ok(response.content.trim().to_string())
    }
}

// ── Prompt construction ─────────────────────────────────────────────

/// Build the reply system prompt for a label.
fn build_reply_system_prompt(label: ClassificationLabel) -> String {
    let base = "Você é um assistente de atendimento ao cliente de uma empresa do setor financeiro.\n\n";
    let rules = match label {
        ClassificationLabel::Actionable => {
            "Gere uma resposta profissional:\n\
             - Confirme o recebimento\n\
             - Indique que a solicitação será analisada\n\
             - Informe um prazo de retorno quando adequado\n\
             - Use linguagem cordial e formal\n\
             - No máximo 4 parágrafos"
        }
        ClassificationLabel::NonActionable => {
            "Gere uma resposta cordial e breve:\n\
             - Agradeça pela mensagem\n\
             - Retribua o sentimento\n\
             - Use um tom caloroso\n\
             - No máximo 2 parágrafos"
        }
    };
    format!("{base}{rules}")
}

/// Build the reply user prompt.
fn build_reply_user_prompt(text: &str) -> String {
    format!("Email:\n{text}\n\nResposta:")
}
