//! Remote-first email classifier.
//!
//! Asks the hosted completion service for a one-word label and maps the
//! answer onto the binary taxonomy. The rule-based classifier takes over
//! when no service is configured or the call fails; errors never leave
//! this module.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::pipeline::rules::FallbackClassifier;
use crate::pipeline::types::{ClassificationLabel, Decided};

/// Sampling parameters for the classification call.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Only a single word is expected back.
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_tokens: 10,
            temperature: 0.1,
            top_p: 0.9,
        }
    }
}

/// Parsed remote answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteVerdict {
    /// The answer named one of the two labels.
    Label(ClassificationLabel),
    /// Neither label was present.
    Ambiguous,
}

impl RemoteVerdict {
    /// Ambiguous answers resolve to ACTIONABLE, same bias as the rule-based tie-break.
    pub fn resolve(self) -> ClassificationLabel {
        match self {
            Self::Label(label) => label,
            Self::Ambiguous => ClassificationLabel::Actionable,
        }
    }
}

/// Classifier that prefers the remote service and falls back to rules.
pub struct RemoteClassifier {
    llm: Option<Arc<dyn LlmProvider>>,
    fallback: FallbackClassifier,
    config: ClassifierConfig,
}

impl RemoteClassifier {
    /// Create a classifier. `llm = None` runs rules only.
    pub fn new(
        llm: Option<Arc<dyn LlmProvider>>,
        fallback: FallbackClassifier,
        config: ClassifierConfig,
    ) -> Self {
        Self {
            llm,
            fallback,
            config,
        }
    }

    /// Classify normalized text. Never fails.
    pub async fn classify(&self, text: &str) -> ClassificationLabel {
        self.classify_decided(text).await.value
    }

    /// Classify and report which path produced the label.
    pub async fn classify_decided(&self, text: &str) -> Decided<ClassificationLabel> {
        let Some(llm) = &self.llm else {
            return Decided::fallback(self.fallback.classify(text));
        };

        match self.ask_remote(llm.as_ref(), text).await {
            Ok(verdict) => {
                if verdict == RemoteVerdict::Ambiguous {
                    debug!("Remote answer named no label, defaulting to actionable");
                }
                Decided::remote(verdict.resolve())
            }
            Err(e) => {
                warn!(
                    model = llm.model_name(),
                    error = %e,
                    "Remote classification failed, using rule-based classifier"
                );
                Decided::fallback(self.fallback.classify(text))
            }
        }
    }

    async fn ask_remote(
        &self,
        llm: &dyn LlmProvider,
        text: &str,
    ) -> Result<RemoteVerdict, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(build_classification_system_prompt()),
            ChatMessage::user(build_classification_user_prompt(text)),
        ])
        .with_max_tokens(self.config.max_tokens)
        .with_temperature(self.config.temperature)
        .with_top_p(self.config.top_p);

        let response = llm.complete(request).await?;
        let verdict = parse_label(&response.content);
        debug!(
            raw_response = %response.content.trim(),
            verdict = ?verdict,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = ?response.finish_reason,
            response_id = response.response_id.as_deref().unwrap_or("-"),
            "Remote classification answered"
        );
        Ok(verdict)
    }
}

// ── Prompt construction ─────────────────────────────────────────────

/// Build the classification system prompt.
fn build_classification_system_prompt() -> String {
    "Você é um especialista em classificação de emails corporativos para uma empresa do setor financeiro.\n\n\
     Classifique cada email em exatamente uma de duas categorias:\n\n\
     PRODUTIVO: emails que requerem ação ou resposta específica, incluindo:\n\
     - Solicitações de suporte técnico\n\
     - Dúvidas sobre sistemas ou processos\n\
     - Relatórios de problemas ou erros\n\
     - Pedidos de informação ou documentos\n\
     - Atualizações de status de projetos\n\
     - Reuniões e agendamentos\n\
     - Problemas urgentes\n\n\
     IMPRODUTIVO: emails que não necessitam ação imediata, incluindo:\n\
     - Felicitações (aniversários, feriados)\n\
     - Agradecimentos simples\n\
     - Mensagens pessoais não relacionadas ao trabalho\n\
     - Spam ou mensagens promocionais\n\
     - Cumprimentos sociais sem conteúdo adicional\n\n\
     Responda apenas com PRODUTIVO ou IMPRODUTIVO, sem explicações.\n\n\
     Exemplos:\n\
     Email: \"Obrigado pela ajuda\"\n\
     Classificação: IMPRODUTIVO\n\n\
     Email: \"Preciso da fatura de agosto\"\n\
     Classificação: PRODUTIVO"
        .to_string()
}

/// Build the classification user prompt.
fn build_classification_user_prompt(text: &str) -> String {
    format!("Classifique o seguinte email:\n\n{text}\n\nClassificação:")
}

// ── Response parsing ────────────────────────────────────────────────

/// Map a free-form answer onto the taxonomy.
///
/// The non-actionable tokens are checked first: `IMPRODUTIVO` contains
/// `PRODUTIVO` and `NON_ACTIONABLE` contains `ACTIONABLE`.
pub fn parse_label(raw: &str) -> RemoteVerdict {
    let answer = raw.trim().to_uppercase();

    if ["IMPRODUTIVO", "NON_ACTIONABLE", "NON-ACTIONABLE", "NON ACTIONABLE"]
        .iter()
        .any(|t| answer.contains(t))
    {
        RemoteVerdict::Label(ClassificationLabel::NonActionable)
    } else if ["PRODUTIVO", "ACTIONABLE"].iter().any(|t| answer.contains(t)) {
        RemoteVerdict::Label(ClassificationLabel::Actionable)
    } else {
        RemoteVerdict::Ambiguous
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::llm::provider::{CompletionResponse, FinishReason};
    use crate::pipeline::rules::classify_fallback;

    /// Mock LLM that returns a fixed answer and records the last request.
    struct MockLabelLlm {
        response: String,
        last_request: Mutex<Option<CompletionRequest>>,
    }

    impl MockLabelLlm {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for MockLabelLlm {
        fn model_name(&self) -> &str {
            "mock-label"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            *self.last_request.lock().unwrap() = Some(request);
            Ok(CompletionResponse {
                content: self.response.clone(),
                input_tokens: 100,
                output_tokens: 2,
                finish_reason: FinishReason::Stop,
                response_id: None,
            })
        }
    }

    /// Mock LLM that always fails.
    struct FailingLlm;

    #[async_trait::async_trait]
    impl LlmProvider for FailingLlm {
        fn model_name(&self) -> &str {
            "failing"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            Err(LlmError::RequestFailed {
                provider: "mock".into(),
                reason: "connection refused".into(),
            })
        }
    }

    fn classifier_with(llm: Option<Arc<dyn LlmProvider>>) -> RemoteClassifier {
        RemoteClassifier::new(
            llm,
            FallbackClassifier::default_rules(),
            ClassifierConfig::default(),
        )
    }

    // ── Parsing ─────────────────────────────────────────────────────

    #[test]
    fn parse_produtivo() {
        assert_eq!(
            parse_label("PRODUTIVO"),
            RemoteVerdict::Label(ClassificationLabel::Actionable)
        );
        assert_eq!(
            parse_label("  produtivo.\n"),
            RemoteVerdict::Label(ClassificationLabel::Actionable)
        );
    }

    #[test]
    fn parse_improdutivo_not_shadowed_by_produtivo() {
        assert_eq!(
            parse_label("IMPRODUTIVO"),
            RemoteVerdict::Label(ClassificationLabel::NonActionable)
        );
        assert_eq!(
            parse_label("Classificação: improdutivo"),
            RemoteVerdict::Label(ClassificationLabel::NonActionable)
        );
    }

    #[test]
    fn parse_english_tokens() {
        assert_eq!(
            parse_label("non_actionable"),
            RemoteVerdict::Label(ClassificationLabel::NonActionable)
        );
        assert_eq!(
            parse_label("Actionable"),
            RemoteVerdict::Label(ClassificationLabel::Actionable)
        );
    }

    #[test]
    fn parse_non_actionable_spellings() {
        for raw in ["NON_ACTIONABLE", "non-actionable", "Non Actionable", "NON ACTIONABLE."] {
            assert_eq!(
                parse_label(raw),
                RemoteVerdict::Label(ClassificationLabel::NonActionable),
                "wrong verdict for {raw:?}"
            );
        }
    }

    #[test]
    fn parse_ambiguous_resolves_actionable() {
        let verdict = parse_label("FINANCEIRO");
        assert_eq!(verdict, RemoteVerdict::Ambiguous);
        assert_eq!(verdict.resolve(), ClassificationLabel::Actionable);
        assert_eq!(parse_label("").resolve(), ClassificationLabel::Actionable);
    }

    // ── Prompts ─────────────────────────────────────────────────────

    #[test]
    fn system_prompt_enumerates_taxonomy() {
        let prompt = build_classification_system_prompt();
        assert!(prompt.contains("PRODUTIVO"));
        assert!(prompt.contains("IMPRODUTIVO"));
        assert!(prompt.contains("Exemplos"));
    }

    #[test]
    fn user_prompt_carries_text_and_cue() {
        let prompt = build_classification_user_prompt("Preciso da fatura");
        assert!(prompt.starts_with("Classifique"));
        assert!(prompt.contains("Preciso da fatura"));
        assert!(prompt.ends_with("Classificação:"));
    }

    // ── Classification paths ────────────────────────────────────────

    #[tokio::test]
    async fn no_provider_uses_rules() {
        let classifier = classifier_with(None);
        let decided = classifier
            .classify_decided("Muito obrigado pela ajuda, tenham um bom dia!")
            .await;
        assert_eq!(decided.value, ClassificationLabel::NonActionable);
        assert_eq!(decided.engine, crate::pipeline::types::Engine::Fallback);
    }

    #[tokio::test]
    async fn remote_label_is_used() {
        let llm = Arc::new(MockLabelLlm::new("IMPRODUTIVO"));
        let classifier = classifier_with(Some(llm.clone() as Arc<dyn LlmProvider>));

        // Rules alone would say actionable here; the remote answer wins.
        let decided = classifier.classify_decided("Erro urgente no sistema").await;
        assert_eq!(decided.value, ClassificationLabel::NonActionable);
        assert_eq!(decided.engine, crate::pipeline::types::Engine::Remote);
    }

    #[tokio::test]
    async fn remote_request_is_short_and_cool() {
        let llm = Arc::new(MockLabelLlm::new("PRODUTIVO"));
        let classifier = classifier_with(Some(llm.clone() as Arc<dyn LlmProvider>));
        classifier.classify("Preciso da fatura").await;

        let request = llm.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.max_tokens, Some(10));
        assert_eq!(request.temperature, Some(0.1));
        assert_eq!(request.top_p, Some(0.9));
        assert_eq!(request.messages.len(), 2);
        assert!(request.messages[1].content.contains("Preciso da fatura"));
    }

    #[tokio::test]
    async fn ambiguous_remote_answer_is_actionable() {
        let llm: Arc<dyn LlmProvider> = Arc::new(MockLabelLlm::new("Que delicioso!"));
        let classifier = classifier_with(Some(llm));
        let decided = classifier.classify_decided("Obrigado!").await;
        assert_eq!(decided.value, ClassificationLabel::Actionable);
        assert_eq!(decided.engine, crate::pipeline::types::Engine::Remote);
    }

    #[tokio::test]
    async fn remote_failure_matches_rules() {
        let llm: Arc<dyn LlmProvider> = Arc::new(FailingLlm);
        let classifier = classifier_with(Some(llm));

        for text in [
            "Muito obrigado pela ajuda, tenham um bom dia!",
            "Preciso urgentemente da fatura de agosto, podem me ajudar?",
            "lorem ipsum",
            "",
        ] {
            let decided = classifier.classify_decided(text).await;
            assert_eq!(decided.value, classify_fallback(text), "mismatch for {text:?}");
            assert_eq!(decided.engine, crate::pipeline::types::Engine::Fallback);
        }
    }
}
