//! Rule-based fallback classifier.
//!
//! Deterministic keyword scoring used whenever the remote service is not
//! configured or fails:
//! - actionable keywords add 1, high-signal ones (problema, erro, urgente, ...) add 2
//! - courtesy keywords add 1 to the non-actionable side
//! - a keyword contained in a longer matched keyword of the same side
//!   (`urgent` in `urgente`, `erro` in `error`) is not counted again
//! - a `?` or an interrogative/need word adds 1 to the actionable side
//! - short messages that already look like courtesy get 1 more non-actionable point
//!
//! Ties, including 0–0, resolve to ACTIONABLE so a message that might need
//! a reply is never dropped silently.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::pipeline::types::ClassificationLabel;

/// Actionable keywords, matched as substrings of the lower-cased text.
const ACTIONABLE_KEYWORDS: &[&str] = &[
    "problema",
    "erro",
    "urgente",
    "suporte",
    "crítico",
    "pedido",
    "dúvida",
    "informação",
    "reunião",
    "projeto",
    "senha",
    "fatura",
    "solicitação",
    "prazo",
    "relatório",
    "acesso",
    "problem",
    "error",
    "urgent",
    "support",
    "critical",
    "request",
    "issue",
    "invoice",
    "meeting",
    "password",
    "deadline",
    "asap",
];

/// Actionable keywords that weigh 2 instead of 1.
const HIGH_SIGNAL_KEYWORDS: &[&str] = &[
    "problema", "erro", "urgente", "suporte", "crítico", "problem", "error", "urgent", "support",
    "critical",
];

/// Courtesy/social keywords, matched as substrings of the lower-cased text.
const NON_ACTIONABLE_KEYWORDS: &[&str] = &[
    "feliz",
    "parabéns",
    "aniversário",
    "feriado",
    "obrigado",
    "obrigada",
    "agradeço",
    "cumprimento",
    "bom dia",
    "boa tarde",
    "boa noite",
    "abraço",
    "happy",
    "congratulations",
    "birthday",
    "holiday",
    "thank you",
    "thanks",
    "good morning",
    "have a nice day",
];

/// Messages with fewer words than this count as short.
const SHORT_MESSAGE_WORDS: usize = 10;

static INTERROGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(como|quando|onde|por que|qual|preciso|precisamos|how|when|where|why|what|need)\b",
    )
    .unwrap()
});

static DEFAULT_CLASSIFIER: LazyLock<FallbackClassifier> =
    LazyLock::new(FallbackClassifier::default_rules);

/// Which side of the tally a keyword feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordSide {
    Actionable,
    NonActionable,
}

/// A single weighted keyword.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    /// Lower-case keyword, matched as a substring.
    pub keyword: String,
    pub side: KeywordSide,
    pub weight: u32,
}

impl KeywordRule {
    /// True when `other` is a longer keyword on the same side that contains this one.
    fn is_subsumed_by(&self, other: &KeywordRule) -> bool {
        self.side == other.side
            && other.keyword.len() > self.keyword.len()
            && other.keyword.contains(self.keyword.as_str())
    }
}

/// Accumulated scores for one message. Consumed once by `decide`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreTally {
    pub actionable_score: u32,
    pub non_actionable_score: u32,
}

impl ScoreTally {
    /// Higher score wins; a tie (including 0–0) is ACTIONABLE.
    pub fn decide(self) -> ClassificationLabel {
        if self.non_actionable_score > self.actionable_score {
            ClassificationLabel::NonActionable
        } else {
            ClassificationLabel::Actionable
        }
    }
}

/// Keyword scorer with heuristic boosts.
pub struct FallbackClassifier {
    rules: Vec<KeywordRule>,
    question_boost: bool,
    short_message_boost: bool,
}

impl FallbackClassifier {
    /// Create a classifier with the built-in Portuguese/English keyword sets.
    pub fn default_rules() -> Self {
        let actionable = ACTIONABLE_KEYWORDS.iter().map(|k| KeywordRule {
            keyword: (*k).to_string(),
            side: KeywordSide::Actionable,
            weight: if HIGH_SIGNAL_KEYWORDS.contains(k) { 2 } else { 1 },
        });
        let non_actionable = NON_ACTIONABLE_KEYWORDS.iter().map(|k| KeywordRule {
            keyword: (*k).to_string(),
            side: KeywordSide::NonActionable,
            weight: 1,
        });

        Self {
            rules: actionable.chain(non_actionable).collect(),
            question_boost: true,
            short_message_boost: true,
        }
    }

    /// Create a classifier with no keywords and no boosts (for testing).
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            question_boost: false,
            short_message_boost: false,
        }
    }

    /// Add a custom keyword. Matching is case-insensitive.
    pub fn add_keyword(&mut self, keyword: &str, side: KeywordSide, weight: u32) {
        self.rules.push(KeywordRule {
            keyword: keyword.to_lowercase(),
            side,
            weight,
        });
    }

    /// Score a message without deciding.
    pub fn score(&self, text: &str) -> ScoreTally {
        let lowered = text.to_lowercase();
        let mut tally = ScoreTally::default();

        let matched: Vec<&KeywordRule> = self
            .rules
            .iter()
            .filter(|rule| lowered.contains(rule.keyword.as_str()))
            .collect();

        for rule in &matched {
            if matched.iter().any(|other| rule.is_subsumed_by(other)) {
                continue;
            }
            match rule.side {
                KeywordSide::Actionable => tally.actionable_score += rule.weight,
                KeywordSide::NonActionable => tally.non_actionable_score += rule.weight,
            }
        }

        if self.question_boost && (lowered.contains('?') || INTERROGATIVE.is_match(&lowered)) {
            tally.actionable_score += 1;
        }

        if self.short_message_boost
            && tally.non_actionable_score > 0
            && text.split_whitespace().count() < SHORT_MESSAGE_WORDS
        {
            tally.non_actionable_score += 1;
        }

        tally
    }

    /// Classify a message. Never fails.
    pub fn classify(&self, text: &str) -> ClassificationLabel {
        let tally = self.score(text);
        let label = tally.decide();
        debug!(
            actionable = tally.actionable_score,
            non_actionable = tally.non_actionable_score,
            label = label.as_str(),
            "Fallback classification"
        );
        label
    }
}

/// Classify with the built-in rules.
pub fn classify_fallback(text: &str) -> ClassificationLabel {
    DEFAULT_CLASSIFIER.classify(text)
}
