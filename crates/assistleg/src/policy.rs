/// Decides whether a question needs retrieved context
pub trait RetrievalPolicy: Send + Sync {
    fn should_retrieve(&self, question: &str) -> bool;
}

impl<F> RetrievalPolicy for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn should_retrieve(&self, question: &str) -> bool {
        self(question)
    }
}

/// Terms that usually mean a question is about a specific legal text
pub const DEFAULT_TRIGGER_TERMS: &[&str] = &[
    "ley",
    "norma",
    "artículo",
    "buscar",
    "contrato",
    "empleador",
    "empleado",
];

/// Retrieve when the lower-cased question contains any trigger term
#[derive(Debug, Clone)]
pub struct KeywordTrigger {
    terms: Vec<String>,
}

impl KeywordTrigger {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

impl Default for KeywordTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_TERMS)
    }
}

impl RetrievalPolicy for KeywordTrigger {
    fn should_retrieve(&self, question: &str) -> bool {
        let question = question.to_lowercase();
        self.terms.iter().any(|term| question.contains(term.as_str()))
    }
}

/// Retrieve for every question
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetrieve;

impl RetrievalPolicy for AlwaysRetrieve {
    fn should_retrieve(&self, _question: &str) -> bool {
        true
    }
}
