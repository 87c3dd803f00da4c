use crate::config::AssistantConfig;
use crate::dataset::load_entries_csv;
use crate::error::Result;
use crate::extract::extract_text;
use crate::generate::{generate, OllamaGenerator, TextGenerator, FALLBACK_APOLOGY};
use crate::matching::{find_best_match, DEFAULT_THRESHOLD};
use crate::model::{FaqEntry, MatchResult};
use std::path::Path;

pub const AI_RESPONSE_LABEL: &str = "AI Generated Response:";

/// Answers questions from the FAQ table, falling back to a text generator.
pub struct Assistant<G = OllamaGenerator> {
    entries: Vec<FaqEntry>,
    generator: G,
    threshold: u8,
}

impl Assistant<OllamaGenerator> {
    /// Fails on an unreadable or malformed dataset. The model service is not
    /// contacted here; call [`Assistant::health_check`] for that.
    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        config.validate()?;
        let entries = load_entries_csv(&config.dataset)?;
        let generator = OllamaGenerator::new(&config.host, &config.model, config.timeout())?;
        Ok(Self::new(entries, generator).with_threshold(config.threshold))
    }
}

impl<G: TextGenerator> Assistant<G> {
    pub fn new(entries: Vec<FaqEntry>, generator: G) -> Self {
        Self {
            entries,
            generator,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn health_check(&self) -> Result<()> {
        self.generator.health_check()
    }

    pub fn lookup(&self, query: &str) -> MatchResult {
        find_best_match(query, &self.entries, self.threshold)
    }

    pub fn respond(&self, query: &str, attachment: Option<&Path>) -> String {
        let context = attachment.map(extract_text).unwrap_or_default();

        let matched = self.lookup(query);
        if let (true, Some(category), Some(answer)) =
            (matched.is_hit(), &matched.category, &matched.answer)
        {
            return format!("Category: {category}\nAnswer: {answer}");
        }

        tracing::info!(score = matched.score, "no confident faq match, using llm");
        let reply = match generate(&self.generator, query, &context) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, "error generating llm response");
                FALLBACK_APOLOGY.to_string()
            }
        };
        format!("{AI_RESPONSE_LABEL}\n{reply}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::generate::mock::closed_port;
    use crate::generate::MAX_CONTEXT_CHARS;
    use std::cell::RefCell;
    use std::fs;
    use std::time::Duration;

    /// Records every prompt and answers with a fixed reply.
    #[derive(Default)]
    struct Recorder {
        prompts: RefCell<Vec<String>>,
    }

    impl TextGenerator for Recorder {
        fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok("generated".to_string())
        }
    }

    fn billing_table() -> Vec<FaqEntry> {
        vec![FaqEntry::new(
            "How do I pay my bill?",
            "Use the online portal.",
            "billing",
        )]
    }

    #[test]
    fn confident_match_returns_category_and_answer() {
        let assistant = Assistant::new(billing_table(), Recorder::default());
        let response = assistant.respond("how do i pay my bill", None);

        assert_eq!(response, "Category: billing\nAnswer: Use the online portal.");
        assert!(assistant.generator().prompts.borrow().is_empty());
    }

    #[test]
    fn unreachable_model_yields_labelled_apology() {
        let generator =
            OllamaGenerator::new(closed_port(), "llama3.2:3b", Some(Duration::from_secs(5)))
                .unwrap();
        let assistant = Assistant::new(billing_table(), generator);

        let response = assistant.respond("zebra quantum xylophone", None);
        assert_eq!(response, format!("AI Generated Response:\n{FALLBACK_APOLOGY}"));
    }

    #[test]
    fn text_attachment_reaches_the_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "patient has fever\n").unwrap();

        let assistant = Assistant::new(billing_table(), Recorder::default());
        let response = assistant.respond("what symptom is mentioned", Some(&path));

        assert_eq!(response, "AI Generated Response:\ngenerated");
        let prompts = assistant.generator().prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Context: patient has fever\n"));
        assert!(prompts[0].contains("Question: what symptom is mentioned"));
    }

    #[test]
    fn unsupported_attachment_behaves_like_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.docx");
        fs::write(&path, "patient has fever").unwrap();

        let with_docx = Assistant::new(billing_table(), Recorder::default());
        with_docx.respond("what symptom is mentioned", Some(&path));
        let without = Assistant::new(billing_table(), Recorder::default());
        without.respond("what symptom is mentioned", None);

        assert_eq!(
            *with_docx.generator().prompts.borrow(),
            *without.generator().prompts.borrow()
        );
    }

    #[test]
    fn unreadable_attachment_sends_empty_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, [0xff, 0xfe, 0xfd]).unwrap();

        let assistant = Assistant::new(billing_table(), Recorder::default());
        assistant.respond("what symptom is mentioned", Some(&path));

        let prompts = assistant.generator().prompts.borrow();
        assert_eq!(extract_text(&path), "");
        assert!(prompts[0].starts_with("Context: \n\nQuestion: what symptom is mentioned"));
    }

    #[test]
    fn long_attachment_is_truncated_in_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.txt");
        fs::write(&path, format!("{}TAIL", "y".repeat(MAX_CONTEXT_CHARS))).unwrap();

        let assistant = Assistant::new(billing_table(), Recorder::default());
        assistant.respond("unrelated question here", Some(&path));

        let prompts = assistant.generator().prompts.borrow();
        assert!(prompts[0].contains(&format!("{}...", "y".repeat(MAX_CONTEXT_CHARS))));
        assert!(!prompts[0].contains("TAIL"));
    }

    #[test]
    fn attachment_does_not_block_a_match() {
        let assistant = Assistant::new(billing_table(), Recorder::default());
        let response = assistant.respond("How do I pay my bill", Some(Path::new("/no/such.pdf")));
        assert!(response.starts_with("Category: billing"));
    }

    #[test]
    fn threshold_is_configurable() {
        let assistant = Assistant::new(billing_table(), Recorder::default()).with_threshold(100);
        assert_eq!(assistant.threshold(), 100);
        let response = assistant.respond("how do I pay the bill", None);
        assert!(response.starts_with(AI_RESPONSE_LABEL));
    }

    #[test]
    fn from_config_rejects_bad_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("faq.csv");
        fs::write(&dataset, "question,answer\nq,a\n").unwrap();

        let config = AssistantConfig {
            dataset,
            ..AssistantConfig::default()
        };
        assert!(matches!(
            Assistant::from_config(&config),
            Err(Error::MissingColumns(_))
        ));
    }
}
