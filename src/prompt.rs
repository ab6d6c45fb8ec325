//! Prompt construction.  A [`PromptBuilder`] carries the fixed model settings
//! and turns extracted text plus an optional subject name into a
//! [`PromptSpec`] ready for the completion client.

use serde::Serialize;

/// Default model identifier on the completion API.
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.5;

/// Upper bound on the length of a named summary, in words.
pub const WORD_BUDGET: usize = 270;

/// System instruction used when no subject name is supplied.
pub const GENERIC_INSTRUCTION: &str =
    "You are an assistant that summarizes text for a business newsletter. \
     Write a concise, professional summary of the content provided.";

/// Everything the completion client needs for one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptSpec {
    pub system_instruction: String,
    pub user_message: String,
    pub model: String,
    pub temperature: f64,
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    model: String,
    temperature: f64,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL, DEFAULT_TEMPERATURE)
    }
}

impl PromptBuilder {
    pub fn new(model: impl Into<String>, temperature: f64) -> Self {
        Self {
            model: model.into(),
            temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the prompt for `content`.  With a subject the instruction is the
    /// individual-achievements template, otherwise the generic newsletter one.
    /// `content` becomes the user message verbatim.
    pub fn build(&self, subject: Option<&str>, content: String) -> PromptSpec {
        let system_instruction = match subject {
            Some(name) => named_instruction(name),
            None => GENERIC_INSTRUCTION.to_string(),
        };
        PromptSpec {
            system_instruction,
            user_message: content,
            model: self.model.clone(),
            temperature: self.temperature,
        }
    }
}

fn named_instruction(name: &str) -> String {
    format!(
        "You are an assistant that writes polished newsletter summaries \
         of quarterly individual achievements.\n\
         The person's name is {name}.\n\n\
         The input contains flat, field-wise labeled text \
         (e.g., Go-Lives:, Feedback:, Achievements:) \
         describing this individual's accomplishments.\n\n\
         Generate a professional summary that:\n\
         - Begins with the individual's name (e.g., '{name}'s Q2 Highlights:')\n\
         - Uses bullet points\n\
         - Labels each section with the field headers exactly as they appear in the input \
         (e.g., Go-Lives:)\n\
         - Skips any sections that are empty or irrelevant\n\
         - Keeps the length under {budget} words\n\
         - Writes in the third-person point of view, focused only on {name}\n\
         - Never uses first-person plural pronouns and never refers to a team or group\n\
         - Does NOT group content under invented categories like 'Successes' or 'Looking Ahead'; \
         use the provided field labels only\n\
         - Uses plain text only, with no markdown or other rich-text formatting \
         such as bold or italics\n\n\
         Treat all content as attributed solely to {name}. Do not imply team involvement.",
        name = name,
        budget = WORD_BUDGET,
    )
}
