//! Instruction prompts for question-set generation.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the default behaviour (e.g. the
//!    pair format or what the model is told to skip) requires editing exactly
//!    one place.
//!
//! 2. **Testability** — unit tests can import and inspect prompts directly
//!    without a live model, so the prompt-reset invariant is easy to assert.
//!
//! Callers can override the default via
//! [`crate::config::GenerationConfig::instruction`]; the constants here are
//! used only when no override is provided.

/// Default instruction prefix prepended to each chunk's page text.
///
/// Every chunk's prompt is rebuilt from this prefix — prompts never carry
/// text over from a previous chunk.
pub const INSTRUCTION_PREFIX: &str = "\
You are a study assistant. Read the book excerpt that follows and write \
question/answer pairs covering its content. Output one pair per line in the \
form 'question;answer'. Do not number the pairs. Do not use semicolons \
inside a question or an answer. Do not add commentary before or after the \
pairs. Skip page headers, footers, and page numbers. Excerpt:";

/// Fallback content returned when no page in the requested span has any
/// extractable text (e.g. scanned-image PDFs with no text layer).
///
/// Deliberately a successful result, not an error: the caller gets a file
/// explaining the outcome instead of a failed request.
pub const NO_TEXT_FALLBACK: &str =
    "unable to generate questions: the selected pages contain no extractable text";

/// Build the prompt for one chunk: instruction prefix + a space + the
/// chunk's concatenated page text.
pub fn chunk_prompt(instruction: &str, chunk_text: &str) -> String {
    format!("{} {}", instruction, chunk_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_prompt_prepends_instruction() {
        let p = chunk_prompt(INSTRUCTION_PREFIX, "page one text");
        assert!(p.starts_with(INSTRUCTION_PREFIX));
        assert!(p.ends_with("page one text"));
    }

    #[test]
    fn instruction_demands_semicolon_pairs() {
        // The sanitiser assumes the model was told to use 'question;answer'.
        assert!(INSTRUCTION_PREFIX.contains("question;answer"));
        assert!(INSTRUCTION_PREFIX.contains("Do not number"));
    }
}
