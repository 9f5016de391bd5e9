//! Prompt templates for retrieval-augmented answering

/// Instructions that keep the model inside the retrieved context
pub const GROUNDING_INSTRUCTIONS: &str = "You are a helpful assistant. Answer the question using ONLY the information in the context below. \
If the context does not contain the answer, say explicitly that the answer is not in the provided context. \
Do not use outside knowledge.";

/// Stand-in for the context block when retrieval found nothing
pub const NO_CONTEXT_NOTICE: &str = "No relevant context was found. State that you cannot answer from the stored documents.";

/// Build the grounded prompt for a question
///
/// An empty `context` is replaced by [`NO_CONTEXT_NOTICE`] so the model is
/// told explicitly that nothing was retrieved.
pub fn rag_prompt(context: &str, question: &str) -> String {
    let context = if context.trim().is_empty() {
        NO_CONTEXT_NOTICE
    } else {
        context
    };

    format!(
        "{}\n\nContext:\n---\n{}\n---\n\nQuestion: {}\n\nAnswer:",
        GROUNDING_INSTRUCTIONS, context, question
    )
}
