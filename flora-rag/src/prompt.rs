//! Grounding prompt assembly.
//!
//! The prompt is rebuilt on every call and has four parts: a fixed
//! instruction header, a `Context:` section with one bullet per retrieved
//! document (separated by blank lines, in retrieval order), the question
//! verbatim, and an `Answer:` cue for the model to complete.
//!
//! ```text
//! You are a helpful assistant. Use only the provided context to answer the user's
//! question. If the answer is not in the context, say you don't know.
//!
//! Context:
//! - a red cat
//!
//! - a blue dog
//!
//! Question: What color is the cat?
//! Answer:
//! ```

/// Instruction header restricting the model to the supplied context.
pub const INSTRUCTIONS: &str = "You are a helpful assistant. Use only the provided context to answer the user's\nquestion. If the answer is not in the context, say you don't know.";

/// Marker placed before each context document.
pub const BULLET: &str = "- ";

/// Render documents as bullet lines separated by blank lines, in input order.
pub fn format_context<S: AsRef<str>>(documents: &[S]) -> String {
    documents
        .iter()
        .map(|doc| format!("{BULLET}{}", doc.as_ref()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the grounding prompt for `question` from `context_docs`.
///
/// Pure and deterministic. With no documents the `Context:` marker is kept
/// and the section is empty.
pub fn build_prompt<S: AsRef<str>>(question: &str, context_docs: &[S]) -> String {
    let context = format_context(context_docs);
    format!("{INSTRUCTIONS}\n\nContext:\n{context}\n\nQuestion: {question}\nAnswer:")
        .trim()
        .to_string()
}
