//! Built-in demo corpus and question.

/// Sentences indexed when no documents are supplied.
pub const SENTENCES: [&str; 4] = [
    "How are you?",
    "What did you do today?",
    "What did you have for dinner?",
    "What's on your agenda?",
];

/// Question asked when none is supplied.
pub const QUESTION: &str = "What did you have for dinner?";
