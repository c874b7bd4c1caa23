//! Asynchronous content prompts

/// What a prompt is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Rich footnote text
    Footnote,
    /// Plain cell text
    Cell,
}

/// A request shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub kind: PromptKind,
    pub title: String,
    /// Pre-filled content
    pub initial: String,
}

impl PromptRequest {
    pub fn new_footnote(number: usize) -> Self {
        Self {
            kind: PromptKind::Footnote,
            title: format!("Footnote {}", number),
            initial: String::new(),
        }
    }

    pub fn edit_footnote(number: u32, content: impl Into<String>) -> Self {
        Self {
            kind: PromptKind::Footnote,
            title: format!("Edit footnote {}", number),
            initial: content.into(),
        }
    }

    pub fn edit_cell(content: impl Into<String>) -> Self {
        Self {
            kind: PromptKind::Cell,
            title: "Edit cell".to_string(),
            initial: content.into(),
        }
    }
}

/// Asks the user for content.
///
/// `None` means the prompt was cancelled.
#[trait_variant::make(Send)]
pub trait ContentPrompt: Send + Sync {
    async fn prompt(&self, request: PromptRequest) -> Option<String>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Answers prompts from a script and records what was asked
    #[derive(Debug, Default)]
    pub struct ScriptedPrompt {
        answers: Mutex<VecDeque<Option<String>>>,
        pub requests: Mutex<Vec<PromptRequest>>,
    }

    impl ScriptedPrompt {
        pub fn answering(answers: impl IntoIterator<Item = Option<&'static str>>) -> Self {
            Self {
                answers: Mutex::new(answers.into_iter().map(|a| a.map(String::from)).collect()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl ContentPrompt for ScriptedPrompt {
        async fn prompt(&self, request: PromptRequest) -> Option<String> {
            self.requests.lock().unwrap().push(request);
            self.answers.lock().unwrap().pop_front().flatten()
        }
    }
}
