use serde::{Deserialize, Serialize};

/// Guidance spoken during a session, in order, wrapping around.
pub const BREATHING_PROMPTS: [&str; 8] = [
    "Breathe in slowly... feel your lungs expand",
    "Hold gently... embrace the stillness",
    "Release slowly... let go of all tension",
    "Find your center... you are present",
    "Inhale peace... exhale worry",
    "You are safe... you are calm",
    "Feel the warmth within... let it spread",
    "Each breath brings healing... each moment is yours",
];

/// Spoken once, shortly after the first start of a session.
pub const WELCOME_PROMPT: &str = "Welcome to your meditation. Close your eyes and breathe.";

/// Elapsed seconds between two prompts.
pub const PROMPT_INTERVAL_SECS: u64 = 30;

/// A prompt that came due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuePrompt {
    /// Position in the prompt list.
    pub index: usize,
    pub text: String,
    pub elapsed_secs: u64,
}

/// Cursor over a cyclic prompt list, gated on elapsed session time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptQueue {
    prompts: Vec<String>,
    /// Count of prompts fired so far; the list index is this modulo length.
    cursor: usize,
    /// Elapsed seconds at which the last prompt fired.
    last_spoken_mark: u64,
}

impl PromptQueue {
    /// An empty list never yields a prompt.
    pub fn new(prompts: Vec<String>) -> Self {
        Self {
            prompts,
            cursor: 0,
            last_spoken_mark: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn last_spoken_mark(&self) -> u64 {
        self.last_spoken_mark
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Check for a due prompt at `elapsed_secs` and consume it.
    pub fn poll(&mut self, elapsed_secs: u64) -> Option<DuePrompt> {
        if self.prompts.is_empty() || elapsed_secs == 0 {
            return None;
        }
        if elapsed_secs.saturating_sub(self.last_spoken_mark) < PROMPT_INTERVAL_SECS {
            return None;
        }
        let index = self.cursor % self.prompts.len();
        self.cursor += 1;
        self.last_spoken_mark = elapsed_secs;
        Some(DuePrompt {
            index,
            text: self.prompts[index].clone(),
            elapsed_secs,
        })
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.last_spoken_mark = 0;
    }
}

impl Default for PromptQueue {
    fn default() -> Self {
        Self::new(BREATHING_PROMPTS.iter().map(|p| p.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_every_thirty_elapsed_seconds() {
        let mut q = PromptQueue::default();
        let fired: Vec<u64> = (1..=125).filter_map(|e| q.poll(e)).map(|p| p.elapsed_secs).collect();
        assert_eq!(fired, vec![30, 60, 90, 120]);
        assert_eq!(q.cursor(), 4);
        assert_eq!(q.last_spoken_mark(), 120);
    }

    #[test]
    fn same_boundary_never_fires_twice() {
        let mut q = PromptQueue::default();
        assert!(q.poll(30).is_some());
        assert!(q.poll(30).is_none());
        assert!(q.poll(59).is_none());
    }

    #[test]
    fn zero_elapsed_never_fires() {
        let mut q = PromptQueue::default();
        assert!(q.poll(0).is_none());
    }

    #[test]
    fn cursor_wraps_around_list() {
        let mut q = PromptQueue::new(vec!["a".into(), "b".into()]);
        let texts: Vec<String> = [30, 60, 90].iter().filter_map(|&e| q.poll(e)).map(|p| p.text).collect();
        assert_eq!(texts, vec!["a", "b", "a"]);
        assert_eq!(q.cursor(), 3);
    }

    #[test]
    fn reset_clears_cursor_and_mark() {
        let mut q = PromptQueue::default();
        q.poll(30);
        q.poll(60);
        q.reset();
        assert_eq!(q.cursor(), 0);
        assert_eq!(q.last_spoken_mark(), 0);
        assert_eq!(q.poll(30).map(|p| p.index), Some(0));
    }
}
