//! Menu and prompt capabilities injected by the front end
//!
//! Spell effects that need a player decision (pick a gate, name a gate) call
//! out through [`Selector`]; the core never draws anything itself.

use std::collections::VecDeque;

/// "Choose one of N labeled options" and "type a short string"
pub trait Selector {
    /// Index of the chosen option, `None` if canceled or `options` is empty
    fn select(&mut self, title: &str, options: &[String]) -> Option<usize>;

    /// Free text entry, `None` if canceled
    fn query_string(&mut self, title: &str) -> Option<String>;
}

/// A selector that replays pre-recorded answers, for tests and scripted runs
#[derive(Debug, Clone, Default)]
pub struct ScriptedSelector {
    choices: VecDeque<Option<usize>>,
    strings: VecDeque<Option<String>>,
    /// Titles of every menu and prompt shown, in order
    pub shown: Vec<String>,
}

impl ScriptedSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_choice(mut self, choice: Option<usize>) -> Self {
        self.choices.push_back(choice);
        self
    }

    pub fn with_string(mut self, answer: Option<&str>) -> Self {
        self.strings.push_back(answer.map(str::to_string));
        self
    }
}

impl Selector for ScriptedSelector {
    fn select(&mut self, title: &str, options: &[String]) -> Option<usize> {
        self.shown.push(title.to_string());
        let choice = self.choices.pop_front().flatten()?;
        (choice < options.len()).then_some(choice)
    }

    fn query_string(&mut self, title: &str) -> Option<String> {
        self.shown.push(title.to_string());
        self.strings.pop_front().flatten()
    }
}
