use std::borrow::Cow;

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use super::command::COMMANDS;

/// Completion over the whole line: command names until a space has been
/// typed, then that command's argument vocabulary.
#[derive(Clone, Debug)]
pub struct CommandCompleter {
    options: Vec<(String, Vec<String>)>,
}

impl Default for CommandCompleter {
    fn default() -> Self {
        Self {
            // No command has an argument vocabulary yet.
            options: COMMANDS
                .iter()
                .map(|(name, _)| (name.to_string(), vec![]))
                .collect(),
        }
    }
}

impl CommandCompleter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_argument_vocabulary(mut self, command: &str, words: Vec<String>) -> Self {
        if let Some((_, vocabulary)) = self.options.iter_mut().find(|(name, _)| name == command) {
            *vocabulary = words;
        }
        self
    }

    /// Full-line replacements for `text`, each followed by a space.
    pub fn candidates(&self, text: &str) -> Vec<String> {
        match text.matches(' ').count() {
            0 => self
                .options
                .iter()
                .filter(|(name, _)| name.starts_with(text))
                .map(|(name, _)| format!("{} ", name))
                .collect(),
            1 => {
                let (command, remainder) = match text.split_once(' ') {
                    Some(split) => split,
                    None => return vec![],
                };
                self.options
                    .iter()
                    .find(|(name, _)| name == command)
                    .map(|(_, vocabulary)| {
                        vocabulary
                            .iter()
                            .filter(|word| !word.is_empty() && word.starts_with(remainder))
                            .map(|word| format!("{} {} ", command, word))
                            .collect()
                    })
                    .unwrap_or_default()
            }
            _ => vec![],
        }
    }
}

/// The line-editor helper the console hands to rustyline.  It owns the
/// completer and colors the search base inside the prompt.
pub struct ConsoleHelper {
    completer: CommandCompleter,
    color: bool,
}

impl ConsoleHelper {
    pub fn new(completer: CommandCompleter, color: bool) -> Self {
        Self { completer, color }
    }
}

impl Completer for ConsoleHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let text = &line[..pos];
        let pairs = self
            .completer
            .candidates(text)
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.trim_end().to_string(),
                replacement: candidate,
            })
            .collect();
        Ok((0, pairs))
    }
}

impl Hinter for ConsoleHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ConsoleHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        if !self.color {
            return Cow::Borrowed(prompt);
        }
        match (prompt.strip_prefix('['), prompt.rfind("]> ")) {
            (Some(_), Some(end)) => Cow::Owned(format!(
                "[\x1b[95m{}\x1b[0m{}",
                &prompt[1..end],
                &prompt[end..]
            )),
            _ => Cow::Borrowed(prompt),
        }
    }
}

impl Validator for ConsoleHelper {}

impl Helper for ConsoleHelper {}
