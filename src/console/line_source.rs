use std::collections::VecDeque;
use std::io;

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use super::completer::{CommandCompleter, ConsoleHelper};

/// Outcome of waiting for the next line of input.
#[derive(Clone, Debug, PartialEq)]
pub enum LineRead {
    Line(String),
    /// The user hit Ctrl-C while we were waiting.
    Interrupted,
    Eof,
}

/// Where console input comes from.  The prompt is passed as plain text; how
/// it is decorated is up to the implementation.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<LineRead>;
}

/// Interactive input through rustyline, with history and tab completion.
pub struct EditorLineSource {
    editor: Editor<ConsoleHelper, DefaultHistory>,
}

fn readline_to_io(err: ReadlineError) -> io::Error {
    match err {
        ReadlineError::Io(err) => err,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    }
}

impl EditorLineSource {
    pub fn new(completer: CommandCompleter, color: bool) -> io::Result<Self> {
        let mut editor: Editor<ConsoleHelper, DefaultHistory> =
            Editor::new().map_err(readline_to_io)?;
        editor.set_helper(Some(ConsoleHelper::new(completer, color)));
        Ok(Self { editor })
    }
}

impl LineSource for EditorLineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<LineRead> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor
                        .add_history_entry(line.as_str())
                        .map_err(readline_to_io)?;
                }
                Ok(LineRead::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(LineRead::Interrupted),
            Err(ReadlineError::Eof) => Ok(LineRead::Eof),
            Err(err) => Err(readline_to_io(err)),
        }
    }
}

/// Canned input, for driving the console without a terminal.  Runs out with
/// end-of-input.  The prompts it was shown are kept for inspection.
#[derive(Debug, Default)]
pub struct ScriptedLineSource {
    reads: VecDeque<LineRead>,
    prompts: Vec<String>,
}

impl ScriptedLineSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reads: lines.into_iter().map(|l| LineRead::Line(l.into())).collect(),
            prompts: vec![],
        }
    }

    /// Queue an interrupt after the lines queued so far.
    pub fn then_interrupt(mut self) -> Self {
        self.reads.push_back(LineRead::Interrupted);
        self
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl LineSource for ScriptedLineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<LineRead> {
        self.prompts.push(prompt.to_string());
        Ok(self.reads.pop_front().unwrap_or(LineRead::Eof))
    }
}
