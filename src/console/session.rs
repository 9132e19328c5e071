use std::io;

use itertools::Itertools;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use termcolor::{Color, ColorSpec, WriteColor};

use super::command::{parse_command_line, Command, COMMANDS};
use super::line_source::{LineRead, LineSource};
use crate::file_format::{
    dn::dn_to_path,
    tree::{Tree, TreeNode},
    value::value_as_text,
};
use crate::query::{
    path_store::resolve,
    search::{search_by_name, search_by_value, SearchResult},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConsoleState {
    Running,
    Terminated,
}

/// The interactive query loop over one loaded tree.  All of its state, the
/// search base included, belongs to the console and only changes between
/// reads.
pub struct Console<'t, W: WriteColor> {
    tree: &'t Tree,
    base: Vec<String>,
    state: ConsoleState,
    debug: bool,
    out: W,
}

fn colored(color: Color) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_intense(true);
    spec
}

impl<'t, W: WriteColor> Console<'t, W> {
    pub fn new(tree: &'t Tree, out: W) -> Self {
        Self {
            tree,
            base: vec![],
            state: ConsoleState::Running,
            debug: false,
            out,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn state(&self) -> ConsoleState {
        self.state
    }

    /// Root-to-leaf components of the current search base.
    pub fn search_base(&self) -> &[String] {
        &self.base
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// `[<base, root first>]> `
    pub fn prompt(&self) -> String {
        format!("[{}]> ", self.base.join(","))
    }

    /// Read and execute lines until `exit`, end-of-input or an interrupt.
    pub fn run<S: LineSource + ?Sized>(&mut self, input: &mut S) -> io::Result<()> {
        while self.state == ConsoleState::Running {
            match input.read_line(&self.prompt())? {
                LineRead::Line(line) => self.execute_line(&line)?,
                LineRead::Interrupted | LineRead::Eof => {
                    writeln!(self.out)?;
                    self.state = ConsoleState::Terminated;
                }
            }
        }
        Ok(())
    }

    pub fn execute_line(&mut self, line: &str) -> io::Result<()> {
        self.execute(parse_command_line(line))
    }

    pub fn execute(&mut self, command: Command) -> io::Result<()> {
        match command {
            Command::SearchBase(dn) => self.set_search_base(&dn),
            Command::ObjectByDn(dn) => self.object_by_dn(&dn),
            Command::ObjectByPropertyName(name) => {
                let results = self.search_in_base(|node| search_by_name(node, &name));
                self.print_results(&results, "No such property found.")
            }
            Command::ObjectByPropertyValue(value) => {
                let results = self.search_in_base(|node| search_by_value(node, &value));
                self.print_results(&results, "No property with specified value found.")
            }
            Command::Help => self.print_help(),
            Command::Exit => {
                self.state = ConsoleState::Terminated;
                Ok(())
            }
            Command::Empty => Ok(()),
            Command::Unknown(_) => writeln!(self.out, "Unknown command. Type 'help' for help."),
        }
    }

    fn set_search_base(&mut self, dn: &str) -> io::Result<()> {
        let mut base = dn_to_path(dn);
        if resolve(self.tree, &base).is_none() {
            // Accept a base typed root-first, the way the prompt shows it.
            let root_first: Vec<String> = base.iter().rev().cloned().collect();
            if resolve(self.tree, &root_first).is_some() {
                base = root_first;
            }
        }
        self.base = base;

        debug!(searchbase = %self.base.join(","), "changed searchbase");
        if self.debug {
            writeln!(self.out, "[debug] Changed searchbase to {}", self.base.join(","))?;
        }
        Ok(())
    }

    fn object_by_dn(&mut self, dn: &str) -> io::Result<()> {
        let path = dn_to_path(dn);
        let node = match resolve(self.tree, &path) {
            Some(node) => node,
            None => {
                debug!(dn, "no object at dn");
                return Ok(());
            }
        };

        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut self.out, formatter);
        node.serialize(&mut ser)?;
        writeln!(self.out)
    }

    /// Run `search` on the node at the search base; nothing is found when the
    /// base doesn't resolve.
    fn search_in_base<F>(&self, search: F) -> Vec<SearchResult>
    where
        F: FnOnce(&TreeNode) -> Vec<SearchResult>,
    {
        match resolve(self.tree, &self.base) {
            Some(node) => search(node),
            None => vec![],
        }
    }

    fn print_results(&mut self, results: &[SearchResult], not_found: &str) -> io::Result<()> {
        if results.is_empty() {
            self.out.set_color(&colored(Color::Red))?;
            write!(self.out, "{}", not_found)?;
            self.out.reset()?;
            return writeln!(self.out);
        }

        for result in results {
            // Most specific component first, like a DN.
            let dn = result
                .path
                .iter()
                .rev()
                .chain(self.base.iter().rev())
                .join(",");

            write!(self.out, "[")?;
            self.out.set_color(&colored(Color::Yellow))?;
            write!(self.out, "{}", dn)?;
            self.out.reset()?;
            write!(self.out, "] => ")?;
            self.out.set_color(&colored(Color::Blue))?;
            write!(self.out, "{}", result.property)?;
            self.out.reset()?;
            write!(self.out, "\n - ")?;
            self.out.set_color(&colored(Color::Green))?;
            write!(self.out, "{}", value_as_text(&result.value))?;
            self.out.reset()?;
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn print_help(&mut self) -> io::Result<()> {
        for (name, description) in COMMANDS {
            writeln!(self.out, " - {:<15} {}", name, description)?;
        }
        Ok(())
    }
}
