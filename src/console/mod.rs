pub mod command;
pub mod completer;
pub mod line_source;
pub mod session;

pub use command::{parse_command_line, Command};
pub use completer::CommandCompleter;
pub use line_source::{EditorLineSource, LineRead, LineSource, ScriptedLineSource};
pub use session::{Console, ConsoleState};
