use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::debug;

use ldap2json::console::{CommandCompleter, Console, EditorLineSource};
use ldap2json::file_utils::read_document;
use ldap2json::logging::{init_logging, Verbosity};
use ldap2json::query::enumerate_paths;

/// Interactively query a JSON document produced by ldap2json.
#[derive(Parser, Debug)]
#[command(version, about)]
struct AnalysisCli {
    /// LDAP json file.
    #[arg(short, long, env = "LDAP2JSON_FILE")]
    file: String,

    /// Debug mode.
    #[arg(short, long)]
    debug: bool,

    /// Don't color the output.
    #[arg(long)]
    no_color: bool,
}

fn print_error(message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Red)).set_intense(true);
    let _ = stderr.set_color(&spec);
    let _ = writeln!(stderr, "[!] {}", message);
    let _ = stderr.reset();
}

fn main() -> ExitCode {
    let cli = AnalysisCli::parse();
    init_logging(Verbosity::from_flags(false, cli.debug));

    print!("[>] Loading {} ... ", cli.file);
    let _ = std::io::stdout().flush();
    let tree = match read_document(&cli.file) {
        Ok(tree) => tree,
        Err(err) => {
            println!();
            print_error(&err.to_string());
            return ExitCode::FAILURE;
        }
    };
    println!("done.");
    debug!(objects = enumerate_paths(tree.root()).len(), file = %cli.file, "document loaded");

    let color = !cli.no_color;
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };

    let mut input = match EditorLineSource::new(CommandCompleter::new(), color) {
        Ok(input) => input,
        Err(err) => {
            print_error(&format!("Could not start the line editor: {}", err));
            return ExitCode::FAILURE;
        }
    };

    let mut console = Console::new(&tree, StandardStream::stdout(choice)).with_debug(cli.debug);
    match console.run(&mut input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(&err.to_string());
            ExitCode::FAILURE
        }
    }
}
