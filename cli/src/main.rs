//! The lodgebook console: an interactive shell over the entity store.
//!
//! # Session
//!
//! ```text
//! $ lodgebook
//! (lodgebook) create User
//! 49faff9a-6318-451f-87b6-910505c55907
//! (lodgebook) User.count()
//! 1
//! (lodgebook) quit
//! ```

mod logging;

use std::io::{self, BufRead, Write};
use std::process;

use log::debug;

use lodgebook_core::dispatch::{Dispatcher, Response};
use lodgebook_core::help::help_text;
use lodgebook_core::model::registry::EntityRegistry;
use lodgebook_core::parse::{parse_line, unknown_syntax, ParsedLine};
use lodgebook_core::settings::{self, Settings};
use lodgebook_core::store::ObjectStore;


const PROMPT: &str = "(lodgebook) ";


fn main() {
    if let Err(message) = run() {
        eprintln!("lodgebook: {}", message);
        process::exit(1);
    }
}


fn run() -> Result<(), String> {
    let settings = Settings::load(&settings::resolve_config_path())?;
    let _logger = logging::init(&settings)?;
    debug!("using data file {}", settings.data_file.display());

    let registry = EntityRegistry::builtin();
    let mut store = ObjectStore::new(&settings.data_file);
    store.load(&registry).map_err(|e| e.to_string())?;
    let mut dispatcher = Dispatcher::new(registry, store);

    session(
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
        &mut dispatcher,
    )
}


/// Prompt-read-dispatch loop. Returns when the session ends; storage
/// failures abort it.
fn session(
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    dispatcher: &mut Dispatcher,
) -> Result<(), String> {
    let mut line = String::new();
    loop {
        write!(out, "{}", PROMPT).map_err(io_failure)?;
        out.flush().map_err(io_failure)?;

        line.clear();
        let read = input.read_line(&mut line).map_err(io_failure)?;
        if read == 0 {
            // End of input behaves like the EOF command.
            writeln!(out).map_err(io_failure)?;
            return Ok(());
        }

        match parse_line(&line) {
            ParsedLine::Empty => {}
            ParsedLine::Quit => return Ok(()),
            ParsedLine::Eof => {
                writeln!(out).map_err(io_failure)?;
                return Ok(());
            }
            ParsedLine::Help(topic) => {
                writeln!(out, "{}", help_text(topic.as_deref())).map_err(io_failure)?;
            }
            ParsedLine::Unknown => {
                writeln!(out, "{}", unknown_syntax(line.trim())).map_err(io_failure)?;
            }
            ParsedLine::Request(request) => {
                match dispatcher.execute(request).map_err(|e| e.to_string())? {
                    Response::Ok { output } => {
                        if !output.is_empty() {
                            writeln!(out, "{}", output).map_err(io_failure)?;
                        }
                    }
                    Response::Error { message } => {
                        writeln!(out, "{}", message).map_err(io_failure)?;
                    }
                }
            }
        }
    }
}


fn io_failure(e: io::Error) -> String {
    format!("console I/O failed: {}", e)
}
