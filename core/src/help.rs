//! Help text for the console commands.
//!
//! Two levels of detail:
//!
//! 1. **Overview** (`help`) lists every command with a summary line
//! 2. **Command help** (`help update`) shows usage for one command


/// Generate help text for a given topic.
///
/// - `None` yields the command overview
/// - `Some("update")` yields detailed help for `update`
pub fn help_text(topic: Option<&str>) -> String {
    match topic {
        None => overview(),
        Some(t) => match command_help(t) {
            Some(text) => text,
            None => format!(
                "Unknown help topic: '{}'. Type 'help' for the command list.",
                t
            ),
        },
    }
}


/// Top-level overview of all commands.
fn overview() -> String {
    "\
Documented commands (type help <command>):

  create   Make a new instance and print its id
  show     Print one stored instance
  destroy  Delete an instance
  update   Set attributes on an instance
  all      List stored instances
  count    Count instances of one type
  quit     Leave the console
  EOF      Leave the console, printing a blank line first

Every command also accepts the method form <Type>.<command>(...)."
        .into()
}


/// Detailed help for a specific command.
fn command_help(command: &str) -> Option<String> {
    let text = match command {
        "create" => "\
Usage: create <Type>  |  <Type>.create()

Makes a new instance of the named type, saves the store to disk,
and prints the new instance id.",

        "show" => "\
Usage: show <Type> <id>  |  <Type>.show(<id>)

Prints the string form of one stored instance.",

        "destroy" => "\
Usage: destroy <Type> <id>  |  <Type>.destroy(<id>)

Deletes the instance and saves the store to disk. Prints nothing
on success.",

        "update" => "\
Usage: update <Type> <id> <attr> <value>  |  <Type>.update(<id>, <attr>, <value>)

Sets one attribute and refreshes the instance's updated_at stamp.
The pair form stores the value as text, with one surrounding quote
layer removed.

A mapping sets several attributes at once, keeping each literal's
type (text, integer, or float):

  <Type>.update(<id>, {'attr': value, ...})
  update <Type> <id> {'attr': value, ...}

The fields id, created_at, and updated_at cannot be assigned.",

        "all" => "\
Usage: all [<Type>]  |  <Type>.all()

Prints every stored instance, one per line, in storage order.
With a type, only instances of that type are listed.",

        "count" => "\
Usage: count <Type>  |  <Type>.count()

Prints the number of stored instances of the named type.",

        "quit" => "\
Usage: quit

Leaves the console without printing anything.",

        "EOF" => "\
Usage: EOF

Leaves the console after printing a blank line. End of input
(Ctrl-D) behaves the same way.",

        "help" => "\
Usage: help [<command>]

With no argument, shows the command overview. With a command name,
shows detailed usage for that command.",

        _ => return None,
    };
    Some(text.into())
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
