//! Commands from the line-oriented input source.

use std::str::FromStr;

use common::PersonId;

use crate::error::InputError;

pub const HELP: &str = "\
commands:
  add <name> <birthYear>   add a person
  remove <id>              remove the person with this id
  list                     print everyone
  help                     show this message
  quit                     exit";

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { name: String, birth_year: i32 },
    Remove(PersonId),
    List,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = InputError;

    /// Parses `add <name...> <birthYear>`, `remove <id>`, `list`, `help`,
    /// `quit`. Names may contain spaces; the last word is the birth year.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(InputError::Empty);
        };
        let args: Vec<&str> = words.collect();

        match verb.to_ascii_lowercase().as_str() {
            "add" => {
                let Some((year, name)) = args.split_last() else {
                    return Err(InputError::MissingArgument {
                        command: "add",
                        argument: "a name and a birth year",
                    });
                };
                if name.is_empty() {
                    return Err(InputError::MissingArgument {
                        command: "add",
                        argument: "a name",
                    });
                }
                let birth_year =
                    year.parse::<i32>()
                        .map_err(|source| InputError::InvalidBirthYear {
                            value: year.to_string(),
                            source,
                        })?;
                Ok(Command::Add {
                    name: name.join(" "),
                    birth_year,
                })
            }
            "remove" => match args.as_slice() {
                [id] => Ok(Command::Remove(id.parse::<PersonId>()?)),
                [] => Err(InputError::MissingArgument {
                    command: "remove",
                    argument: "an id",
                }),
                _ => Err(InputError::UnexpectedArgument { command: "remove" }),
            },
            "list" => no_args("list", &args, Command::List),
            "help" => no_args("help", &args, Command::Help),
            "quit" | "exit" => no_args("quit", &args, Command::Quit),
            other => Err(InputError::UnknownCommand(other.to_string())),
        }
    }
}

fn no_args(command: &'static str, args: &[&str], parsed: Command) -> Result<Command, InputError> {
    if args.is_empty() {
        Ok(parsed)
    } else {
        Err(InputError::UnexpectedArgument { command })
    }
}
