//! Interactive person list application.
//!
//! Wires an [`EntityCollection`] to a [`ListView`] and drives the
//! collection from parsed input [`Command`]s, with structured logging
//! (tracing).

pub mod config;
pub mod error;
pub mod input;

use std::io::{self, BufRead, Write};

use collection::{EntityCollection, Person, PersonId};
use views::{HtmlSurface, JsonSurface, ListView, RenderSurface};

pub use config::{Config, OutputFormat};
pub use error::{AppError, InputError, Result};
pub use input::Command;

/// The sample person every fresh application starts with.
pub const SEED_PERSON: (&str, i32) = ("Nolan", 1992);

/// What executing a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(Person),
    /// `existed` is false when no person had this id; nothing changed.
    Removed { id: PersonId, existed: bool },
    Listed(Vec<Person>),
    Help,
    Quit,
}

/// A person list: one collection plus the view rendering it.
pub struct PersonListApp<S> {
    collection: EntityCollection,
    view: ListView<S>,
}

impl<S: RenderSurface + Send + 'static> PersonListApp<S> {
    /// Builds the collection, seeds it if configured, and attaches a view
    /// rendering into `surface`.
    pub fn new(config: &Config, surface: S) -> Self {
        let collection = EntityCollection::new();
        if config.seed {
            let (name, birth_year) = SEED_PERSON;
            collection.create(name, birth_year);
        }
        let view = ListView::new(&collection, config.view.clone(), surface);
        Self { collection, view }
    }
}

impl<S: RenderSurface> PersonListApp<S> {
    /// Adds a person and returns it with its assigned id.
    #[tracing::instrument(skip(self, name))]
    pub fn add_person(&self, name: impl Into<String>, birth_year: i32) -> Person {
        let person = self.collection.create(name, birth_year);
        tracing::info!(id = ?person.id(), person = %person, "person added");
        person
    }

    /// Removes the person with `id`. Returns false when there was none.
    #[tracing::instrument(skip(self))]
    pub fn remove_person(&self, id: PersonId) -> bool {
        let existed = self.collection.find_by_id(id).is_some();
        self.collection.remove_by_id(id);
        if existed {
            tracing::info!("person removed");
        } else {
            tracing::info!("no person to remove");
        }
        existed
    }

    pub fn people(&self) -> Vec<Person> {
        self.collection.all()
    }

    pub fn collection(&self) -> &EntityCollection {
        &self.collection
    }

    pub fn view(&self) -> &ListView<S> {
        &self.view
    }

    /// Applies one command to the collection.
    pub fn execute(&self, command: Command) -> Outcome {
        match command {
            Command::Add { name, birth_year } => Outcome::Added(self.add_person(name, birth_year)),
            Command::Remove(id) => Outcome::Removed {
                id,
                existed: self.remove_person(id),
            },
            Command::List => Outcome::Listed(self.people()),
            Command::Help => Outcome::Help,
            Command::Quit => Outcome::Quit,
        }
    }

    /// Reads commands line by line until `quit` or end of input, writing
    /// feedback to `feedback`. Invalid lines are reported and skipped.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut feedback: W) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(err) => {
                    tracing::warn!(error = %err, "invalid input");
                    writeln!(feedback, "error: {err}")?;
                    continue;
                }
            };

            match self.execute(command) {
                Outcome::Added(person) => {
                    if let Some(id) = person.id() {
                        writeln!(feedback, "added #{id}: {person}")?;
                    }
                }
                Outcome::Removed { id, existed: true } => writeln!(feedback, "removed #{id}")?,
                Outcome::Removed { id, existed: false } => {
                    writeln!(feedback, "no person #{id}")?
                }
                Outcome::Listed(people) => {
                    for person in people {
                        if let Some(id) = person.id() {
                            writeln!(feedback, "#{id}: {person}")?;
                        }
                    }
                }
                Outcome::Help => writeln!(feedback, "{}", input::HELP)?,
                Outcome::Quit => break,
            }
        }
        Ok(())
    }
}

/// Builds an application rendering to stdout in the configured format.
pub fn create_stdout_app(config: &Config) -> PersonListApp<Box<dyn RenderSurface + Send>> {
    let surface: Box<dyn RenderSurface + Send> = match config.format {
        OutputFormat::Html => Box::new(HtmlSurface::new(io::stdout())),
        OutputFormat::Json => Box::new(JsonSurface::new(io::stdout())),
    };
    PersonListApp::new(config, surface)
}
