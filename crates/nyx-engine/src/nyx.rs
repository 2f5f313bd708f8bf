use std::collections::HashMap;

use tracing::debug;

use nyx_config::Configuration;
use nyx_git::Repository;

use crate::commands::{self, Command, CommandKind};
use crate::services::ServiceRegistry;
use crate::state::State;
use crate::Result;

/// The pipeline entry point: owns the run state, the repository and the
/// service registry, and executes commands in dependency order with
/// per-command up-to-date short-circuiting.
///
/// Not safe for concurrent use over the same repository.
pub struct Nyx {
    repository: Repository,
    services: ServiceRegistry,
    state: State,
    commands: HashMap<CommandKind, Box<dyn Command>>,
}

impl Nyx {
    /// Opens the repository at the configured directory and prepares the run
    /// state, resuming from the state file when the configuration asks for
    /// it.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory does not hold a git repository or
    /// a resumed state file does not parse.
    pub fn new(configuration: Configuration) -> Result<Self> {
        debug!("new Nyx instance");
        let repository = Repository::open(&configuration.get_directory())?;

        let resume = configuration.get_resume();
        let state_file = commands::state_file_path(&configuration);
        let state = match (resume, &state_file) {
            (true, Some(path)) if path.is_file() => {
                debug!(path = %path.display(), "resuming from state file");
                State::load(path, configuration)?
            }
            _ => State::new(configuration),
        };

        Ok(Self {
            repository,
            services: ServiceRegistry::new(),
            state,
            commands: HashMap::new(),
        })
    }

    /// Replaces the service registry the Make and Publish commands resolve
    /// their services from.
    #[must_use]
    pub fn with_services(mut self, services: ServiceRegistry) -> Self {
        self.services = services;
        self
    }

    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    #[must_use]
    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Removes generated artifacts and resets the run. Never cached.
    ///
    /// # Errors
    ///
    /// Returns an error when the state file exists but cannot be removed.
    pub fn clean(&mut self) -> Result<()> {
        self.run_command(CommandKind::Clean, false)?;
        self.commands.clear();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error when the command or one of its prerequisites fails.
    pub fn arrange(&mut self) -> Result<&State> {
        self.run_command(CommandKind::Arrange, true)?;
        Ok(&self.state)
    }

    /// # Errors
    ///
    /// Returns an error when the command or one of its prerequisites fails.
    pub fn infer(&mut self) -> Result<&State> {
        self.run_command(CommandKind::Infer, true)?;
        Ok(&self.state)
    }

    /// # Errors
    ///
    /// Returns an error when the command or one of its prerequisites fails.
    pub fn make(&mut self) -> Result<&State> {
        self.run_command(CommandKind::Make, true)?;
        Ok(&self.state)
    }

    /// # Errors
    ///
    /// Returns an error when the command or one of its prerequisites fails.
    pub fn mark(&mut self) -> Result<&State> {
        self.run_command(CommandKind::Mark, true)?;
        Ok(&self.state)
    }

    /// # Errors
    ///
    /// Returns an error when the command or one of its prerequisites fails.
    pub fn publish(&mut self) -> Result<&State> {
        self.run_command(CommandKind::Publish, true)?;
        Ok(&self.state)
    }

    fn run_command(&mut self, kind: CommandKind, use_cache: bool) -> Result<()> {
        if let Some(prerequisite) = kind.prerequisite() {
            self.run_command(prerequisite, true)?;
        }

        let fresh;
        let command: &dyn Command = if use_cache {
            let cached = self.commands.entry(kind).or_insert_with(|| kind.instantiate());
            &**cached
        } else {
            fresh = kind.instantiate();
            fresh.as_ref()
        };

        if command.is_up_to_date(&self.state, &self.repository)? {
            debug!(command = command.name(), "command is up to date, skipping");
            return Ok(());
        }

        debug!(command = command.name(), "command is not up to date, running");
        command.run(&mut self.state, &self.repository, &self.services)?;

        // cache writes land in the state before it is persisted; Clean has
        // just removed the file and must not recreate it
        if kind != CommandKind::Clean && !self.state.configuration().get_dry_run() {
            if let Some(path) = commands::state_file_path(self.state.configuration()) {
                self.state.save(&path)?;
            }
        }

        Ok(())
    }
}
