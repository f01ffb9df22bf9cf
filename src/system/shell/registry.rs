//! Static command tables.
//!
//! A table is an ordered `&'static [CommandEntry]`. An entry is either a real
//! command or an alias naming another entry of the same table by index.
//! Tables are checked once when the [`Registry`] is built, so lookups never
//! have to deal with dangling or chained aliases.

use super::builtins;
use super::{Context, ShellResult};
use crate::system::error::Error;

/// Function signature for command handlers.
///
/// Handlers receive a [`Context`] for output, the argument count and the
/// arguments themselves. `argv[0]` is the name the user typed, which for an
/// alias is the alias name.
///
/// # Examples
///
/// ```rust
/// use embkit::system::shell::{CommandFn, Context, ShellResult};
///
/// fn reboot(ctx: &mut Context<'_>, argc: usize, _argv: &[&str]) -> ShellResult {
///     if argc != 1 {
///         return ShellResult::InvalidParameter;
///     }
///     ctx.put_str("rebooting\r\n");
///     ShellResult::Ok
/// }
///
/// let handler: CommandFn = reboot;
/// ```
pub type CommandFn = fn(ctx: &mut Context<'_>, argc: usize, argv: &[&str]) -> ShellResult;

/// A command with its own handler.
#[derive(Debug, Clone, Copy)]
pub struct Command {
    /// The command name as typed by the user. Matching is exact and
    /// case-sensitive.
    pub name: &'static str,

    /// One-line usage text shown by `help <name>`.
    pub usage: &'static str,

    /// The function that implements the command.
    pub handler: CommandFn,
}

/// One row of a command table.
#[derive(Debug, Clone, Copy)]
pub enum CommandEntry {
    /// A real command.
    Command(Command),
    /// Another name for the [`CommandEntry::Command`] at `target` in the
    /// same table.
    Alias {
        /// The alias name as typed by the user.
        name: &'static str,
        /// Index of the aliased command within the same table.
        target: usize,
    },
}

impl CommandEntry {
    /// Name this entry answers to.
    pub const fn name(&self) -> &'static str {
        match self {
            CommandEntry::Command(command) => command.name,
            CommandEntry::Alias { name, .. } => name,
        }
    }

    /// `true` for [`CommandEntry::Alias`].
    pub const fn is_alias(&self) -> bool {
        matches!(self, CommandEntry::Alias { .. })
    }
}

/// A table entry together with the command it runs.
#[derive(Debug, Clone, Copy)]
pub struct Lookup {
    /// The entry whose name matched.
    pub entry: &'static CommandEntry,
    /// The command it resolves to: the entry itself, or the alias target.
    pub command: &'static Command,
}

/// Read-only view over the built-in table and the firmware's own table.
///
/// Iteration, completion and lookup all walk the built-ins first, then the
/// firmware commands, each in table order.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    builtins: &'static [CommandEntry],
    commands: &'static [CommandEntry],
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtins()
    }
}

impl Registry {
    /// A registry with no commands at all. Every lookup misses.
    pub const fn empty() -> Self {
        Self {
            builtins: &[],
            commands: &[],
        }
    }

    /// Only the built-in commands: `help`, `?`, `history` (with the
    /// `history` feature) and `test`.
    pub const fn builtins() -> Self {
        Self {
            builtins: builtins::COMMANDS,
            commands: &[],
        }
    }

    /// Only `commands`, without the built-ins.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidParameter`] - an entry has an empty name
    /// * [`Error::InvalidAlias`] - an alias target is out of range or is
    ///   itself an alias
    pub fn new(commands: &'static [CommandEntry]) -> Result<Self, Error> {
        validate(commands)?;
        Ok(Self {
            builtins: &[],
            commands,
        })
    }

    /// The built-in commands followed by `commands`.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::new`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use embkit::system::shell::{Command, CommandEntry, Context, Registry, ShellResult};
    ///
    /// fn status(ctx: &mut Context<'_>, _argc: usize, _argv: &[&str]) -> ShellResult {
    ///     ctx.put_str("all good\r\n");
    ///     ShellResult::Ok
    /// }
    ///
    /// static COMMANDS: [CommandEntry; 2] = [
    ///     CommandEntry::Command(Command {
    ///         name: "status",
    ///         usage: "status -- show device status",
    ///         handler: status,
    ///     }),
    ///     CommandEntry::Alias { name: "st", target: 0 },
    /// ];
    ///
    /// let registry = Registry::with_builtins(&COMMANDS).unwrap();
    /// assert_eq!(registry.find("st").unwrap().command.name, "status");
    /// assert!(registry.find("help").is_some());
    /// ```
    pub fn with_builtins(commands: &'static [CommandEntry]) -> Result<Self, Error> {
        validate(commands)?;
        Ok(Self {
            builtins: builtins::COMMANDS,
            commands,
        })
    }

    /// Total number of entries, aliases included.
    pub fn len(&self) -> usize {
        self.builtins.len() + self.commands.len()
    }

    /// `true` when the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every entry in iteration order, each with its resolved command.
    pub fn iter(&self) -> impl Iterator<Item = Lookup> {
        let tables = [self.builtins, self.commands];
        tables.into_iter().flat_map(|table| {
            table.iter().filter_map(move |entry| {
                resolve(table, entry).map(|command| Lookup { entry, command })
            })
        })
    }

    /// Exact, case-sensitive lookup by name, following at most one alias.
    pub fn find(&self, name: &str) -> Option<Lookup> {
        self.iter().find(|lookup| lookup.entry.name() == name)
    }
}

fn resolve(table: &'static [CommandEntry], entry: &'static CommandEntry) -> Option<&'static Command> {
    match entry {
        CommandEntry::Command(command) => Some(command),
        CommandEntry::Alias { target, .. } => match table.get(*target) {
            Some(CommandEntry::Command(command)) => Some(command),
            _ => None,
        },
    }
}

fn validate(table: &[CommandEntry]) -> Result<(), Error> {
    for entry in table {
        if entry.name().is_empty() {
            warn!("command table entry with empty name");
            return Err(Error::InvalidParameter);
        }
        if let CommandEntry::Alias { name, target } = entry {
            if !matches!(table.get(*target), Some(CommandEntry::Command(_))) {
                warn!("alias {} has an invalid target {}", *name, *target);
                return Err(Error::InvalidAlias);
            }
        }
    }
    Ok(())
}
