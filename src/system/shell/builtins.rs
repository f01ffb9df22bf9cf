//! Commands every shell understands: `help`, `?`, `history` and `test`.

use core::fmt::Write;

use super::registry::{Command, CommandEntry};
use super::{Context, ShellResult};

/// The built-in table. `?` is an alias of `help`, which must stay first.
pub(crate) const COMMANDS: &[CommandEntry] = &[
    CommandEntry::Command(Command {
        name: "help",
        usage: "help [cmd-name] -- list the command and usage",
        handler: help,
    }),
    CommandEntry::Alias {
        name: "?",
        target: 0,
    },
    #[cfg(feature = "history")]
    CommandEntry::Command(Command {
        name: "history",
        usage: "history [num] -- list the history command",
        handler: history,
    }),
    CommandEntry::Command(Command {
        name: "test",
        usage: "test [args] -- test the cli",
        handler: test,
    }),
];

fn help(ctx: &mut Context<'_>, _argc: usize, argv: &[&str]) -> ShellResult {
    let registry = ctx.registry();

    match argv {
        [_] => {
            ctx.put_str("System all command:\r\n");
            for lookup in registry.iter() {
                let _ = write!(ctx, "    {}", lookup.entry.name());
                if lookup.entry.is_alias() {
                    let _ = write!(ctx, " -> {}", lookup.command.name);
                }
                ctx.put_str("\r\n");
            }
        }
        [_, name] => match registry.find(name) {
            Some(lookup) => {
                let _ = write!(ctx, "command:{}", lookup.entry.name());
                if lookup.entry.is_alias() {
                    let _ = write!(ctx, " -> {}", lookup.command.name);
                }
                let _ = write!(ctx, "\r\n  usage:{}\r\n", lookup.command.usage);
            }
            None => {
                let _ = write!(ctx, "Not found command \"{}\"\r\n", name);
            }
        },
        _ => {
            ctx.put_str("Too many args! Only support less then 2 args\r\n");
            return ShellResult::InvalidParameter;
        }
    }

    ShellResult::Ok
}

#[cfg(feature = "history")]
fn history(ctx: &mut Context<'_>, _argc: usize, argv: &[&str]) -> ShellResult {
    let history = ctx.history();

    let limit = match argv {
        [_] => history.len(),
        // non-numeric counts list nothing, negative ones list everything
        [_, n] => match n.parse::<i32>() {
            Ok(n) if n < 0 => history.len(),
            Ok(n) => (n as usize).min(history.len()),
            Err(_) => 0,
        },
        _ => {
            ctx.put_str("Too many args! Only support less then 2 args\r\n");
            return ShellResult::InvalidParameter;
        }
    };

    for line in history.iter().take(limit) {
        let _ = write!(ctx, "    {}\r\n", line);
    }

    ShellResult::Ok
}

fn test(ctx: &mut Context<'_>, _argc: usize, argv: &[&str]) -> ShellResult {
    for (i, arg) in argv.iter().enumerate() {
        let _ = write!(ctx, "arg[{}] = {}\r\n", i, arg);
    }
    ShellResult::Ok
}
