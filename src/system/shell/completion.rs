//! Tab completion of command names.

use super::output::Output;
use super::Registry;

/// Outcome of a completion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Completion {
    /// Blank line or no candidate.
    None,
    /// Exactly one name starts with the typed text.
    Unique(&'static str),
    /// Several names matched and were listed.
    Multiple,
}

/// Match the typed text, leading spaces removed, against every registry
/// name in iteration order.
///
/// Candidates are printed one per line as soon as a second one turns up, so
/// the caller only has to repaint the prompt for [`Completion::Multiple`].
pub(crate) fn complete(line: &str, registry: &Registry, out: &Output) -> Completion {
    let prefix = line.trim_start_matches(' ');
    if prefix.is_empty() {
        return Completion::None;
    }

    let mut first = None;
    let mut found = 0usize;

    for lookup in registry.iter() {
        let name = lookup.entry.name();
        if !name.starts_with(prefix) {
            continue;
        }

        match (found, first) {
            (0, _) => first = Some(name),
            (1, Some(previous)) => {
                out.put_str("\r\n");
                out.put_str(previous);
                out.put_str("\r\n");
                out.put_str(name);
                out.put_str("\r\n");
            }
            _ => {
                out.put_str(name);
                out.put_str("\r\n");
            }
        }
        found += 1;
    }

    match (found, first) {
        (1, Some(name)) => Completion::Unique(name),
        (0, _) => Completion::None,
        _ => Completion::Multiple,
    }
}
