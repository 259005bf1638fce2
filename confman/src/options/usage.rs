//! Usage text for options trees.

use std::fmt::Write as _;

use super::binder::{CONFIG_FILE_OPTION, CONFIG_FILE_SHORT, HELP_OPTION, USAGE_OPTION};
use super::{collect, OptionEntry, Options};

const GAP: usize = 2;

/// Renders usage text for `options`.
///
/// Built-in options come first, then each group of the tree under a
/// heading naming its path.
#[must_use]
pub fn render_usage<O: Options>(program: &str, options: &mut O) -> String {
    let entries = collect(options);
    render_entries(program, &entries)
}

pub(crate) fn render_entries(program: &str, entries: &[OptionEntry<'_>]) -> String {
    let mut rows: Vec<(Option<String>, String, String)> = vec![
        (
            None,
            format!("-{CONFIG_FILE_SHORT}, --{CONFIG_FILE_OPTION} <locations>"),
            "Load configuration from a comma-separated list of locations".to_string(),
        ),
        (
            None,
            format!("    --{HELP_OPTION}, --{USAGE_OPTION}"),
            "Print this message".to_string(),
        ),
        (
            None,
            "    --@<target> <value>".to_string(),
            "Override a component property (name.field) or global property".to_string(),
        ),
    ];

    let mut heading: Option<&[String]> = None;
    for entry in entries {
        let group = entry.group.as_slice();
        let title = if heading == Some(group) || group.is_empty() {
            None
        } else {
            heading = Some(group);
            Some(group.join("."))
        };
        let short = entry
            .def
            .short_name()
            .map_or_else(|| "    ".to_string(), |c| format!("-{c}, "));
        let mut left = format!("{short}--{}", entry.def.long_name());
        if !entry.field.is_flag() {
            let _ = write!(left, " <{}>", entry.field.kind());
        }
        let help = entry.def.description().unwrap_or_default().to_string();
        rows.push((title, left, help));
    }

    let width = rows.iter().map(|(_, left, _)| left.len()).max().unwrap_or(0) + GAP;
    let mut out = format!("Usage: {program} [options] [args...]\n\nOptions:\n");
    for (title, left, help) in rows {
        if let Some(title) = title {
            let _ = writeln!(out, "\n{title} options:");
        }
        if help.is_empty() {
            let _ = writeln!(out, "  {left}");
        } else {
            let _ = writeln!(out, "  {left:<width$}{help}");
        }
    }
    out
}
