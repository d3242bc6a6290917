//! Coloured terminal rendering for diff types, via owo_colors.

use owo_colors::OwoColorize;
use twse_auction_core::diff::{DiffKind, DiffResult, RecordDiff};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        colorize_diff(*self, self.symbol())
    }
}

fn colorize_diff(kind: DiffKind, text: &str) -> String {
    match kind {
        DiffKind::Create => text.green().to_string(),
        DiffKind::Update => text.yellow().to_string(),
        DiffKind::Delete => text.red().to_string(),
    }
}

impl Render for RecordDiff {
    fn render(&self) -> String {
        let name = format!("{}（{}）", self.record.name(), self.key.code);
        let open = format!("開標 {}", self.key.open_date);
        format!("{} {} {}", self.kind.render(), colorize_diff(self.kind, &name), open.dimmed())
    }
}

/// Above this many records per kind, only counts are shown unless verbose.
const COMPACT_THRESHOLD: usize = 5;

pub trait DiffResultRender {
    fn render(&self, verbose: bool) -> String;
}

impl DiffResultRender for DiffResult {
    fn render(&self, verbose: bool) -> String {
        if self.is_empty() {
            return "   No changes".dimmed().to_string();
        }

        let mut lines = Vec::new();
        for kind in [DiffKind::Create, DiffKind::Update, DiffKind::Delete] {
            render_diff_list(self.of_kind(kind), kind, verbose, &mut lines);
        }
        lines.join("\n")
    }
}

fn render_diff_list(diffs: &[RecordDiff], kind: DiffKind, verbose: bool, lines: &mut Vec<String>) {
    if diffs.is_empty() {
        return;
    }

    if verbose || diffs.len() <= COMPACT_THRESHOLD {
        for diff in diffs {
            lines.push(format!("   {}", diff.render()));
            lines.extend(render_field_changes(diff).into_iter().map(|l| format!("      {l}")));
        }
        return;
    }

    let label = match kind {
        DiffKind::Create => format!("({} new records)", diffs.len()),
        DiffKind::Update => format!("({} changed records)", diffs.len()),
        DiffKind::Delete => format!("({} removed records)", diffs.len()),
    };
    lines.push(format!("   {} {}", kind.render(), colorize_diff(kind, &label)));
}

fn render_field_changes(diff: &RecordDiff) -> Vec<String> {
    diff.changes
        .iter()
        .map(|change| {
            format!(
                "{}: {} → {}",
                change.label.dimmed(),
                or_none(&change.old).red(),
                or_none(&change.new).green()
            )
        })
        .collect()
}

fn or_none(value: &str) -> &str {
    if value.is_empty() { "(none)" } else { value }
}
