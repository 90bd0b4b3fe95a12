//! Terminal output: tables for status, drafts and batch results.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use tds_generate::{BatchEvent, BatchState, BatchSummary};
use tds_model::{ApplicationState, DraftArtifact, DraftStatus, GenerationMode, PreflightCheck};
use tds_persistence::LoadOutcome;

use crate::commands::GenerateResult;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

pub fn print_status(state: &ApplicationState, load: &LoadOutcome, api_key_present: bool) {
    let connections = &state.connections;
    let generation = &state.generation;

    let mut table = Table::new();
    table.set_header(vec![header_cell("Setting"), header_cell("Value")]);
    apply_table_style(&mut table);
    table.add_row(vec![Cell::new("Loaded from"), Cell::new(load.source.label())]);
    table.add_row(vec![
        Cell::new("Onboarding"),
        flag_cell(state.first_run_complete, "complete", "pending"),
    ]);
    table.add_row(vec![
        Cell::new("Sender"),
        text_or_dash(&connections.microsoft.sender_email),
    ]);
    table.add_row(vec![
        Cell::new("Recipient"),
        text_or_dash(&connections.microsoft.recipient_email),
    ]);
    table.add_row(vec![
        Cell::new("Claude"),
        Cell::new(claude_status(state, api_key_present)),
    ]);
    table.add_row(vec![
        Cell::new("Freshservice"),
        text_or_dash(&connections.freshservice.domain),
    ]);
    table.add_row(vec![
        Cell::new("Email count"),
        Cell::new(generation.email_count),
    ]);
    table.add_row(vec![
        Cell::new("Quality"),
        Cell::new(generation.quality.label()),
    ]);
    let mode = match generation.mode {
        GenerationMode::Guided => "Guided",
        GenerationMode::Custom if generation.uses_custom_prompt() => "Custom",
        GenerationMode::Custom => "Custom (no prompt, using guided)",
    };
    table.add_row(vec![Cell::new("Mode"), Cell::new(mode)]);
    table.add_row(vec![
        Cell::new("Wait between calls"),
        Cell::new(format!("{} ms", generation.wait_time_ms)),
    ]);
    table.add_row(vec![Cell::new("Drafts"), Cell::new(state.drafts.len())]);
    table.add_row(vec![
        Cell::new("Next ticket"),
        Cell::new(generation.next_ticket_number),
    ]);
    let passed = PreflightCheck::ALL
        .iter()
        .filter(|check| state.preflight.is_checked(**check))
        .count();
    table.add_row(vec![
        Cell::new("Preflight"),
        Cell::new(format!("{passed}/{} checks passed", PreflightCheck::ALL.len())),
    ]);
    table.add_row(vec![Cell::new("Send batches"), Cell::new(state.history.len())]);
    table.add_row(vec![
        Cell::new("Last modified"),
        Cell::new(state.last_modified.format("%Y-%m-%d %H:%M:%S UTC")),
    ]);
    println!("{table}");
}

fn claude_status(state: &ApplicationState, api_key_present: bool) -> String {
    let claude = &state.connections.claude;
    let stored = if claude.is_configured {
        format!("key ****{}", claude.api_key_last_four)
    } else {
        "no key recorded".to_string()
    };
    let env = if api_key_present {
        "key in environment"
    } else {
        "key not in environment"
    };
    format!("{stored}, {env}")
}

pub fn print_drafts(drafts: &[DraftArtifact]) {
    if drafts.is_empty() {
        println!("No drafts.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Type"),
        header_cell("Priority"),
        header_cell("Category"),
        header_cell("Subject"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for draft in drafts {
        table.add_row(vec![
            Cell::new(draft.id),
            Cell::new(draft.classification.ticket_type),
            Cell::new(draft.classification.priority),
            Cell::new(draft.classification.path()),
            Cell::new(&draft.subject),
            status_cell(draft),
        ]);
    }
    println!("{table}");
}

/// One line per item as the batch streams.
pub fn print_event(event: &BatchEvent) {
    match event {
        BatchEvent::ItemCompleted { draft, .. } => println!("  ✓ {}", draft.subject),
        BatchEvent::ItemFailed { index, error } => eprintln!("  ✗ item {}: {error}", index + 1),
        BatchEvent::Progress { done, total } => {
            tracing::debug!(done, total, "batch progress");
        }
        BatchEvent::BatchCompleted { .. } | BatchEvent::BatchCancelled { .. } => {}
    }
}

pub fn print_batch_summary(result: &GenerateResult) {
    let summary = &result.summary;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Batch"), header_cell("Result")]);
    apply_table_style(&mut table);
    table.add_row(vec![Cell::new("ID"), Cell::new(summary.batch_id)]);
    table.add_row(vec![Cell::new("State"), state_cell(summary)]);
    table.add_row(vec![Cell::new("Requested"), Cell::new(summary.total)]);
    table.add_row(vec![
        Cell::new("Succeeded"),
        count_cell(summary.succeeded, Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Failed"),
        count_cell(summary.failed, Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("Tokens (in / out)"),
        Cell::new(format!(
            "{} / {}",
            summary.usage.input_tokens, summary.usage.output_tokens
        )),
    ]);
    table.add_row(vec![
        Cell::new("Estimated cost"),
        Cell::new(format!("${:.4}", summary.usage.estimated_cost_usd())),
    ]);
    table.add_row(vec![
        Cell::new("Elapsed"),
        Cell::new(format!("{:.1}s", summary.elapsed.as_secs_f64())),
    ]);
    println!("{table}");

    if !summary.previews.is_empty() {
        println!();
        println!("Preview (ticket numbers are provisional):");
        for preview in &summary.previews {
            println!();
            println!("{}", preview.provisional.subject);
            println!("{}", preview.provisional.body);
        }
        if result.promoted.is_empty() {
            println!();
            println!("Not saved. Re-run with --promote to keep them.");
        } else {
            let ids: Vec<String> = result.promoted.iter().map(|d| d.id.to_string()).collect();
            println!();
            println!("Saved as tickets {}.", ids.join(", "));
        }
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn text_or_dash(value: &str) -> Cell {
    if value.is_empty() {
        Cell::new("-").add_attribute(Attribute::Dim)
    } else {
        Cell::new(value)
    }
}

fn flag_cell(value: bool, yes: &str, no: &str) -> Cell {
    if value {
        Cell::new(yes).fg(Color::Green)
    } else {
        Cell::new(no).fg(Color::Yellow)
    }
}

fn count_cell(count: u32, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).add_attribute(Attribute::Dim)
    }
}

fn state_cell(summary: &BatchSummary) -> Cell {
    match summary.state {
        BatchState::Completed if summary.failed == 0 => Cell::new("Completed").fg(Color::Green),
        BatchState::Completed => Cell::new("Completed with failures").fg(Color::Yellow),
        BatchState::Cancelled => Cell::new("Cancelled").fg(Color::Yellow),
        BatchState::Idle | BatchState::Running => Cell::new("Incomplete").fg(Color::Red),
    }
}

fn status_cell(draft: &DraftArtifact) -> Cell {
    let cell = Cell::new(draft.status);
    match draft.status {
        DraftStatus::Sent => cell.fg(Color::Green),
        DraftStatus::Error => cell.fg(Color::Red),
        DraftStatus::Draft | DraftStatus::Ready => cell,
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
