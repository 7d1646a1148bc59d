use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use agg_cli::types::{PrepareResult, ValidateResult};
use agg_model::DatasetKind;
use agg_validate::{ReportedIssue, Severity};

pub fn print_prepare_summary(result: &PrepareResult) {
    println!("Data: {}", result.data_dir.display());
    if result.dry_run {
        println!("Output: none (dry run)");
    } else {
        println!("Output: {}", result.output_dir.display());
    }
    if let Some(path) = &result.report_path {
        println!("Validation report: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Description"),
        header_cell("Files"),
        header_cell("Source rows"),
        header_cell("Dropped"),
        header_cell("Rejected"),
        header_cell("Exported"),
        header_cell("Errors"),
        header_cell("Warnings"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..=8 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut total_exported = 0usize;
    let mut total_errors = 0usize;
    let mut total_warnings = 0usize;
    for run in &result.datasets {
        let validation = run.validation();
        let errors = validation.error_count() + validation.reject_count();
        total_exported += validation.accepted();
        total_errors += errors;
        total_warnings += validation.warning_count();
        table.add_row(vec![
            dataset_cell(run.kind),
            Cell::new(&run.label),
            Cell::new(run.files),
            Cell::new(run.source_rows),
            count_cell(Some(run.dropped()), Color::Yellow),
            count_cell(Some(validation.rejected), Color::Red),
            Cell::new(validation.accepted()),
            count_cell(Some(errors), Color::Red),
            count_cell(Some(validation.warning_count()), Color::Yellow),
        ]);
    }
    for kind in &result.skipped {
        table.add_row(vec![
            dataset_cell(*kind),
            dim_cell("no source files"),
            dim_cell(0),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new("All datasets")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(total_exported).add_attribute(Attribute::Bold),
        count_cell(Some(total_errors), Color::Red).add_attribute(Attribute::Bold),
        count_cell(Some(total_warnings), Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    let issues: Vec<(DatasetKind, &ReportedIssue)> = result
        .datasets
        .iter()
        .flat_map(|run| run.validation().issues.iter().map(move |i| (run.kind, i)))
        .collect();
    print_issue_table(issues);

    if !result.errors.is_empty() {
        eprintln!("Errors:");
        for error in &result.errors {
            eprintln!("- {error}");
        }
    }
}

pub fn print_validate_summary(result: &ValidateResult) {
    let validation = &result.report.validation;
    println!("Table: {}", result.path.display());
    println!(
        "Rows: {} ({} accepted, {} rejected)",
        validation.rows,
        validation.accepted(),
        validation.rejected
    );
    if let Some(path) = &result.report_path {
        println!("Validation report: {}", path.display());
    }
    if validation.issues.is_empty() {
        println!("No issues found.");
        return;
    }
    print_issue_table(
        validation
            .issues
            .iter()
            .map(|issue| (validation.dataset, issue))
            .collect(),
    );
}

fn print_issue_table(mut issues: Vec<(DatasetKind, &ReportedIssue)>) {
    if issues.is_empty() {
        return;
    }
    issues.sort_by(|a, b| {
        a.1.severity
            .cmp(&b.1.severity)
            .then(a.0.cmp(&b.0))
            .then(a.1.rule_id.cmp(b.1.rule_id))
    });
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Severity"),
        header_cell("Rule"),
        header_cell("Column"),
        header_cell("Count"),
        header_cell("Rejected"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    for (kind, issue) in issues {
        table.add_row(vec![
            dataset_cell(kind),
            severity_cell(issue.severity),
            Cell::new(issue.rule_id),
            Cell::new(issue.variable.as_deref().unwrap_or("-")),
            issue_count_cell(issue.count, issue.severity),
            count_cell(Some(issue.rejected_rows), Color::Red),
            Cell::new(&issue.message),
        ]);
    }
    println!();
    println!("Issues:");
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(150);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(180);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Reject => Cell::new("REJECT")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Error => Cell::new("ERROR").fg(Color::Red),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Reject | Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
    }
}

fn issue_count_cell(count: Option<u64>, severity: Severity) -> Cell {
    match count {
        Some(value) => Cell::new(value).fg(severity_color(severity)),
        None => dim_cell("-"),
    }
}

fn count_cell(count: Option<usize>, color: Color) -> Cell {
    match count {
        Some(value) if value > 0 => Cell::new(value).fg(color).add_attribute(Attribute::Bold),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dataset_cell(kind: DatasetKind) -> Cell {
    Cell::new(kind)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
