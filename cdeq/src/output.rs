// cdeq/src/output.rs
//
// Terminal rendering of reports.

use std::collections::BTreeMap;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use cdeq_core::domain::catalog::{Catalog, Severity};
use cdeq_core::domain::report::{Presence, ReconciliationTable, ViolationSummary};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn presence_cell(presence: Presence) -> Cell {
    let cell = Cell::new(presence).set_alignment(CellAlignment::Center);
    match presence {
        Presence::Yes => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        Presence::No => cell.fg(Color::Green),
    }
}

pub fn print_reconciliation(report: &ReconciliationTable) {
    if report.is_empty() {
        println!("\n✅ No violations: every system is consistent.");
        return;
    }

    let mut table = new_table();
    table.set_header(report.headers().iter().map(|h| header_cell(h)));
    for row in &report.rows {
        let mut cells = vec![
            Cell::new(&row.cde),
            Cell::new(&row.rule_description),
            Cell::new(&row.uitid),
        ];
        cells.extend(row.flags.iter().map(|f| presence_cell(f.violated)));
        table.add_row(cells);
    }

    println!("\n🔗 Reconciliation ({} row(s))", report.len());
    println!("{table}");
}

fn counts_table(title: &str, counts: &BTreeMap<String, usize>) -> Table {
    let mut table = new_table();
    table.set_header(vec![header_cell(title), header_cell("Violations")]);
    for (key, count) in counts {
        let label = match Severity::parse(key) {
            Severity::Error => Cell::new(key).fg(Color::Red),
            Severity::Warning => Cell::new(key).fg(Color::Yellow),
            _ => Cell::new(key),
        };
        table.add_row(vec![label, Cell::new(count).set_alignment(CellAlignment::Right)]);
    }
    table
}

pub fn print_summary(summary: &ViolationSummary) {
    println!("\n📊 Summary: {} violation(s)", summary.total_violations);
    if summary.total_violations == 0 {
        return;
    }
    println!("{}", counts_table("Severity", &summary.by_severity));
    println!("{}", counts_table("Rule type", &summary.by_rule_type));
    println!("{}", counts_table("System", &summary.by_system));
    println!("{}", counts_table("Rule", &summary.by_rule));
}

pub fn print_rules(catalog: &Catalog) {
    let mut table = new_table();
    table.set_header(
        ["ID", "Name", "Kind", "CDE", "Systems", "Severity"]
            .into_iter()
            .map(header_cell),
    );

    for rule in &catalog.rules {
        let kind = match &rule.kind {
            Some(kind) if kind.is_supported() => Cell::new(kind),
            Some(kind) => Cell::new(format!("{} (skipped)", kind)).fg(Color::DarkGrey),
            None => Cell::new("-").fg(Color::DarkGrey),
        };
        let systems = if rule.systems.is_empty() {
            "all".to_string()
        } else {
            rule.systems.join(", ")
        };
        table.add_row(vec![
            Cell::new(&rule.id),
            Cell::new(rule.display_name()),
            kind,
            Cell::new(rule.cde_name.as_deref().unwrap_or("-")),
            Cell::new(systems),
            Cell::new(rule.severity.as_ref().map_or("-", Severity::as_str)),
        ]);
    }
    println!("{table}");
}
