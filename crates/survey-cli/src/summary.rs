use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use survey_model::{ColumnDecision, DecisionAction, StageShape};

use survey_cli::types::{ApplyResult, CleanResult};

pub fn print_clean_summary(result: &CleanResult) {
    println!("Output: {}", result.output.display());
    if let Some(path) = &result.params {
        println!("Parameters: {}", path.display());
    }
    println!("{}", shape_table(&result.shapes));
    print_decision_table(result.decisions.iter().filter(|d| is_structural(d)));

    let imputed = result
        .decisions
        .iter()
        .filter(|d| matches!(d.action, DecisionAction::Imputed { .. }))
        .count();
    println!(
        "{} rows x {} columns; {imputed} columns imputed",
        result.rows, result.columns
    );
}

pub fn print_apply_summary(result: &ApplyResult) {
    println!("Output: {}", result.output.display());
    println!("{}", shape_table(&result.shapes));
    println!("{} rows x {} columns", result.rows, result.columns);
}

fn is_structural(decision: &ColumnDecision) -> bool {
    !matches!(decision.action, DecisionAction::Imputed { .. })
}

fn shape_table(shapes: &[StageShape]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Stage"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Change"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);

    let mut previous: Option<usize> = None;
    for shape in shapes {
        table.add_row(vec![
            Cell::new(shape.stage.number()),
            Cell::new(shape.stage.display_name()),
            Cell::new(shape.rows),
            Cell::new(shape.columns),
            change_cell(previous, shape.columns),
        ]);
        previous = Some(shape.columns);
    }
    table
}

fn print_decision_table<'a>(decisions: impl Iterator<Item = &'a ColumnDecision>) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Attribute"),
        header_cell("Decision"),
    ]);
    apply_decision_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    let mut rows = 0usize;
    for decision in decisions {
        table.add_row(vec![
            Cell::new(decision.stage.number()),
            Cell::new(&decision.attribute).add_attribute(Attribute::Bold),
            action_cell(&decision.action),
        ]);
        rows += 1;
    }
    if rows == 0 {
        return;
    }
    println!();
    println!("Column decisions:");
    println!("{table}");
}

fn change_cell(previous: Option<usize>, columns: usize) -> Cell {
    match previous {
        Some(before) if columns > before => Cell::new(format!("+{}", columns - before))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Some(before) if columns < before => Cell::new(format!("-{}", before - columns))
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Some(_) => dim_cell(0),
        None => dim_cell("-"),
    }
}

fn action_cell(action: &DecisionAction) -> Cell {
    let color = match action {
        DecisionAction::Dropped { .. } => Color::Red,
        DecisionAction::Expanded { .. } | DecisionAction::Decomposed { .. } => Color::Cyan,
        DecisionAction::Skipped { .. } | DecisionAction::ZeroVariance { .. } => Color::Yellow,
        DecisionAction::Imputed { .. } => Color::Green,
    };
    Cell::new(action.to_string()).fg(color)
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_decision_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
    if table.column_count() >= 3 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(7)),
            ColumnConstraint::UpperBoundary(Width::Percentage(35)),
            ColumnConstraint::LowerBoundary(Width::Fixed(20)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
