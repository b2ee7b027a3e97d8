use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use tally_core::service::TallyService;

use super::helpers::{fmt_delta, fmt_opt, no_neg_zero};

pub(crate) fn cmd_history(service: &TallyService, limit: Option<usize>, json: bool) -> Result<()> {
    // Rows come out of the engine oldest first; display newest first.
    let mut rows = service.build_history()?;
    rows.reverse();
    if let Some(limit) = limit {
        rows.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        eprintln!("No records yet. Use `tally weight`, `tally eat`, or `tally burn` to start.");
        process::exit(2);
    }

    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Weight (kg)")]
        weight: String,
        #[tabled(rename = "Cal In")]
        calories_in: String,
        #[tabled(rename = "Cal Out")]
        calories_out: String,
        #[tabled(rename = "Protein (g)")]
        protein: String,
        #[tabled(rename = "Δ Prior (kg)")]
        prior_delta: String,
        #[tabled(rename = "Δ Goal (kg)")]
        goal_delta: String,
    }

    let mut any_protein_low = false;
    let table_rows: Vec<HistoryRow> = rows
        .iter()
        .map(|row| {
            let protein = no_neg_zero(row.protein);
            let protein_cell = if row.protein_low {
                any_protein_low = true;
                format!("{protein:.0} *")
            } else {
                format!("{protein:.0}")
            };
            HistoryRow {
                date: row.date.format("%Y-%m-%d").to_string(),
                weight: fmt_opt(row.weight, 1),
                calories_in: format!("{:.0}", no_neg_zero(row.calories_in)),
                calories_out: format!("{:.0}", no_neg_zero(row.calories_out)),
                protein: protein_cell,
                prior_delta: fmt_delta(row.prior_delta),
                goal_delta: fmt_delta(row.goal_delta),
            }
        })
        .collect();

    let table = Table::new(&table_rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    if any_protein_low {
        println!("* protein below 0.8 g per kg of body weight");
    }

    Ok(())
}

pub(crate) fn cmd_chart(service: &TallyService, json: bool) -> Result<()> {
    let chart = service.chart_data()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&chart)?);
        return Ok(());
    }

    if chart.dates.is_empty() {
        eprintln!("No records to chart yet.");
        process::exit(2);
    }

    let n = &chart.normalization;
    println!(
        "{} days | max weight {:.1} kg | max calories {:.0} kcal",
        chart.dates.len(),
        n.max_weight,
        n.max_calories
    );
    println!(
        "Normalization factor: {:.6} (1 kcal plots at {:.6} on the weight axis)",
        n.factor, n.factor
    );
    println!(
        "Primary axis range: {:.1} to {:.1} kg",
        chart.y_range.0, chart.y_range.1
    );

    if chart.secondary_ticks.is_empty() {
        return Ok(());
    }

    #[derive(Tabled)]
    struct TickRow {
        #[tabled(rename = "Calories")]
        label: String,
        #[tabled(rename = "Axis position (kg)")]
        position: String,
    }

    let rows: Vec<TickRow> = chart
        .secondary_ticks
        .iter()
        .map(|tick| TickRow {
            label: tick.label.clone(),
            position: format!("{:.2}", tick.position),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(0..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
