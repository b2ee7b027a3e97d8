use anyhow::Result;

use tally_core::models::{ExerciseEntry, FoodPortion};
use tally_core::service::TallyService;

use super::helpers::{fmt_opt, parse_date, parse_name_value};

pub(crate) fn cmd_day_show(
    service: &TallyService,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let record = service.get(date)?;
    let totals = service.aggregate_day(date)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "record": record, "totals": totals })
        );
        return Ok(());
    }

    println!("=== {} ===", date.format("%Y-%m-%d"));
    println!("  Weight: {} kg", fmt_opt(record.weight, 1));

    if !record.food_consumed.is_empty() {
        println!("  Food:");
        for portion in &record.food_consumed {
            println!("    {} — {:.0}g", portion.name, portion.quantity_g);
        }
    }
    if !record.exercises.is_empty() {
        println!("  Exercise:");
        for exercise in &record.exercises {
            println!("    {} — {:.0} kcal", exercise.name, exercise.calories);
        }
    }

    println!(
        "  TOTAL: {:.0} kcal in | {:.0} kcal out | {:.1}g protein",
        totals.calories_in, totals.calories_out, totals.protein
    );
    for name in &totals.unresolved {
        eprintln!("Warning: '{name}' is not in the catalog and counted as 0");
    }

    Ok(())
}

pub(crate) fn cmd_day_edit(
    service: &TallyService,
    date: &str,
    weight: Option<f64>,
    clear_weight: bool,
    food_args: &[String],
    exercise_args: &[String],
    json: bool,
) -> Result<()> {
    let date = parse_date(Some(date.to_string()))?;
    let existing = service.get(date)?;

    let weight = if clear_weight {
        None
    } else {
        weight.or(existing.weight)
    };

    let food: Vec<FoodPortion> = if food_args.is_empty() {
        existing.food_consumed
    } else {
        food_args
            .iter()
            .map(|arg| {
                let (name, quantity_g) = parse_name_value(arg)?;
                Ok(FoodPortion { name, quantity_g })
            })
            .collect::<Result<_>>()?
    };

    let exercises: Vec<ExerciseEntry> = if exercise_args.is_empty() {
        existing.exercises
    } else {
        exercise_args
            .iter()
            .map(|arg| {
                let (name, calories) = parse_name_value(arg)?;
                Ok(ExerciseEntry { name, calories })
            })
            .collect::<Result<_>>()?
    };

    service.replace_record(date, weight, &food, &exercises)?;
    let record = service.get(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!(
            "Saved {} — weight {} kg, {} food entries, {} exercises",
            date.format("%Y-%m-%d"),
            fmt_opt(record.weight, 1),
            record.food_consumed.len(),
            record.exercises.len()
        );
    }

    Ok(())
}
