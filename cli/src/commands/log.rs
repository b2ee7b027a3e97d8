use anyhow::Result;

use tally_core::service::TallyService;

use super::helpers::{parse_date, parse_grams};

pub(crate) fn cmd_eat(
    service: &TallyService,
    food: &str,
    grams: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let quantity_g = parse_grams(grams)?;

    let nutrition = service.lookup(food)?;
    service.append_food(date, food, quantity_g)?;

    if json {
        let calories = nutrition.map(|n| n.calories_per_100g * quantity_g / 100.0);
        println!(
            "{}",
            serde_json::json!({
                "date": date.format("%Y-%m-%d").to_string(),
                "food": food,
                "quantity_g": quantity_g,
                "calories": calories,
            })
        );
        return Ok(());
    }

    match nutrition {
        Some(n) => {
            let calories = n.calories_per_100g * quantity_g / 100.0;
            let protein = n.protein_per_100g * quantity_g / 100.0;
            println!(
                "Added {quantity_g:.0}g {food} to {} — {calories:.0} kcal, {protein:.1}g protein",
                date.format("%Y-%m-%d")
            );
        }
        None => {
            println!("Added {quantity_g:.0}g {food} to {}", date.format("%Y-%m-%d"));
            eprintln!("Note: '{food}' is not in the catalog; it counts as 0 kcal until added");
        }
    }

    Ok(())
}

pub(crate) fn cmd_burn(
    service: &TallyService,
    exercise: &str,
    calories: f64,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    service.append_exercise(date, exercise, calories)?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "date": date.format("%Y-%m-%d").to_string(),
                "exercise": exercise,
                "calories": calories,
            })
        );
    } else {
        println!(
            "Logged {exercise} for {} — {calories:.0} kcal burned",
            date.format("%Y-%m-%d")
        );
    }

    Ok(())
}

pub(crate) fn cmd_calc(
    service: &TallyService,
    food: &str,
    calories: f64,
    json: bool,
) -> Result<()> {
    let grams = service.grams_for_calories(food, calories)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "food": food, "calories": calories, "grams": grams })
        );
    } else {
        println!("{grams:.2}g of {food} is {calories:.0} kcal");
    }

    Ok(())
}
