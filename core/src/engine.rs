//! Ingredient resolution and per-day aggregation.
//!
//! Resolution is one level of indirection deep: a composite ingredient
//! contributes its stored snapshot, never a live re-expansion of its own
//! ingredient graph. That keeps edits to a base food from rippling through
//! composites built on it, and makes cycles unrepresentable at read time.

use anyhow::Result;
use chrono::NaiveDate;
use log::warn;

use crate::db::Database;
use crate::error::Error;
use crate::models::{
    CompositeFood, DailyRecord, DayTotals, Ingredient, Nutrition, validate_quantity,
};

/// Resolved per-100g facts for a food name, Basic first, then Composite.
pub fn resolve(db: &Database, name: &str) -> Result<Option<Nutrition>> {
    Ok(db.resolve_food(name)?.map(|food| food.nutrition()))
}

/// Weighted per-100g blend of resolved ingredients.
pub fn blend(parts: &[(Ingredient, Nutrition)]) -> Result<Nutrition> {
    let mut total_calories = 0.0;
    let mut total_protein = 0.0;
    let mut total_weight = 0.0;
    for (ingredient, nutrition) in parts {
        total_calories += nutrition.calories_per_100g * ingredient.quantity_g / 100.0;
        total_protein += nutrition.protein_per_100g * ingredient.quantity_g / 100.0;
        total_weight += ingredient.quantity_g;
    }
    if total_weight <= 0.0 {
        return Err(Error::EmptyIngredientList.into());
    }
    Ok(Nutrition {
        calories_per_100g: total_calories / total_weight * 100.0,
        protein_per_100g: total_protein / total_weight * 100.0,
    })
}

fn resolve_ingredients(
    db: &Database,
    ingredients: &[Ingredient],
) -> Result<Vec<(Ingredient, Nutrition)>> {
    let mut parts = Vec::with_capacity(ingredients.len());
    for ingredient in ingredients {
        validate_quantity(ingredient.quantity_g)?;
        let Some(nutrition) = resolve(db, &ingredient.name)? else {
            return Err(Error::UnresolvedIngredient(ingredient.name.clone()).into());
        };
        parts.push((ingredient.clone(), nutrition));
    }
    Ok(parts)
}

/// Create a composite food: resolve each ingredient once, blend, and store
/// the result as that composite's snapshot. Nothing is saved on failure.
pub fn create_composite(
    db: &Database,
    name: &str,
    ingredients: &[Ingredient],
) -> Result<CompositeFood> {
    let parts = resolve_ingredients(db, ingredients)?;
    let nutrition = blend(&parts)?;
    db.insert_composite(name, ingredients, nutrition)
}

/// Rename and rebuild a composite, re-resolving its ingredients against the
/// catalog as it stands now.
pub fn update_composite(
    db: &Database,
    old_name: &str,
    name: &str,
    ingredients: &[Ingredient],
) -> Result<CompositeFood> {
    let parts = resolve_ingredients(db, ingredients)?;
    let nutrition = blend(&parts)?;
    db.update_composite(old_name, name, ingredients, nutrition)
}

/// Totals for one date.
pub fn aggregate_day(db: &Database, date: NaiveDate) -> Result<DayTotals> {
    let record = db.get_day(date)?;
    aggregate_record(db, &record)
}

/// Totals for an already-loaded record. Food names with no catalog entry
/// contribute zero and are reported in `unresolved` — historical records may
/// reference foods that were since renamed, and a stale name must not take
/// the rest of the table down with it.
pub fn aggregate_record(db: &Database, record: &DailyRecord) -> Result<DayTotals> {
    let mut calories_in = 0.0;
    let mut protein = 0.0;
    let mut unresolved = Vec::new();
    for portion in &record.food_consumed {
        match resolve(db, &portion.name)? {
            Some(nutrition) => {
                calories_in += nutrition.calories_per_100g * portion.quantity_g / 100.0;
                protein += nutrition.protein_per_100g * portion.quantity_g / 100.0;
            }
            None => {
                warn!(
                    "no food named '{}' in the catalog; counting 0 for {}",
                    portion.name, record.date
                );
                unresolved.push(portion.name.clone());
            }
        }
    }
    let calories_out = record.exercises.iter().map(|e| e.calories).sum();
    Ok(DayTotals {
        date: record.date,
        calories_in,
        calories_out,
        protein,
        unresolved,
    })
}

/// Grams of a food that add up to a calorie amount.
pub fn grams_for_calories(db: &Database, name: &str, calories: f64) -> Result<f64> {
    let Some(nutrition) = resolve(db, name)? else {
        return Err(Error::NotFound(name.to_string()).into());
    };
    if nutrition.calories_per_100g <= 0.0 {
        anyhow::bail!("'{name}' has no calories per 100g; no quantity reaches {calories} kcal");
    }
    Ok(calories / nutrition.calories_per_100g * 100.0)
}
