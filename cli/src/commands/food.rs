use anyhow::{Result, bail};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use tally_core::models::{Food, Ingredient};
use tally_core::service::TallyService;

use super::helpers::parse_name_value;

pub(crate) fn cmd_food_add(
    service: &TallyService,
    name: &str,
    calories: f64,
    protein: f64,
    json: bool,
) -> Result<()> {
    let food = service.add_basic(name, calories, protein)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&food)?);
    } else {
        println!(
            "Added {} — {:.0} kcal, {:.1}g protein per 100g",
            food.name, food.calories_per_100g, food.protein_per_100g
        );
    }

    Ok(())
}

pub(crate) fn cmd_food_compose(
    service: &TallyService,
    name: &str,
    ingredient_args: &[String],
    json: bool,
) -> Result<()> {
    let ingredients = parse_ingredients(ingredient_args)?;
    let food = service.add_composite(name, &ingredients)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&food)?);
    } else {
        println!(
            "Added {} — {:.1} kcal, {:.1}g protein per 100g (blend of {} ingredients)",
            food.name,
            food.calories_per_100g,
            food.protein_per_100g,
            food.ingredients.len()
        );
    }

    Ok(())
}

pub(crate) fn cmd_food_edit(
    service: &TallyService,
    name: &str,
    rename: Option<&str>,
    calories: Option<f64>,
    protein: Option<f64>,
    ingredient_args: &[String],
    json: bool,
) -> Result<()> {
    let Some(existing) = service.get_food(name)? else {
        bail!("No food named '{name}'");
    };
    let new_name = rename.unwrap_or(name);

    let updated = match existing {
        Food::Basic(basic) => {
            if !ingredient_args.is_empty() {
                bail!("'{name}' is a basic food; it has no ingredients");
            }
            let calories = calories.unwrap_or(basic.calories_per_100g);
            let protein = protein.unwrap_or(basic.protein_per_100g);
            Food::Basic(service.rename_and_update_basic(name, new_name, calories, protein)?)
        }
        Food::Composite(composite) => {
            if calories.is_some() || protein.is_some() {
                bail!(
                    "'{name}' is a composite food; its values are derived from \
                     its ingredients and cannot be set directly"
                );
            }
            let ingredients = if ingredient_args.is_empty() {
                composite.ingredients
            } else {
                parse_ingredients(ingredient_args)?
            };
            Food::Composite(service.rename_and_update_composite(name, new_name, &ingredients)?)
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else {
        let n = updated.nutrition();
        println!(
            "Updated {} — {:.1} kcal, {:.1}g protein per 100g",
            updated.name(),
            n.calories_per_100g,
            n.protein_per_100g
        );
    }

    Ok(())
}

pub(crate) fn cmd_food_list(service: &TallyService, json: bool) -> Result<()> {
    let foods = service.list_foods()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
        return Ok(());
    }

    if foods.is_empty() {
        eprintln!("The catalog is empty. Use `tally food add` to create a food.");
        process::exit(2);
    }

    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Kind")]
        kind: &'static str,
        #[tabled(rename = "Cal/100g")]
        calories: String,
        #[tabled(rename = "Protein/100g")]
        protein: String,
    }

    let rows: Vec<FoodRow> = foods
        .iter()
        .map(|food| {
            let n = food.nutrition();
            FoodRow {
                name: food.name().to_string(),
                kind: match food {
                    Food::Basic(_) => "basic",
                    Food::Composite(_) => "composite",
                },
                calories: format!("{:.1}", n.calories_per_100g),
                protein: format!("{:.1}", n.protein_per_100g),
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_food_show(service: &TallyService, name: &str, json: bool) -> Result<()> {
    let Some(food) = service.get_food(name)? else {
        bail!("No food named '{name}'");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&food)?);
        return Ok(());
    }

    let n = food.nutrition();
    println!("{}", food.name());
    println!(
        "  {:.1} kcal, {:.1}g protein per 100g",
        n.calories_per_100g, n.protein_per_100g
    );
    if let Food::Composite(composite) = &food {
        println!("  Ingredients:");
        for ingredient in &composite.ingredients {
            println!("    {} — {:.0}g", ingredient.name, ingredient.quantity_g);
        }
    }

    Ok(())
}

fn parse_ingredients(args: &[String]) -> Result<Vec<Ingredient>> {
    args.iter()
        .map(|arg| {
            let (name, quantity_g) = parse_name_value(arg)?;
            Ok(Ingredient { name, quantity_g })
        })
        .collect()
}
