mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use crate::commands::{
    cmd_burn, cmd_calc, cmd_chart, cmd_day_edit, cmd_day_show, cmd_eat, cmd_food_add,
    cmd_food_compose, cmd_food_edit, cmd_food_list, cmd_food_show, cmd_goal_set, cmd_goal_show,
    cmd_history, cmd_style_font, cmd_style_set, cmd_style_show, cmd_weight_log,
};
use crate::config::Config;
use tally_core::models::EXERCISE_PRESETS;
use tally_core::service::TallyService;

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "A local-first diet and weight trend tracker",
    long_about = "Log daily weight, food, and exercise; tally keeps the catalog,\n\
                  derives per-day calories and protein, and charts weight against\n\
                  intake on a shared scale."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log body weight for a date
    Weight {
        /// Weight in kg
        value: f64,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log a food eaten on a date
    Eat {
        /// Food name from the catalog
        food: String,
        /// Quantity in grams (e.g. "200" or "200g")
        grams: String,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log exercise calories burned on a date
    Burn {
        /// Exercise name
        #[arg(long_help = format!("Exercise name. Free-form; common choices: {}", EXERCISE_PRESETS.join(", ")))]
        exercise: String,
        /// Calories burned
        calories: f64,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Grams of a food that add up to a calorie amount
    Calc {
        /// Food name from the catalog
        food: String,
        /// Calorie amount to hit
        calories: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or edit one day's record
    Day {
        #[command(subcommand)]
        command: DayCommands,
    },
    /// Manage the food catalog
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// Full history with daily totals and weight deltas, newest first
    History {
        /// Limit to the most recent N days
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Chart series with the dual-axis normalization and tick set
    Chart {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or set the goal weight
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
    /// Display preferences for the chart series and font
    Style {
        #[command(subcommand)]
        command: StyleCommands,
    },
}

#[derive(Subcommand)]
enum DayCommands {
    /// Show a day's record and totals (default: today)
    Show {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace a day's record wholesale
    Edit {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow)
        date: String,
        /// New weight in kg
        #[arg(long, conflicts_with = "clear_weight")]
        weight: Option<f64>,
        /// Remove the weight entry for this date
        #[arg(long)]
        clear_weight: bool,
        /// Food entry as "name:grams" (repeatable)
        #[arg(long = "food", value_name = "NAME:GRAMS")]
        foods: Vec<String>,
        /// Exercise entry as "name:calories" (repeatable)
        #[arg(long = "exercise", value_name = "NAME:KCAL")]
        exercises: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// Add a basic food with directly entered facts
    Add {
        /// Food name (must be unique across basic and composite foods)
        name: String,
        /// Calories per 100g
        #[arg(long)]
        calories: f64,
        /// Protein per 100g
        #[arg(long)]
        protein: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a composite food from ingredient foods
    Compose {
        /// Composite name
        name: String,
        /// Ingredients as "name:grams"
        #[arg(required = true, value_name = "NAME:GRAMS")]
        ingredients: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename and update a food
    Edit {
        /// Current food name
        name: String,
        /// New name
        #[arg(long)]
        rename: Option<String>,
        /// New calories per 100g (basic foods only)
        #[arg(long)]
        calories: Option<f64>,
        /// New protein per 100g (basic foods only)
        #[arg(long)]
        protein: Option<f64>,
        /// Replacement ingredient as "name:grams" (composites only, repeatable)
        #[arg(long = "ingredient", value_name = "NAME:GRAMS")]
        ingredients: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the catalog
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one food's resolved facts (and ingredients, if composite)
    Show {
        /// Food name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum GoalCommands {
    /// Show the configured goal weight
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the goal weight in kg
    Set {
        /// Goal weight in kg
        kg: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum StyleCommands {
    /// Show current display settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change one series' style (weight, calories-in, calories-out)
    Set {
        /// Series: weight, calories-in, calories-out
        series: String,
        /// Point color: Red, Blue, Green, Yellow, Black, White
        #[arg(long)]
        color: Option<String>,
        /// Point shape: Circle, Square, Triangle
        #[arg(long)]
        shape: Option<String>,
        /// Opacity 0-100
        #[arg(long)]
        opacity: Option<f64>,
        /// Point size
        #[arg(long)]
        size: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the table/chart font
    Font {
        /// Font family (e.g. Arial, Helvetica, Times New Roman, Courier)
        family: String,
        /// Font size: Small, Medium, Large
        size: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    if let Ok(logger) = flexi_logger::Logger::try_with_env_or_str("warn") {
        let _ = logger.start();
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let service = TallyService::new(&config.db_path)?;

    match cli.command {
        Commands::Weight { value, date, json } => cmd_weight_log(&service, value, date, json),
        Commands::Eat {
            food,
            grams,
            date,
            json,
        } => cmd_eat(&service, &food, &grams, date, json),
        Commands::Burn {
            exercise,
            calories,
            date,
            json,
        } => cmd_burn(&service, &exercise, calories, date, json),
        Commands::Calc {
            food,
            calories,
            json,
        } => cmd_calc(&service, &food, calories, json),
        Commands::Day { command } => match command {
            DayCommands::Show { date, json } => cmd_day_show(&service, date, json),
            DayCommands::Edit {
                date,
                weight,
                clear_weight,
                foods,
                exercises,
                json,
            } => cmd_day_edit(
                &service,
                &date,
                weight,
                clear_weight,
                &foods,
                &exercises,
                json,
            ),
        },
        Commands::Food { command } => match command {
            FoodCommands::Add {
                name,
                calories,
                protein,
                json,
            } => cmd_food_add(&service, &name, calories, protein, json),
            FoodCommands::Compose {
                name,
                ingredients,
                json,
            } => cmd_food_compose(&service, &name, &ingredients, json),
            FoodCommands::Edit {
                name,
                rename,
                calories,
                protein,
                ingredients,
                json,
            } => cmd_food_edit(
                &service,
                &name,
                rename.as_deref(),
                calories,
                protein,
                &ingredients,
                json,
            ),
            FoodCommands::List { json } => cmd_food_list(&service, json),
            FoodCommands::Show { name, json } => cmd_food_show(&service, &name, json),
        },
        Commands::History { limit, json } => cmd_history(&service, limit, json),
        Commands::Chart { json } => cmd_chart(&service, json),
        Commands::Goal { command } => match command {
            GoalCommands::Show { json } => cmd_goal_show(&service, json),
            GoalCommands::Set { kg, json } => cmd_goal_set(&service, kg, json),
        },
        Commands::Style { command } => match command {
            StyleCommands::Show { json } => cmd_style_show(&service, json),
            StyleCommands::Set {
                series,
                color,
                shape,
                opacity,
                size,
                json,
            } => cmd_style_set(&service, &series, color, shape, opacity, size, json),
            StyleCommands::Font { family, size, json } => {
                cmd_style_font(&service, &family, &size, json)
            }
        },
    }
}
