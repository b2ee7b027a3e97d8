use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Goal weight (kg) seeded into a fresh settings row.
pub const DEFAULT_GOAL_WEIGHT: f64 = 75.0;

/// Grams of protein per kg of body weight below which a day is flagged.
pub const PROTEIN_PER_KG_THRESHOLD: f64 = 0.8;

pub const EXERCISE_PRESETS: &[&str] = &[
    "Cycling",
    "Swimming",
    "Jogging",
    "Climbing",
    "Weight Training",
];

pub const SERIES_COLORS: &[&str] = &["Red", "Blue", "Green", "Yellow", "Black", "White"];
pub const SERIES_SHAPES: &[&str] = &["Circle", "Square", "Triangle"];
pub const FONT_SIZES: &[&str] = &["Small", "Medium", "Large"];

/// Per-100g nutrition facts, the unit every resolution produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BasicFood {
    pub id: i64,
    pub name: String,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
}

/// A food blended from other foods. `calories_per_100g`/`protein_per_100g`
/// are a snapshot taken when the composite was last saved; they do not follow
/// later edits to the ingredients.
#[derive(Debug, Clone, Serialize)]
pub struct CompositeFood {
    pub id: i64,
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
}

/// One composite ingredient: a food referenced by name, and how much of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity_g: f64,
}

/// A catalog entry, either directly entered facts or a saved blend.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Food {
    Basic(BasicFood),
    Composite(CompositeFood),
}

impl Food {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Food::Basic(f) => &f.name,
            Food::Composite(f) => &f.name,
        }
    }

    #[must_use]
    pub fn nutrition(&self) -> Nutrition {
        match self {
            Food::Basic(f) => Nutrition {
                calories_per_100g: f.calories_per_100g,
                protein_per_100g: f.protein_per_100g,
            },
            Food::Composite(f) => Nutrition {
                calories_per_100g: f.calories_per_100g,
                protein_per_100g: f.protein_per_100g,
            },
        }
    }
}

/// A food eaten on some day: catalog name plus grams consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodPortion {
    pub name: String,
    pub quantity_g: f64,
}

/// An exercise logged on some day. Calories are entered directly, not derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub name: String,
    pub calories: f64,
}

/// Everything recorded for one calendar date. At most one record per date
/// exists; writes merge into it rather than replacing it.
#[derive(Debug, Clone, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub weight: Option<f64>,
    pub food_consumed: Vec<FoodPortion>,
    pub exercises: Vec<ExerciseEntry>,
}

impl DailyRecord {
    #[must_use]
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            weight: None,
            food_consumed: Vec::new(),
            exercises: Vec::new(),
        }
    }
}

/// Aggregated totals for one day. `unresolved` lists food names that matched
/// nothing in the catalog and therefore counted as zero.
#[derive(Debug, Clone, Serialize)]
pub struct DayTotals {
    pub date: NaiveDate,
    pub calories_in: f64,
    pub calories_out: f64,
    pub protein: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

/// How one plotted series is drawn. Opacity is 0-100, size in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    pub color: String,
    pub shape: String,
    pub opacity: f64,
    pub size: f64,
}

/// The settings singleton: display preferences consumed by the presentation
/// layer, plus the configured goal weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub font_family: String,
    pub font_size: String,
    pub weight: SeriesStyle,
    pub calories_in: SeriesStyle,
    pub calories_out: SeriesStyle,
    pub goal_weight: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: "Medium".to_string(),
            weight: SeriesStyle {
                color: "Blue".to_string(),
                shape: "Circle".to_string(),
                opacity: 100.0,
                size: 10.0,
            },
            calories_in: SeriesStyle {
                color: "Green".to_string(),
                shape: "Square".to_string(),
                opacity: 100.0,
                size: 10.0,
            },
            calories_out: SeriesStyle {
                color: "Red".to_string(),
                shape: "Triangle".to_string(),
                opacity: 100.0,
                size: 10.0,
            },
            goal_weight: DEFAULT_GOAL_WEIGHT,
        }
    }
}

/// Point size for a named font size. Unknown names fall back to Medium.
#[must_use]
pub fn font_point_size(size: &str) -> u32 {
    match size {
        "Small" => 10,
        "Large" => 18,
        _ => 14,
    }
}

/// Plot symbol for a shape name, in the chart widget's vocabulary.
#[must_use]
pub fn shape_symbol(shape: &str) -> char {
    match shape {
        "Square" => 's',
        "Triangle" => 't',
        _ => 'o',
    }
}

// --- Pair-list record format ---
//
// Lists of (name, value) pairs are persisted as `name,value;name,value`.
// The format has no escaping, so names are rejected at write time if they
// contain either separator.

/// Encode `(name, value)` pairs into the serialized record format.
pub fn encode_pairs<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    pairs
        .into_iter()
        .map(|(name, value)| format!("{name},{value}"))
        .collect::<Vec<_>>()
        .join(";")
}

/// Parse a serialized pair list. An empty field is an empty list; anything
/// that is not `name,number` items joined by `;` is a malformed record.
pub fn parse_pairs(raw: &str) -> Result<Vec<(String, f64)>, Error> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let mut pairs = Vec::new();
    for item in raw.split(';') {
        let Some((name, value)) = item.split_once(',') else {
            return Err(Error::MalformedRecord(item.to_string()));
        };
        if name.is_empty() {
            return Err(Error::MalformedRecord(item.to_string()));
        }
        let value: f64 = value
            .parse()
            .map_err(|_| Error::MalformedRecord(item.to_string()))?;
        pairs.push((name.to_string(), value));
    }
    Ok(pairs)
}

// --- Validation ---

/// Validate a name that will be embedded in the pair-list record format.
pub fn validate_entry_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Name must not be empty");
    }
    if name.contains(',') || name.contains(';') {
        bail!("Name '{name}' must not contain ',' or ';'");
    }
    Ok(())
}

pub fn validate_nutrition(calories_per_100g: f64, protein_per_100g: f64) -> Result<()> {
    if !calories_per_100g.is_finite() || calories_per_100g < 0.0 {
        bail!("calories_per_100g must not be negative");
    }
    if !protein_per_100g.is_finite() || protein_per_100g < 0.0 {
        bail!("protein_per_100g must not be negative");
    }
    Ok(())
}

pub fn validate_quantity(quantity_g: f64) -> Result<()> {
    if !quantity_g.is_finite() || quantity_g <= 0.0 {
        bail!("Quantity must be greater than 0");
    }
    Ok(())
}

pub fn validate_series_style(style: &SeriesStyle) -> Result<()> {
    if !SERIES_COLORS.contains(&style.color.as_str()) {
        bail!(
            "Unknown color '{}'. Must be one of: {}",
            style.color,
            SERIES_COLORS.join(", ")
        );
    }
    if !SERIES_SHAPES.contains(&style.shape.as_str()) {
        bail!(
            "Unknown shape '{}'. Must be one of: {}",
            style.shape,
            SERIES_SHAPES.join(", ")
        );
    }
    if !(0.0..=100.0).contains(&style.opacity) {
        bail!("Opacity must be between 0 and 100");
    }
    if !style.size.is_finite() || style.size <= 0.0 {
        bail!("Size must be greater than 0");
    }
    Ok(())
}

pub fn validate_settings(settings: &Settings) -> Result<()> {
    if !FONT_SIZES.contains(&settings.font_size.as_str()) {
        bail!(
            "Unknown font size '{}'. Must be one of: {}",
            settings.font_size,
            FONT_SIZES.join(", ")
        );
    }
    if settings.font_family.trim().is_empty() {
        bail!("Font family must not be empty");
    }
    validate_series_style(&settings.weight)?;
    validate_series_style(&settings.calories_in)?;
    validate_series_style(&settings.calories_out)?;
    if !settings.goal_weight.is_finite() || settings.goal_weight <= 0.0 {
        bail!("Goal weight must be greater than 0");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pairs() {
        let encoded = encode_pairs([("Rice", 200.0), ("Chicken", 150.5)]);
        assert_eq!(encoded, "Rice,200;Chicken,150.5");
    }

    #[test]
    fn test_encode_pairs_empty() {
        assert_eq!(encode_pairs([]), "");
    }

    #[test]
    fn test_parse_pairs_round_trip() {
        let original = vec![("Rice".to_string(), 200.0), ("Chicken".to_string(), 150.5)];
        let encoded = encode_pairs(original.iter().map(|(n, v)| (n.as_str(), *v)));
        let parsed = parse_pairs(&encoded).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_parse_pairs_empty_is_empty_list() {
        assert!(parse_pairs("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_pairs_malformed() {
        assert!(matches!(
            parse_pairs("no-comma"),
            Err(Error::MalformedRecord(_))
        ));
        assert!(matches!(
            parse_pairs("Rice,abc"),
            Err(Error::MalformedRecord(_))
        ));
        assert!(matches!(parse_pairs(",5"), Err(Error::MalformedRecord(_))));
        assert!(matches!(
            parse_pairs("Rice,200;"),
            Err(Error::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_validate_entry_name() {
        assert!(validate_entry_name("Rice").is_ok());
        assert!(validate_entry_name("Brown Rice (cooked)").is_ok());
        assert!(validate_entry_name("").is_err());
        assert!(validate_entry_name("   ").is_err());
        assert!(validate_entry_name("a,b").is_err());
        assert!(validate_entry_name("a;b").is_err());
    }

    #[test]
    fn test_validate_nutrition() {
        assert!(validate_nutrition(130.0, 2.7).is_ok());
        assert!(validate_nutrition(0.0, 0.0).is_ok());
        assert!(validate_nutrition(-1.0, 0.0).is_err());
        assert!(validate_nutrition(0.0, -1.0).is_err());
        assert!(validate_nutrition(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(100.0).is_ok());
        assert!(validate_quantity(0.0).is_err());
        assert!(validate_quantity(-5.0).is_err());
        assert!(validate_quantity(f64::INFINITY).is_err());
    }

    #[test]
    fn test_font_point_size() {
        assert_eq!(font_point_size("Small"), 10);
        assert_eq!(font_point_size("Medium"), 14);
        assert_eq!(font_point_size("Large"), 18);
        assert_eq!(font_point_size("Enormous"), 14);
    }

    #[test]
    fn test_shape_symbol() {
        assert_eq!(shape_symbol("Circle"), 'o');
        assert_eq!(shape_symbol("Square"), 's');
        assert_eq!(shape_symbol("Triangle"), 't');
        assert_eq!(shape_symbol("Hexagon"), 'o');
    }

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(validate_settings(&settings).is_ok());
        assert_eq!(settings.weight.color, "Blue");
        assert_eq!(settings.calories_in.shape, "Square");
        assert_eq!(settings.calories_out.color, "Red");
        assert!((settings.goal_weight - DEFAULT_GOAL_WEIGHT).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_series_style_bounds() {
        let mut style = Settings::default().weight;
        style.opacity = 101.0;
        assert!(validate_series_style(&style).is_err());
        style.opacity = 100.0;
        style.size = 0.0;
        assert!(validate_series_style(&style).is_err());
        style.size = 10.0;
        style.color = "Mauve".to_string();
        assert!(validate_series_style(&style).is_err());
    }

    #[test]
    fn test_food_accessors() {
        let food = Food::Basic(BasicFood {
            id: 1,
            name: "Rice".to_string(),
            calories_per_100g: 130.0,
            protein_per_100g: 2.7,
        });
        assert_eq!(food.name(), "Rice");
        let n = food.nutrition();
        assert!((n.calories_per_100g - 130.0).abs() < f64::EPSILON);
        assert!((n.protein_per_100g - 2.7).abs() < f64::EPSILON);
    }
}
