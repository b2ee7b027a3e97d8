use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::warn;
use rusqlite::{Connection, params};

use crate::error::Error;
use crate::models::{
    BasicFood, CompositeFood, DailyRecord, ExerciseEntry, Food, FoodPortion, Ingredient,
    Nutrition, Settings, SeriesStyle, encode_pairs, parse_pairs, validate_entry_name,
    validate_nutrition, validate_settings,
};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS settings (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    font_family TEXT NOT NULL,
                    font_size TEXT NOT NULL,
                    weight_color TEXT NOT NULL,
                    weight_shape TEXT NOT NULL,
                    weight_opacity REAL NOT NULL,
                    weight_size REAL NOT NULL,
                    calories_in_color TEXT NOT NULL,
                    calories_in_shape TEXT NOT NULL,
                    calories_in_opacity REAL NOT NULL,
                    calories_in_size REAL NOT NULL,
                    calories_out_color TEXT NOT NULL,
                    calories_out_shape TEXT NOT NULL,
                    calories_out_opacity REAL NOT NULL,
                    calories_out_size REAL NOT NULL,
                    goal_weight REAL NOT NULL
                );

                CREATE TABLE IF NOT EXISTS basic_food (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    calories_per_100g REAL NOT NULL,
                    protein_per_100g REAL NOT NULL
                );

                CREATE TABLE IF NOT EXISTS composite_food (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    ingredients TEXT NOT NULL,
                    calories_per_100g REAL NOT NULL,
                    protein_per_100g REAL NOT NULL
                );

                CREATE TABLE IF NOT EXISTS daily_data (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    date TEXT NOT NULL UNIQUE,
                    weight REAL,
                    food_consumed TEXT NOT NULL DEFAULT '',
                    exercises TEXT NOT NULL DEFAULT ''
                );

                PRAGMA user_version = 1;",
            )?;
        }

        // Idempotent, so the singleton self-heals even if an earlier open
        // crashed between schema creation and seeding.
        self.seed_default_settings()?;

        Ok(())
    }

    /// Insert the settings singleton with defaults. A no-op when the row
    /// already exists.
    fn seed_default_settings(&self) -> Result<()> {
        let s = Settings::default();
        self.conn.execute(
            "INSERT OR IGNORE INTO settings (
                id, font_family, font_size,
                weight_color, weight_shape, weight_opacity, weight_size,
                calories_in_color, calories_in_shape, calories_in_opacity, calories_in_size,
                calories_out_color, calories_out_shape, calories_out_opacity, calories_out_size,
                goal_weight
             ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                s.font_family,
                s.font_size,
                s.weight.color,
                s.weight.shape,
                s.weight.opacity,
                s.weight.size,
                s.calories_in.color,
                s.calories_in.shape,
                s.calories_in.opacity,
                s.calories_in.size,
                s.calories_out.color,
                s.calories_out.shape,
                s.calories_out.opacity,
                s.calories_out.size,
                s.goal_weight,
            ],
        )?;
        Ok(())
    }

    // --- Row mapping helpers ---

    fn basic_from_row(row: &rusqlite::Row) -> rusqlite::Result<BasicFood> {
        Ok(BasicFood {
            id: row.get(0)?,
            name: row.get(1)?,
            calories_per_100g: row.get(2)?,
            protein_per_100g: row.get(3)?,
        })
    }

    fn composite_from_row(row: &rusqlite::Row) -> rusqlite::Result<CompositeFood> {
        let name: String = row.get(1)?;
        let raw: String = row.get(2)?;
        let ingredients = tolerant_pairs(&raw, "composite_food.ingredients", &name)
            .into_iter()
            .map(|(name, quantity_g)| Ingredient { name, quantity_g })
            .collect();
        Ok(CompositeFood {
            id: row.get(0)?,
            name,
            ingredients,
            calories_per_100g: row.get(3)?,
            protein_per_100g: row.get(4)?,
        })
    }

    fn record_from_row(row: &rusqlite::Row) -> rusqlite::Result<DailyRecord> {
        let date_str: String = row.get(0)?;
        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid date"));
        let food_raw: String = row.get(2)?;
        let exercise_raw: String = row.get(3)?;
        let food_consumed = tolerant_pairs(&food_raw, "daily_data.food_consumed", &date_str)
            .into_iter()
            .map(|(name, quantity_g)| FoodPortion { name, quantity_g })
            .collect();
        let exercises = tolerant_pairs(&exercise_raw, "daily_data.exercises", &date_str)
            .into_iter()
            .map(|(name, calories)| ExerciseEntry { name, calories })
            .collect();
        Ok(DailyRecord {
            date,
            weight: row.get(1)?,
            food_consumed,
            exercises,
        })
    }

    // --- Food catalog ---

    /// True when a food with this exact name exists in either table.
    pub fn food_name_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT (SELECT COUNT(*) FROM basic_food WHERE name = ?1)
                  + (SELECT COUNT(*) FROM composite_food WHERE name = ?1)",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn insert_basic(
        &self,
        name: &str,
        calories_per_100g: f64,
        protein_per_100g: f64,
    ) -> Result<BasicFood> {
        validate_entry_name(name)?;
        validate_nutrition(calories_per_100g, protein_per_100g)?;
        if self.food_name_exists(name)? {
            return Err(Error::DuplicateName(name.to_string()).into());
        }
        self.conn.execute(
            "INSERT INTO basic_food (name, calories_per_100g, protein_per_100g)
             VALUES (?1, ?2, ?3)",
            params![name, calories_per_100g, protein_per_100g],
        )?;
        Ok(BasicFood {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            calories_per_100g,
            protein_per_100g,
        })
    }

    /// Store a composite with its already-blended nutrition snapshot.
    /// Resolution and blending happen in the engine before this call.
    pub fn insert_composite(
        &self,
        name: &str,
        ingredients: &[Ingredient],
        nutrition: Nutrition,
    ) -> Result<CompositeFood> {
        validate_entry_name(name)?;
        for ingredient in ingredients {
            validate_entry_name(&ingredient.name)?;
        }
        if self.food_name_exists(name)? {
            return Err(Error::DuplicateName(name.to_string()).into());
        }
        let encoded = encode_pairs(ingredients.iter().map(|i| (i.name.as_str(), i.quantity_g)));
        self.conn.execute(
            "INSERT INTO composite_food (name, ingredients, calories_per_100g, protein_per_100g)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                name,
                encoded,
                nutrition.calories_per_100g,
                nutrition.protein_per_100g
            ],
        )?;
        Ok(CompositeFood {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            ingredients: ingredients.to_vec(),
            calories_per_100g: nutrition.calories_per_100g,
            protein_per_100g: nutrition.protein_per_100g,
        })
    }

    pub fn update_basic(
        &self,
        old_name: &str,
        name: &str,
        calories_per_100g: f64,
        protein_per_100g: f64,
    ) -> Result<BasicFood> {
        validate_entry_name(name)?;
        validate_nutrition(calories_per_100g, protein_per_100g)?;
        if name != old_name && self.food_name_exists(name)? {
            return Err(Error::DuplicateName(name.to_string()).into());
        }
        let rows = self.conn.execute(
            "UPDATE basic_food SET name = ?1, calories_per_100g = ?2, protein_per_100g = ?3
             WHERE name = ?4",
            params![name, calories_per_100g, protein_per_100g, old_name],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(old_name.to_string()).into());
        }
        self.get_basic(name)?.context("Food not found after update")
    }

    pub fn update_composite(
        &self,
        old_name: &str,
        name: &str,
        ingredients: &[Ingredient],
        nutrition: Nutrition,
    ) -> Result<CompositeFood> {
        validate_entry_name(name)?;
        for ingredient in ingredients {
            validate_entry_name(&ingredient.name)?;
        }
        if name != old_name && self.food_name_exists(name)? {
            return Err(Error::DuplicateName(name.to_string()).into());
        }
        let encoded = encode_pairs(ingredients.iter().map(|i| (i.name.as_str(), i.quantity_g)));
        let rows = self.conn.execute(
            "UPDATE composite_food
             SET name = ?1, ingredients = ?2, calories_per_100g = ?3, protein_per_100g = ?4
             WHERE name = ?5",
            params![
                name,
                encoded,
                nutrition.calories_per_100g,
                nutrition.protein_per_100g,
                old_name
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(old_name.to_string()).into());
        }
        self.get_composite(name)?
            .context("Food not found after update")
    }

    pub fn get_basic(&self, name: &str) -> Result<Option<BasicFood>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, calories_per_100g, protein_per_100g FROM basic_food WHERE name = ?1",
        )?;
        let mut rows = stmt.query(params![name])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::basic_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn get_composite(&self, name: &str) -> Result<Option<CompositeFood>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, ingredients, calories_per_100g, protein_per_100g
             FROM composite_food WHERE name = ?1",
        )?;
        let mut rows = stmt.query(params![name])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::composite_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Look a name up as a Basic food first, then as a Composite.
    pub fn resolve_food(&self, name: &str) -> Result<Option<Food>> {
        if let Some(basic) = self.get_basic(name)? {
            return Ok(Some(Food::Basic(basic)));
        }
        if let Some(composite) = self.get_composite(name)? {
            return Ok(Some(Food::Composite(composite)));
        }
        Ok(None)
    }

    /// Every food name in the catalog, Basic and Composite, ascending.
    pub fn list_food_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM basic_food UNION SELECT name FROM composite_food ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Every catalog entry with its resolved facts, ascending by name.
    pub fn list_foods(&self) -> Result<Vec<Food>> {
        let mut foods = Vec::new();
        for name in self.list_food_names()? {
            if let Some(food) = self.resolve_food(&name)? {
                foods.push(food);
            }
        }
        Ok(foods)
    }

    // --- Daily records ---

    /// Set or overwrite the weight for a date, preserving that day's food and
    /// exercise entries.
    pub fn upsert_weight(&self, date: NaiveDate, weight: f64) -> Result<()> {
        let date_str = date.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO daily_data (date, weight) VALUES (?1, ?2)
             ON CONFLICT(date) DO UPDATE SET weight = excluded.weight",
            params![date_str, weight],
        )?;
        Ok(())
    }

    /// Append a food entry to a date. Entries accumulate; repeats of the same
    /// name are kept as separate entries.
    pub fn append_food(&self, date: NaiveDate, name: &str, quantity_g: f64) -> Result<()> {
        validate_entry_name(name)?;
        let date_str = date.format("%Y-%m-%d").to_string();
        let entry = encode_pairs([(name, quantity_g)]);
        self.conn.execute(
            "INSERT INTO daily_data (date, food_consumed) VALUES (?1, ?2)
             ON CONFLICT(date) DO UPDATE SET food_consumed =
                 CASE WHEN daily_data.food_consumed = '' THEN excluded.food_consumed
                      ELSE daily_data.food_consumed || ';' || excluded.food_consumed END",
            params![date_str, entry],
        )?;
        Ok(())
    }

    /// Append an exercise entry to a date. Same accumulation rules as food.
    pub fn append_exercise(&self, date: NaiveDate, name: &str, calories: f64) -> Result<()> {
        validate_entry_name(name)?;
        let date_str = date.format("%Y-%m-%d").to_string();
        let entry = encode_pairs([(name, calories)]);
        self.conn.execute(
            "INSERT INTO daily_data (date, exercises) VALUES (?1, ?2)
             ON CONFLICT(date) DO UPDATE SET exercises =
                 CASE WHEN daily_data.exercises = '' THEN excluded.exercises
                      ELSE daily_data.exercises || ';' || excluded.exercises END",
            params![date_str, entry],
        )?;
        Ok(())
    }

    /// Overwrite one date's record entirely. `weight: None` clears the weight.
    pub fn replace_record(
        &self,
        date: NaiveDate,
        weight: Option<f64>,
        food: &[FoodPortion],
        exercises: &[ExerciseEntry],
    ) -> Result<()> {
        for portion in food {
            validate_entry_name(&portion.name)?;
        }
        for exercise in exercises {
            validate_entry_name(&exercise.name)?;
        }
        let date_str = date.format("%Y-%m-%d").to_string();
        let food_str = encode_pairs(food.iter().map(|p| (p.name.as_str(), p.quantity_g)));
        let exercise_str = encode_pairs(exercises.iter().map(|e| (e.name.as_str(), e.calories)));
        self.conn.execute(
            "INSERT OR REPLACE INTO daily_data (date, weight, food_consumed, exercises)
             VALUES (?1, ?2, ?3, ?4)",
            params![date_str, weight, food_str, exercise_str],
        )?;
        Ok(())
    }

    /// The record for a date, or an empty record when none was written yet.
    pub fn get_day(&self, date: NaiveDate) -> Result<DailyRecord> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(
            "SELECT date, weight, food_consumed, exercises FROM daily_data WHERE date = ?1",
        )?;
        let mut rows = stmt.query(params![date_str])?;
        if let Some(row) = rows.next()? {
            Ok(Self::record_from_row(row)?)
        } else {
            Ok(DailyRecord::empty(date))
        }
    }

    /// All records, ascending by date.
    pub fn all_days_ordered(&self) -> Result<Vec<DailyRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, weight, food_consumed, exercises FROM daily_data ORDER BY date ASC",
        )?;
        let records = stmt
            .query_map([], Self::record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    // --- Settings ---

    pub fn load_settings(&self) -> Result<Settings> {
        self.conn
            .query_row(
                "SELECT font_family, font_size,
                        weight_color, weight_shape, weight_opacity, weight_size,
                        calories_in_color, calories_in_shape, calories_in_opacity, calories_in_size,
                        calories_out_color, calories_out_shape, calories_out_opacity, calories_out_size,
                        goal_weight
                 FROM settings WHERE id = 1",
                [],
                Self::settings_from_row,
            )
            .context("Settings row missing")
    }

    fn settings_from_row(row: &rusqlite::Row) -> rusqlite::Result<Settings> {
        let style_at = |base: usize| -> rusqlite::Result<SeriesStyle> {
            Ok(SeriesStyle {
                color: row.get(base)?,
                shape: row.get(base + 1)?,
                opacity: row.get(base + 2)?,
                size: row.get(base + 3)?,
            })
        };
        Ok(Settings {
            font_family: row.get(0)?,
            font_size: row.get(1)?,
            weight: style_at(2)?,
            calories_in: style_at(6)?,
            calories_out: style_at(10)?,
            goal_weight: row.get(14)?,
        })
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        validate_settings(settings)?;
        self.conn.execute(
            "UPDATE settings SET
                font_family = ?1, font_size = ?2,
                weight_color = ?3, weight_shape = ?4, weight_opacity = ?5, weight_size = ?6,
                calories_in_color = ?7, calories_in_shape = ?8,
                calories_in_opacity = ?9, calories_in_size = ?10,
                calories_out_color = ?11, calories_out_shape = ?12,
                calories_out_opacity = ?13, calories_out_size = ?14,
                goal_weight = ?15
             WHERE id = 1",
            params![
                settings.font_family,
                settings.font_size,
                settings.weight.color,
                settings.weight.shape,
                settings.weight.opacity,
                settings.weight.size,
                settings.calories_in.color,
                settings.calories_in.shape,
                settings.calories_in.opacity,
                settings.calories_in.size,
                settings.calories_out.color,
                settings.calories_out.shape,
                settings.calories_out.opacity,
                settings.calories_out.size,
                settings.goal_weight,
            ],
        )?;
        Ok(())
    }

    pub fn goal_weight(&self) -> Result<f64> {
        self.conn
            .query_row("SELECT goal_weight FROM settings WHERE id = 1", [], |row| {
                row.get(0)
            })
            .context("Settings row missing")
    }

    pub fn set_goal_weight(&self, goal: f64) -> Result<()> {
        if !goal.is_finite() || goal <= 0.0 {
            anyhow::bail!("Goal weight must be greater than 0");
        }
        self.conn.execute(
            "UPDATE settings SET goal_weight = ?1 WHERE id = 1",
            params![goal],
        )?;
        Ok(())
    }
}

/// Read a serialized pair list, degrading to an empty list when the stored
/// field is malformed.
fn tolerant_pairs(raw: &str, field: &str, key: &str) -> Vec<(String, f64)> {
    match parse_pairs(raw) {
        Ok(pairs) => pairs,
        Err(e) => {
            warn!("ignoring {field} for '{key}': {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn nutrition(calories: f64, protein: f64) -> Nutrition {
        Nutrition {
            calories_per_100g: calories,
            protein_per_100g: protein,
        }
    }

    #[test]
    fn test_insert_and_get_basic() {
        let db = Database::open_in_memory().unwrap();
        let food = db.insert_basic("Rice", 130.0, 2.7).unwrap();
        assert_eq!(food.name, "Rice");

        let fetched = db.get_basic("Rice").unwrap().unwrap();
        assert_eq!(fetched.id, food.id);
        assert_eq!(fetched.calories_per_100g, 130.0);
        assert_eq!(fetched.protein_per_100g, 2.7);
    }

    #[test]
    fn test_duplicate_basic_name_rejected_and_original_untouched() {
        let db = Database::open_in_memory().unwrap();
        db.insert_basic("Rice", 130.0, 2.7).unwrap();

        let err = db.insert_basic("Rice", 999.0, 99.0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::DuplicateName("Rice".to_string()))
        );

        // The failed insert must not have altered the stored values.
        let stored = db.get_basic("Rice").unwrap().unwrap();
        assert_eq!(stored.calories_per_100g, 130.0);
        assert_eq!(stored.protein_per_100g, 2.7);
    }

    #[test]
    fn test_name_uniqueness_spans_both_tables() {
        let db = Database::open_in_memory().unwrap();
        db.insert_basic("Rice", 130.0, 2.7).unwrap();

        let ingredients = vec![Ingredient {
            name: "Rice".to_string(),
            quantity_g: 100.0,
        }];
        let err = db
            .insert_composite("Rice", &ingredients, nutrition(130.0, 2.7))
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::DuplicateName("Rice".to_string()))
        );

        db.insert_composite("Rice Bowl", &ingredients, nutrition(130.0, 2.7))
            .unwrap();
        let err = db.insert_basic("Rice Bowl", 1.0, 1.0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::DuplicateName("Rice Bowl".to_string()))
        );
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let db = Database::open_in_memory().unwrap();
        db.insert_basic("Rice", 130.0, 2.7).unwrap();
        db.insert_basic("rice", 112.0, 2.6).unwrap();

        assert_eq!(
            db.get_basic("Rice").unwrap().unwrap().calories_per_100g,
            130.0
        );
        assert_eq!(
            db.get_basic("rice").unwrap().unwrap().calories_per_100g,
            112.0
        );
    }

    #[test]
    fn test_resolve_prefers_basic_over_composite() {
        let db = Database::open_in_memory().unwrap();
        db.insert_basic("Oats", 380.0, 13.0).unwrap();
        // The API never lets the two tables share a name, so seed the
        // shadowing composite row directly to pin the lookup order down.
        db.conn
            .execute(
                "INSERT INTO composite_food (name, ingredients, calories_per_100g, protein_per_100g)
                 VALUES ('Oats', 'Oats,100', 999.0, 99.0)",
                [],
            )
            .unwrap();

        let food = db.resolve_food("Oats").unwrap().unwrap();
        assert!(matches!(food, Food::Basic(_)));
        assert_eq!(food.nutrition().calories_per_100g, 380.0);
    }

    #[test]
    fn test_update_basic_rename_and_values() {
        let db = Database::open_in_memory().unwrap();
        db.insert_basic("Chiken", 165.0, 31.0).unwrap();

        let updated = db.update_basic("Chiken", "Chicken", 165.0, 31.0).unwrap();
        assert_eq!(updated.name, "Chicken");
        assert!(db.get_basic("Chiken").unwrap().is_none());

        // Same-name update keeps working (rename to itself).
        let updated = db.update_basic("Chicken", "Chicken", 170.0, 31.0).unwrap();
        assert_eq!(updated.calories_per_100g, 170.0);
    }

    #[test]
    fn test_update_basic_duplicate_target_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.insert_basic("Rice", 130.0, 2.7).unwrap();
        db.insert_basic("Chicken", 165.0, 31.0).unwrap();

        let err = db.update_basic("Rice", "Chicken", 130.0, 2.7).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::DuplicateName("Chicken".to_string()))
        );
    }

    #[test]
    fn test_update_missing_food_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = db.update_basic("Ghost", "Ghost", 1.0, 1.0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::NotFound("Ghost".to_string()))
        );
    }

    #[test]
    fn test_composite_ingredients_round_trip() {
        let db = Database::open_in_memory().unwrap();
        db.insert_basic("Rice", 130.0, 2.7).unwrap();
        db.insert_basic("Chicken", 165.0, 31.0).unwrap();

        let ingredients = vec![
            Ingredient {
                name: "Rice".to_string(),
                quantity_g: 200.0,
            },
            Ingredient {
                name: "Chicken".to_string(),
                quantity_g: 150.0,
            },
        ];
        db.insert_composite("Rice Bowl", &ingredients, nutrition(144.97, 14.83))
            .unwrap();

        let stored = db.get_composite("Rice Bowl").unwrap().unwrap();
        assert_eq!(stored.ingredients, ingredients);
    }

    #[test]
    fn test_list_food_names_sorted_across_tables() {
        let db = Database::open_in_memory().unwrap();
        db.insert_basic("Rice", 130.0, 2.7).unwrap();
        db.insert_basic("Chicken", 165.0, 31.0).unwrap();
        db.insert_composite(
            "Bowl",
            &[Ingredient {
                name: "Rice".to_string(),
                quantity_g: 100.0,
            }],
            nutrition(130.0, 2.7),
        )
        .unwrap();

        assert_eq!(db.list_food_names().unwrap(), vec!["Bowl", "Chicken", "Rice"]);
    }

    #[test]
    fn test_upsert_weight_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let d = date("2024-06-15");

        db.upsert_weight(d, 80.0).unwrap();
        let once = db.get_day(d).unwrap();
        db.upsert_weight(d, 80.0).unwrap();
        let twice = db.get_day(d).unwrap();

        assert_eq!(once.weight, Some(80.0));
        assert_eq!(twice.weight, Some(80.0));
        assert_eq!(once.food_consumed, twice.food_consumed);
        assert_eq!(once.exercises, twice.exercises);
    }

    #[test]
    fn test_upsert_weight_preserves_existing_entries() {
        let db = Database::open_in_memory().unwrap();
        let d = date("2024-06-15");

        db.append_food(d, "Rice", 100.0).unwrap();
        db.append_exercise(d, "Cycling", 300.0).unwrap();
        db.upsert_weight(d, 79.5).unwrap();

        let record = db.get_day(d).unwrap();
        assert_eq!(record.weight, Some(79.5));
        assert_eq!(record.food_consumed.len(), 1);
        assert_eq!(record.exercises.len(), 1);
    }

    #[test]
    fn test_append_accumulates_without_dedup() {
        let db = Database::open_in_memory().unwrap();
        let d = date("2024-06-15");

        db.append_food(d, "Rice", 100.0).unwrap();
        db.append_food(d, "Rice", 100.0).unwrap();
        db.append_food(d, "Chicken", 150.0).unwrap();

        let record = db.get_day(d).unwrap();
        assert_eq!(record.food_consumed.len(), 3);
        assert_eq!(record.food_consumed[0].name, "Rice");
        assert_eq!(record.food_consumed[1].name, "Rice");
        assert_eq!(record.food_consumed[2].name, "Chicken");
    }

    #[test]
    fn test_replace_record_overwrites_and_clears_weight() {
        let db = Database::open_in_memory().unwrap();
        let d = date("2024-06-15");

        db.upsert_weight(d, 80.0).unwrap();
        db.append_food(d, "Rice", 100.0).unwrap();

        let food = vec![FoodPortion {
            name: "Chicken".to_string(),
            quantity_g: 150.0,
        }];
        let exercises = vec![ExerciseEntry {
            name: "Swimming".to_string(),
            calories: 400.0,
        }];
        db.replace_record(d, None, &food, &exercises).unwrap();

        let record = db.get_day(d).unwrap();
        assert_eq!(record.weight, None);
        assert_eq!(record.food_consumed, food);
        assert_eq!(record.exercises, exercises);
    }

    #[test]
    fn test_get_day_absent_returns_defaults() {
        let db = Database::open_in_memory().unwrap();
        let record = db.get_day(date("2024-06-15")).unwrap();
        assert_eq!(record.weight, None);
        assert!(record.food_consumed.is_empty());
        assert!(record.exercises.is_empty());
    }

    #[test]
    fn test_all_days_ordered_ascending() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_weight(date("2024-06-17"), 79.0).unwrap();
        db.upsert_weight(date("2024-06-15"), 80.0).unwrap();
        db.upsert_weight(date("2024-06-16"), 79.5).unwrap();

        let dates: Vec<NaiveDate> = db
            .all_days_ordered()
            .unwrap()
            .into_iter()
            .map(|r| r.date)
            .collect();
        assert_eq!(
            dates,
            vec![date("2024-06-15"), date("2024-06-16"), date("2024-06-17")]
        );
    }

    #[test]
    fn test_malformed_stored_field_reads_as_empty() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO daily_data (date, weight, food_consumed, exercises)
                 VALUES ('2024-06-15', 80.0, 'Rice,not-a-number', 'Cycling,300')",
                [],
            )
            .unwrap();

        let record = db.get_day(date("2024-06-15")).unwrap();
        assert_eq!(record.weight, Some(80.0));
        assert!(record.food_consumed.is_empty());
        assert_eq!(record.exercises.len(), 1);
    }

    #[test]
    fn test_delimiter_names_rejected_at_write() {
        let db = Database::open_in_memory().unwrap();
        let d = date("2024-06-15");
        assert!(db.append_food(d, "Rice, cooked", 100.0).is_err());
        assert!(db.append_exercise(d, "Run;Walk", 100.0).is_err());
        assert!(db.insert_basic("a;b", 1.0, 1.0).is_err());
    }

    #[test]
    fn test_settings_seeded_with_defaults() {
        let db = Database::open_in_memory().unwrap();
        let settings = db.load_settings().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_settings_save_and_reload() {
        let db = Database::open_in_memory().unwrap();
        let mut settings = db.load_settings().unwrap();
        settings.font_size = "Large".to_string();
        settings.weight.color = "White".to_string();
        settings.calories_out.opacity = 55.0;
        db.save_settings(&settings).unwrap();

        assert_eq!(db.load_settings().unwrap(), settings);
    }

    #[test]
    fn test_settings_survive_reopen_of_same_connection_migration() {
        let db = Database::open_in_memory().unwrap();
        let mut settings = db.load_settings().unwrap();
        settings.font_family = "Courier".to_string();
        db.save_settings(&settings).unwrap();

        // Re-running migrate must not clobber the stored row.
        db.migrate().unwrap();
        assert_eq!(db.load_settings().unwrap().font_family, "Courier");
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let db = Database::open_in_memory().unwrap();
        let mut settings = db.load_settings().unwrap();
        settings.weight.opacity = 150.0;
        assert!(db.save_settings(&settings).is_err());
    }

    #[test]
    fn test_goal_weight_default_and_update() {
        let db = Database::open_in_memory().unwrap();
        assert!((db.goal_weight().unwrap() - 75.0).abs() < f64::EPSILON);

        db.set_goal_weight(70.0).unwrap();
        assert!((db.goal_weight().unwrap() - 70.0).abs() < f64::EPSILON);

        assert!(db.set_goal_weight(0.0).is_err());
        assert!(db.set_goal_weight(-5.0).is_err());
    }
}
