use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use crate::db::Database;
use crate::engine;
use crate::models::{
    BasicFood, CompositeFood, DailyRecord, DayTotals, ExerciseEntry, Food, FoodPortion,
    Ingredient, Nutrition, Settings, validate_quantity,
};
use crate::trend::{self, ChartData, HistoryRow};

/// The facade the presentation layer talks to.
///
/// Every call is synchronous and completes before returning; callers are
/// expected to re-run the aggregate/trend queries after any mutating call.
pub struct TallyService {
    db: Database,
}

impl TallyService {
    pub fn new(db_path: &Path) -> Result<Self> {
        Ok(Self {
            db: Database::open(db_path)?,
        })
    }

    pub fn new_in_memory() -> Result<Self> {
        Ok(Self {
            db: Database::open_in_memory()?,
        })
    }

    // --- Food catalog ---

    pub fn add_basic(
        &self,
        name: &str,
        calories_per_100g: f64,
        protein_per_100g: f64,
    ) -> Result<BasicFood> {
        self.db
            .insert_basic(name, calories_per_100g, protein_per_100g)
    }

    pub fn add_composite(&self, name: &str, ingredients: &[Ingredient]) -> Result<CompositeFood> {
        engine::create_composite(&self.db, name, ingredients)
    }

    pub fn rename_and_update_basic(
        &self,
        old_name: &str,
        name: &str,
        calories_per_100g: f64,
        protein_per_100g: f64,
    ) -> Result<BasicFood> {
        self.db
            .update_basic(old_name, name, calories_per_100g, protein_per_100g)
    }

    pub fn rename_and_update_composite(
        &self,
        old_name: &str,
        name: &str,
        ingredients: &[Ingredient],
    ) -> Result<CompositeFood> {
        engine::update_composite(&self.db, old_name, name, ingredients)
    }

    /// Resolved facts for a name, or `None` when the catalog has no match.
    pub fn lookup(&self, name: &str) -> Result<Option<Nutrition>> {
        engine::resolve(&self.db, name)
    }

    pub fn get_food(&self, name: &str) -> Result<Option<Food>> {
        self.db.resolve_food(name)
    }

    pub fn list_names(&self) -> Result<Vec<String>> {
        self.db.list_food_names()
    }

    pub fn list_foods(&self) -> Result<Vec<Food>> {
        self.db.list_foods()
    }

    // --- Daily records ---

    pub fn upsert_weight(&self, date: NaiveDate, weight: f64) -> Result<()> {
        if !weight.is_finite() || weight <= 0.0 {
            anyhow::bail!("Weight must be greater than 0");
        }
        self.db.upsert_weight(date, weight)
    }

    /// Append a consumed food. The name is a weak reference — it need not
    /// exist in the catalog, matching the record model's by-name links.
    pub fn append_food(&self, date: NaiveDate, name: &str, quantity_g: f64) -> Result<()> {
        validate_quantity(quantity_g)?;
        self.db.append_food(date, name, quantity_g)
    }

    pub fn append_exercise(&self, date: NaiveDate, name: &str, calories: f64) -> Result<()> {
        if !calories.is_finite() || calories < 0.0 {
            anyhow::bail!("Calories must not be negative");
        }
        self.db.append_exercise(date, name, calories)
    }

    pub fn replace_record(
        &self,
        date: NaiveDate,
        weight: Option<f64>,
        food: &[FoodPortion],
        exercises: &[ExerciseEntry],
    ) -> Result<()> {
        if let Some(w) = weight {
            if !w.is_finite() || w <= 0.0 {
                anyhow::bail!("Weight must be greater than 0");
            }
        }
        for portion in food {
            validate_quantity(portion.quantity_g)?;
        }
        for exercise in exercises {
            if !exercise.calories.is_finite() || exercise.calories < 0.0 {
                anyhow::bail!("Calories must not be negative");
            }
        }
        self.db.replace_record(date, weight, food, exercises)
    }

    pub fn get(&self, date: NaiveDate) -> Result<DailyRecord> {
        self.db.get_day(date)
    }

    pub fn all_ordered_by_date(&self) -> Result<Vec<DailyRecord>> {
        self.db.all_days_ordered()
    }

    // --- Aggregation & trends ---

    pub fn aggregate_day(&self, date: NaiveDate) -> Result<DayTotals> {
        engine::aggregate_day(&self.db, date)
    }

    pub fn grams_for_calories(&self, name: &str, calories: f64) -> Result<f64> {
        if !calories.is_finite() || calories <= 0.0 {
            anyhow::bail!("Calories must be greater than 0");
        }
        engine::grams_for_calories(&self.db, name, calories)
    }

    /// Full history rows, oldest first, against the configured goal weight.
    pub fn build_history(&self) -> Result<Vec<HistoryRow>> {
        let goal = self.db.goal_weight()?;
        trend::build_history(&self.db, goal)
    }

    pub fn chart_data(&self) -> Result<ChartData> {
        trend::build_chart(&self.db)
    }

    // --- Settings ---

    pub fn settings(&self) -> Result<Settings> {
        self.db.load_settings()
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.db.save_settings(settings)
    }

    pub fn goal_weight(&self) -> Result<f64> {
        self.db.goal_weight()
    }

    pub fn set_goal_weight(&self, kg: f64) -> Result<()> {
        self.db.set_goal_weight(kg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ingredient(name: &str, quantity_g: f64) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            quantity_g,
        }
    }

    #[test]
    fn test_log_and_aggregate_round_trip() {
        let svc = TallyService::new_in_memory().unwrap();
        svc.add_basic("Rice", 130.0, 2.7).unwrap();

        let d = date("2024-06-15");
        svc.upsert_weight(d, 80.0).unwrap();
        svc.append_food(d, "Rice", 100.0).unwrap();
        svc.append_exercise(d, "Cycling", 300.0).unwrap();

        let totals = svc.aggregate_day(d).unwrap();
        assert!((totals.calories_in - 130.0).abs() < 0.01);
        assert!((totals.calories_out - 300.0).abs() < f64::EPSILON);
        assert!((totals.protein - 2.7).abs() < 0.01);

        let record = svc.get(d).unwrap();
        assert_eq!(record.weight, Some(80.0));
    }

    #[test]
    fn test_duplicate_add_surfaces_typed_error() {
        let svc = TallyService::new_in_memory().unwrap();
        svc.add_basic("Rice", 130.0, 2.7).unwrap();

        let err = svc.add_basic("Rice", 1.0, 1.0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::DuplicateName("Rice".to_string()))
        );
    }

    #[test]
    fn test_lookup_basic_then_composite() {
        let svc = TallyService::new_in_memory().unwrap();
        svc.add_basic("Rice", 130.0, 2.7).unwrap();
        svc.add_composite("Bowl", &[ingredient("Rice", 200.0)])
            .unwrap();

        let rice = svc.lookup("Rice").unwrap().unwrap();
        assert!((rice.calories_per_100g - 130.0).abs() < f64::EPSILON);

        let bowl = svc.lookup("Bowl").unwrap().unwrap();
        assert!((bowl.calories_per_100g - 130.0).abs() < f64::EPSILON);

        assert!(svc.lookup("Unicorn").unwrap().is_none());
    }

    #[test]
    fn test_rename_keeps_history_resolving_by_new_name_only() {
        let svc = TallyService::new_in_memory().unwrap();
        svc.add_basic("Chiken", 165.0, 31.0).unwrap();

        let d = date("2024-06-15");
        svc.append_food(d, "Chiken", 200.0).unwrap();
        svc.rename_and_update_basic("Chiken", "Chicken", 165.0, 31.0)
            .unwrap();

        // The old name in the record is now a dangling weak reference:
        // the day still aggregates, counting it as zero.
        let totals = svc.aggregate_day(d).unwrap();
        assert!((totals.calories_in).abs() < f64::EPSILON);
        assert_eq!(totals.unresolved, vec!["Chiken".to_string()]);
    }

    #[test]
    fn test_validation_happens_before_any_write() {
        let svc = TallyService::new_in_memory().unwrap();
        let d = date("2024-06-15");

        assert!(svc.upsert_weight(d, 0.0).is_err());
        assert!(svc.append_food(d, "Rice", -10.0).is_err());
        assert!(svc.append_exercise(d, "Cycling", -1.0).is_err());
        assert!(svc.grams_for_calories("Rice", 0.0).is_err());

        let record = svc.get(d).unwrap();
        assert_eq!(record.weight, None);
        assert!(record.food_consumed.is_empty());
        assert!(record.exercises.is_empty());
    }

    #[test]
    fn test_replace_record_via_service() {
        let svc = TallyService::new_in_memory().unwrap();
        let d = date("2024-06-15");
        svc.upsert_weight(d, 80.0).unwrap();

        svc.replace_record(
            d,
            Some(79.0),
            &[FoodPortion {
                name: "Rice".to_string(),
                quantity_g: 150.0,
            }],
            &[],
        )
        .unwrap();

        let record = svc.get(d).unwrap();
        assert_eq!(record.weight, Some(79.0));
        assert_eq!(record.food_consumed.len(), 1);
    }

    #[test]
    fn test_history_uses_configured_goal() {
        let svc = TallyService::new_in_memory().unwrap();
        let d = date("2024-06-15");
        svc.upsert_weight(d, 80.0).unwrap();

        let rows = svc.build_history().unwrap();
        assert!((rows[0].goal_delta.unwrap() - 5.0).abs() < 1e-9);

        svc.set_goal_weight(78.0).unwrap();
        let rows = svc.build_history().unwrap();
        assert!((rows[0].goal_delta.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_list_names_spans_catalog() {
        let svc = TallyService::new_in_memory().unwrap();
        svc.add_basic("Rice", 130.0, 2.7).unwrap();
        svc.add_composite("Bowl", &[ingredient("Rice", 100.0)])
            .unwrap();

        assert_eq!(svc.list_names().unwrap(), vec!["Bowl", "Rice"]);
        assert_eq!(svc.list_foods().unwrap().len(), 2);
    }

    #[test]
    fn test_settings_round_trip_through_service() {
        let svc = TallyService::new_in_memory().unwrap();
        let mut settings = svc.settings().unwrap();
        settings.calories_in.color = "Yellow".to_string();
        svc.save_settings(&settings).unwrap();
        assert_eq!(svc.settings().unwrap().calories_in.color, "Yellow");
    }

    #[test]
    fn test_chart_data_through_service() {
        let svc = TallyService::new_in_memory().unwrap();
        svc.add_basic("Rice", 130.0, 2.7).unwrap();
        let d = date("2024-06-15");
        svc.upsert_weight(d, 80.0).unwrap();
        svc.append_food(d, "Rice", 1000.0).unwrap();

        let chart = svc.chart_data().unwrap();
        assert_eq!(chart.dates.len(), 1);
        assert!((chart.normalization.factor - 80.0 / 1300.0).abs() < 1e-12);
    }
}
