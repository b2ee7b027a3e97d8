use anyhow::Result;

use tally_core::service::TallyService;

use super::helpers::parse_date;

pub(crate) fn cmd_weight_log(
    service: &TallyService,
    value: f64,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    service.upsert_weight(date, value)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "date": date.format("%Y-%m-%d").to_string(), "weight": value })
        );
    } else {
        println!("Logged {:.1} kg for {}", value, date.format("%Y-%m-%d"));
        let goal = service.goal_weight()?;
        let delta = value - goal;
        println!("  {delta:+.1} kg against the {goal:.1} kg goal");
    }

    Ok(())
}

pub(crate) fn cmd_goal_show(service: &TallyService, json: bool) -> Result<()> {
    let goal = service.goal_weight()?;

    if json {
        println!("{}", serde_json::json!({ "goal_weight": goal }));
    } else {
        println!("Goal weight: {goal:.1} kg");
    }

    Ok(())
}

pub(crate) fn cmd_goal_set(service: &TallyService, kg: f64, json: bool) -> Result<()> {
    service.set_goal_weight(kg)?;

    if json {
        println!("{}", serde_json::json!({ "goal_weight": kg }));
    } else {
        println!("Goal weight set to {kg:.1} kg");
    }

    Ok(())
}
