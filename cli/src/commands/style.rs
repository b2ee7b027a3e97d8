use anyhow::{Result, bail};
use tabled::{Table, Tabled, settings::Style};

use tally_core::models::{SeriesStyle, font_point_size};
use tally_core::service::TallyService;

pub(crate) fn cmd_style_show(service: &TallyService, json: bool) -> Result<()> {
    let settings = service.settings()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    println!(
        "Font: {} {} ({}pt)",
        settings.font_family,
        settings.font_size,
        font_point_size(&settings.font_size)
    );

    #[derive(Tabled)]
    struct StyleRow {
        #[tabled(rename = "Series")]
        series: &'static str,
        #[tabled(rename = "Color")]
        color: String,
        #[tabled(rename = "Shape")]
        shape: String,
        #[tabled(rename = "Opacity")]
        opacity: String,
        #[tabled(rename = "Size")]
        size: String,
    }

    let row = |series: &'static str, style: &SeriesStyle| StyleRow {
        series,
        color: style.color.clone(),
        shape: style.shape.clone(),
        opacity: format!("{:.0}", style.opacity),
        size: format!("{:.0}", style.size),
    };

    let rows = vec![
        row("weight", &settings.weight),
        row("calories-in", &settings.calories_in),
        row("calories-out", &settings.calories_out),
    ];

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_style_set(
    service: &TallyService,
    series: &str,
    color: Option<String>,
    shape: Option<String>,
    opacity: Option<f64>,
    size: Option<f64>,
    json: bool,
) -> Result<()> {
    let mut settings = service.settings()?;

    let style = match series {
        "weight" => &mut settings.weight,
        "calories-in" => &mut settings.calories_in,
        "calories-out" => &mut settings.calories_out,
        _ => bail!("Unknown series '{series}'. Use weight, calories-in, or calories-out"),
    };

    if let Some(color) = color {
        style.color = color;
    }
    if let Some(shape) = shape {
        style.shape = shape;
    }
    if let Some(opacity) = opacity {
        style.opacity = opacity;
    }
    if let Some(size) = size {
        style.size = size;
    }

    service.save_settings(&settings)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    } else {
        println!("Updated {series} style");
    }

    Ok(())
}

pub(crate) fn cmd_style_font(
    service: &TallyService,
    family: &str,
    size: &str,
    json: bool,
) -> Result<()> {
    let mut settings = service.settings()?;
    settings.font_family = family.to_string();
    settings.font_size = size.to_string();
    service.save_settings(&settings)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    } else {
        println!("Font set to {family} {size} ({}pt)", font_point_size(size));
    }

    Ok(())
}
