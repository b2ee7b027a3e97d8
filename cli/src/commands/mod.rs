mod day;
mod food;
mod helpers;
mod history;
mod log;
mod style;
mod weight;

pub(crate) use day::{cmd_day_edit, cmd_day_show};
pub(crate) use food::{cmd_food_add, cmd_food_compose, cmd_food_edit, cmd_food_list, cmd_food_show};
pub(crate) use history::{cmd_chart, cmd_history};
pub(crate) use log::{cmd_burn, cmd_calc, cmd_eat};
pub(crate) use style::{cmd_style_font, cmd_style_set, cmd_style_show};
pub(crate) use weight::{cmd_goal_set, cmd_goal_show, cmd_weight_log};
