pub mod week;

pub use week::{
    add_weeks, current_week, days_in_month, parse_week_key, resolve_week, step_week, Direction,
    Week,
};
