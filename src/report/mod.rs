mod comparison;
mod history;

pub use comparison::{FailureComparison, Palette};
pub use history::{format_duration, format_timestamp, render_history};
