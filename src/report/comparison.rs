use console::Style;

use crate::models::{FailureRecord, FailureSet};

/// Colours for the comparison report.
///
/// Colour is still dropped when stdout is not a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn new(monochrome: bool) -> Self {
        Self { color: !monochrome }
    }

    pub fn monochrome() -> Self {
        Self::new(true)
    }

    fn paint(self, text: &str, style: &Style) -> String {
        if self.color {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn failed(self, text: &str) -> String {
        self.paint(text, &Style::new().red())
    }

    fn passed(self, text: &str) -> String {
        self.paint(text, &Style::new().green())
    }

    fn delimiter(self) -> String {
        self.paint("===", &Style::new().yellow())
    }
}

/// Failures unique to each side of a comparison, sorted by (class, test).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureComparison {
    pub left_total: usize,
    pub right_total: usize,
    pub only_left: Vec<FailureRecord>,
    pub only_right: Vec<FailureRecord>,
}

impl FailureComparison {
    pub fn new(left: &FailureSet, right: &FailureSet) -> Self {
        Self {
            left_total: left.len(),
            right_total: right.len(),
            only_left: left.difference(right).cloned().collect(),
            only_right: right.difference(left).cloned().collect(),
        }
    }

    pub fn render(&self, palette: Palette) -> String {
        let mut lines = vec![
            format!("Failed in the left branch: {}", self.left_total),
            format!("Failed in the right branch: {}", self.right_total),
            String::new(),
        ];

        lines.push(section_header(palette, "Left", "right", self.only_left.len()));
        lines.extend(self.only_left.iter().map(ToString::to_string));
        lines.push(String::new());

        lines.push(section_header(palette, "Right", "left", self.only_right.len()));
        lines.extend(self.only_right.iter().map(ToString::to_string));

        lines.join("\n")
    }
}

fn section_header(palette: Palette, failing_side: &str, passing_side: &str, total: usize) -> String {
    let delimiter = palette.delimiter();
    format!(
        "{delimiter} {failing_side} {}, {passing_side} {}. Total: {total} {delimiter}",
        palette.failed("failed"),
        palette.passed("passed"),
    )
}
