//! ASCII bar chart of breakdown spend
//!
//! Each group is drawn as one horizontal bar scaled to the largest group.
//! The part of a bar above the dimension's spend limit is drawn with a
//! separate glyph, in red when colors are enabled.

use colored::*;
use dcost_core::views::{BreakdownBar, DimensionBreakdown};
use std::fmt;

/// Glyph for spend within the limit
const BAR_WITHIN: &str = "#";
/// Glyph for spend above the limit
const BAR_OVER: &str = "!";

/// Bar width used when none is given
pub const DEFAULT_BAR_WIDTH: usize = 40;

/// Names longer than this are cut with "..."
const MAX_NAME_WIDTH: usize = 24;

/// Horizontal bar chart renderer
pub struct SpendChart {
    bar_width: usize,
    /// Whether to use colored output (respects NO_COLOR environment variable)
    colored_output: bool,
}

impl Default for SpendChart {
    fn default() -> Self {
        Self::new(DEFAULT_BAR_WIDTH)
    }
}

impl SpendChart {
    pub fn new(bar_width: usize) -> Self {
        Self {
            bar_width: bar_width.max(1),
            colored_output: std::env::var("NO_COLOR").is_err(),
        }
    }

    /// Disable colors regardless of the environment
    pub fn plain(mut self) -> Self {
        self.colored_output = false;
        self
    }

    /// Render one breakdown with its spend limit
    pub fn render(&self, breakdown: &DimensionBreakdown, limit: Option<f64>) -> String {
        let bars = breakdown.bars(limit);
        let mut output = String::new();

        let title = match limit {
            Some(max) => format!("{} (limit ${max:?})", breakdown.dimension.title()),
            None => breakdown.dimension.title().to_string(),
        };
        output.push_str(&title);
        output.push('\n');
        output.push_str(&"-".repeat(title.chars().count()));
        output.push('\n');

        if bars.is_empty() {
            output.push_str("(no data)\n");
            return output;
        }

        let scale = bars.iter().map(|b| b.cost).fold(0.0_f64, f64::max);
        let name_width = bars
            .iter()
            .map(|b| b.label.chars().count().min(MAX_NAME_WIDTH))
            .max()
            .unwrap_or(0);

        for bar in &bars {
            output.push_str(&self.draw_bar(bar, scale, name_width));
            output.push('\n');
        }
        output
    }

    fn draw_bar(&self, bar: &BreakdownBar, scale: f64, name_width: usize) -> String {
        let (within, over) = self.segment_widths(bar, scale);
        let within_part = BAR_WITHIN.repeat(within);
        let over_part = BAR_OVER.repeat(over);
        let over_part = if self.colored_output && over > 0 {
            over_part.red().to_string()
        } else {
            over_part
        };

        let mut line = format!(
            "{:<name_width$}  {}{}{}  {}",
            truncate_name(&bar.label),
            within_part,
            over_part,
            " ".repeat(self.bar_width - within - over),
            dcost_core::format::format_currency(bar.cost),
        );
        if bar.overflow > 0.0 {
            let note = format!(" (+{} over)", dcost_core::format::format_currency(bar.overflow));
            if self.colored_output {
                line.push_str(&note.red().to_string());
            } else {
                line.push_str(&note);
            }
        }
        line
    }

    /// Glyph counts for the within-limit and over-limit parts of a bar
    fn segment_widths(&self, bar: &BreakdownBar, scale: f64) -> (usize, usize) {
        if scale <= 0.0 || bar.cost <= 0.0 {
            return (0, 0);
        }
        let total = ((bar.cost / scale) * self.bar_width as f64).round() as usize;
        let total = total.clamp(1, self.bar_width);
        let over = ((bar.overflow / scale) * self.bar_width as f64).round() as usize;
        let over = if bar.overflow > 0.0 {
            over.clamp(1, total)
        } else {
            0
        };
        (total - over, over)
    }
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() <= MAX_NAME_WIDTH {
        return name.to_string();
    }
    let mut cut: String = name.chars().take(MAX_NAME_WIDTH - 3).collect();
    cut.push_str("...");
    cut
}

impl fmt::Display for SpendChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpendChart(bar_width: {})", self.bar_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcost_core::types::BreakdownDimension;
    use dcost_core::views::BreakdownEntry;

    fn projects() -> DimensionBreakdown {
        DimensionBreakdown {
            dimension: BreakdownDimension::Project,
            entries: vec![
                BreakdownEntry {
                    key: "p1".into(),
                    name: "Big".into(),
                    cost: 16.0,
                },
                BreakdownEntry {
                    key: "p2".into(),
                    name: "Small".into(),
                    cost: 4.0,
                },
            ],
        }
    }

    #[test]
    fn test_bars_scale_to_largest() {
        let chart = SpendChart::new(20).plain();
        let output = chart.render(&projects(), None);
        assert!(output.starts_with("Top Projects\n"));
        assert!(output.contains(&format!("Big    {}  $16.0", "#".repeat(20))));
        assert!(output.contains(&format!("Small  {}{}  $4.0", "#".repeat(5), " ".repeat(15))));
    }

    #[test]
    fn test_overflow_segment() {
        let chart = SpendChart::new(20).plain();
        let output = chart.render(&projects(), Some(8.0));
        assert!(output.contains("Top Projects (limit $8.0)"));
        assert!(output.contains(&format!("{}{}", "#".repeat(10), "!".repeat(10))));
        assert!(output.contains("(+$8.0 over)"));
        // the small project stays within the limit
        assert!(!output.lines().last().unwrap().contains('!'));
    }

    #[test]
    fn test_empty_breakdown() {
        let chart = SpendChart::default().plain();
        let output = chart.render(&DimensionBreakdown::new(BreakdownDimension::User), None);
        assert!(output.contains("(no data)"));
    }

    #[test]
    fn test_long_names_are_truncated() {
        let name = "a-really-long-project-name-that-keeps-going";
        let truncated = truncate_name(name);
        assert_eq!(truncated.chars().count(), MAX_NAME_WIDTH);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_name("short"), "short");
    }
}
