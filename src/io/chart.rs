use std::io::{self, Write};

use crate::domain::{CategoryTotal, format_cents};

/// Something that can draw category totals as a bar chart.
///
/// Charting is optional: callers hold an `Option<&dyn ChartRenderer>` and
/// every other feature works without one.
pub trait ChartRenderer {
    fn render(&self, totals: &[CategoryTotal], out: &mut dyn Write) -> io::Result<()>;
}

/// The renderer compiled into this build, if any.
#[cfg(feature = "chart")]
pub fn default_renderer() -> Option<Box<dyn ChartRenderer>> {
    Some(Box::new(TextBarChart::default()))
}

#[cfg(not(feature = "chart"))]
pub fn default_renderer() -> Option<Box<dyn ChartRenderer>> {
    None
}

/// Horizontal bar chart drawn with block characters.
#[cfg(feature = "chart")]
#[derive(Debug, Clone)]
pub struct TextBarChart {
    /// Width of the longest bar, in characters
    pub width: usize,
}

#[cfg(feature = "chart")]
impl Default for TextBarChart {
    fn default() -> Self {
        Self { width: 40 }
    }
}

#[cfg(feature = "chart")]
impl ChartRenderer for TextBarChart {
    fn render(&self, totals: &[CategoryTotal], out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Expenses by Category")?;
        writeln!(out)?;

        let max = totals.iter().map(|t| t.total).max().unwrap_or(0);
        let label_width = totals
            .iter()
            .map(|t| t.category.chars().count())
            .max()
            .unwrap_or(0);

        for total in totals {
            let len = if max > 0 {
                (total.total.max(0) as f64 / max as f64 * self.width as f64).round() as usize
            } else {
                0
            };
            writeln!(
                out,
                "{:<label_width$} | {:<bar_width$} ${}",
                total.category,
                "█".repeat(len),
                format_cents(total.total),
                label_width = label_width,
                bar_width = self.width,
            )?;
        }

        Ok(())
    }
}

#[cfg(all(test, feature = "chart"))]
mod tests {
    use super::*;

    fn total(category: &str, cents: i64) -> CategoryTotal {
        CategoryTotal {
            category: category.into(),
            total: cents,
            count: 1,
            percentage: 0.0,
        }
    }

    #[test]
    fn test_bars_scale_to_largest_total() {
        let chart = TextBarChart { width: 10 };
        let mut out = Vec::new();
        chart
            .render(&[total("Bills", 4000), total("Food", 2000)], &mut out)
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Expenses by Category");
        assert_eq!(lines[2].matches('█').count(), 10);
        assert_eq!(lines[3].matches('█').count(), 5);
        assert!(lines[3].ends_with("$20.00"));
    }

    #[test]
    fn test_empty_totals_render_header_only() {
        let mut out = Vec::new();
        TextBarChart::default().render(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
    }
}
