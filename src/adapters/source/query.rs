//! Query templating
//!
//! Extraction and validation queries are configured as text templates with
//! calendar placeholders; rendering binds them to one period.

use crate::domain::Period;

/// A query template with period placeholders
///
/// Supported placeholders: `{year}`, `{month}`, `{month02}` (zero-padded),
/// `{day_start}` (always 1) and `{day_end}` (last day of the month,
/// leap-aware).
#[derive(Debug, Clone)]
pub struct QueryTemplate {
    template: String,
}

impl QueryTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Render the template for one period
    pub fn render(&self, period: Period) -> String {
        let (day_start, day_end) = period.day_range();
        self.template
            .replace("{year}", &period.year.to_string())
            .replace("{month02}", &format!("{:02}", period.month))
            .replace("{month}", &period.month.to_string())
            .replace("{day_start}", &day_start.to_string())
            .replace("{day_end}", &day_end.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_binds_all_placeholders() {
        let template = QueryTemplate::new(
            "extract year={year} month={month} padded={month02} from {day_start} to {day_end}",
        );
        assert_eq!(
            template.render(Period::new(2025, 7)),
            "extract year=2025 month=7 padded=07 from 1 to 31"
        );
    }

    #[test]
    fn test_render_leap_february() {
        let template = QueryTemplate::new("{year}-{month02}: {day_end} days");
        assert_eq!(template.render(Period::new(2024, 2)), "2024-02: 29 days");
        assert_eq!(template.render(Period::new(2025, 2)), "2025-02: 28 days");
    }

    #[test]
    fn test_month02_resolves_before_month() {
        // {month02} contains "{month" as a prefix only textually; make sure
        // the padded form is not mangled by the bare replacement.
        let template = QueryTemplate::new("{month02}|{month}");
        assert_eq!(template.render(Period::new(2025, 3)), "03|3");
    }

    #[test]
    fn test_template_without_placeholders_is_untouched() {
        let template = QueryTemplate::new("static query");
        assert_eq!(template.render(Period::new(2025, 1)), "static query");
    }
}
