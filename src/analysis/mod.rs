pub mod canvas;
pub mod derive;

mod components;
mod report;
mod use_chart_canvas;

pub use components::Analysis;

pub const REPORT_FALLBACK: &str = "Error downloading PDF. Please try again.";

/// Parameter value with two decimals and its unit, as shown on stat cards and
/// in the records table.
pub fn display_measure(value: f64, unit: &str) -> String {
    format!("{value:.2} {unit}")
}

pub fn display_record_count(count: usize) -> String {
    if count == 1 {
        "Showing 1 record".to_string()
    } else {
        format!("Showing {count} records")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_keep_two_decimals() {
        assert_eq!(display_measure(120.456, "m³/h"), "120.46 m³/h");
        assert_eq!(display_measure(5.0, "bar"), "5.00 bar");
    }

    #[test]
    fn record_count_is_pluralized() {
        assert_eq!(display_record_count(0), "Showing 0 records");
        assert_eq!(display_record_count(1), "Showing 1 record");
        assert_eq!(display_record_count(15), "Showing 15 records");
    }
}
