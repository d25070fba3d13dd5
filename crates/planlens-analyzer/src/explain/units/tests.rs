//! Tests for the unit and number extraction helpers

use super::*;

mod memory_tests {
    use super::*;

    #[test]
    fn test_megabytes_pass_through() {
        assert_eq!(parse_memory_mb("48MB"), Some(48.0));
        assert_eq!(parse_memory_mb("48 mb"), Some(48.0));
    }

    #[test]
    fn test_gigabytes_scaled_up() {
        assert_eq!(parse_memory_mb("2GB"), Some(2048.0));
        assert_eq!(parse_memory_mb("1.5 G"), Some(1536.0));
    }

    #[test]
    fn test_kilobytes_scaled_down() {
        assert_eq!(parse_memory_mb("512KB"), Some(0.5));
        assert_eq!(parse_memory_mb("1024kB"), Some(1.0));
    }

    #[test]
    fn test_unitless_is_megabytes() {
        assert_eq!(parse_memory_mb("300"), Some(300.0));
    }

    #[test]
    fn test_no_number_is_absent() {
        assert_eq!(parse_memory_mb("unknown"), None);
        assert_eq!(parse_memory_mb(""), None);
    }

    #[test]
    fn test_unit_parse() {
        assert_eq!(MemoryUnit::parse("kb"), Some(MemoryUnit::Kilobytes));
        assert_eq!(MemoryUnit::parse("M"), Some(MemoryUnit::Megabytes));
        assert_eq!(MemoryUnit::parse("GB"), Some(MemoryUnit::Gigabytes));
        assert_eq!(MemoryUnit::parse("TB"), None);
    }
}

mod number_tests {
    use super::*;

    static ROWS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)rows=([0-9.]+)").expect("valid regex"));
    static ACTUAL_TIME: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)actual time=([0-9.]+)").expect("valid regex"));

    #[test]
    fn test_capture_first_match() {
        assert_eq!(capture_number("(rows=10 width=4) rows=20", &ROWS), Some(10.0));
    }

    #[test]
    fn test_capture_missing_label() {
        assert_eq!(capture_number("(width=4)", &ROWS), None);
    }

    #[test]
    fn test_capture_range_reads_upper_bound() {
        assert_eq!(
            capture_number("(actual time=0.05..12.5 rows=3)", &ACTUAL_TIME),
            Some(12.5)
        );
        assert_eq!(capture_number("(actual time=750)", &ACTUAL_TIME), Some(750.0));
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(parse_leading_number("12.5ms"), Some(12.5));
        assert_eq!(parse_leading_number("  42 "), Some(42.0));
        assert_eq!(parse_leading_number("abc"), None);
    }

    #[test]
    fn test_count_truncates() {
        assert_eq!(parse_count("10000"), Some(10000));
        assert_eq!(parse_count("12.9"), Some(12));
        assert_eq!(parse_count("-3"), None);
        assert_eq!(parse_count("n/a"), None);
    }

    #[test]
    fn test_time_cell_range_takes_max() {
        assert_eq!(parse_time_cell("[0.12,8.40]"), Some(8.4));
        assert_eq!(parse_time_cell("3.5"), Some(3.5));
        assert_eq!(parse_time_cell("[]"), None);
    }
}
