/// Property-based tests using proptest
/// Tests invariants and properties that should hold for all inputs
use proptest::prelude::*;
use ssas_onboarding::formatting::{
    display_stored_phone, format_currency, format_date, format_phone, is_valid_date,
    parse_currency,
};
use ssas_onboarding::models::TimeAtAddress;
use ssas_onboarding::validation::{landline_pattern, mobile_pattern};
use ssas_onboarding::visibility::{requires_previous_addresses, ADDRESS_HISTORY_MONTHS};

// Property: Formatters should never panic
proptest! {
    #[test]
    fn formatters_never_panic(input in "\\PC*") {
        let _ = format_date(&input);
        let _ = format_currency(input.as_str());
        let _ = format_phone(&input);
        let _ = display_stored_phone(&input);
        let _ = is_valid_date(&input);
    }

    #[test]
    fn currency_never_panics_on_numbers(amount in proptest::num::f64::ANY) {
        let formatted = format_currency(amount);
        prop_assert!(formatted.contains('£'));
    }
}

// Property: Phone display and storage patterns
proptest! {
    #[test]
    fn twelve_digits_are_regrouped(digits in "[0-9]{12}") {
        let formatted = format_phone(&digits);
        prop_assert_eq!(
            formatted,
            format!("+{} {} {}", &digits[..2], &digits[2..6], &digits[6..])
        );
    }

    #[test]
    fn other_lengths_pass_through_as_digits(digits in "[0-9]{0,11}|[0-9]{13,16}") {
        prop_assert_eq!(format_phone(&digits), digits);
    }

    #[test]
    fn separators_are_ignored(digits in "[0-9]{12}", sep in "[ ()-]") {
        let spaced = format!("{}{}{}", &digits[..4], sep, &digits[4..]);
        prop_assert_eq!(format_phone(&spaced), format_phone(&digits));
    }

    #[test]
    fn landline_pattern_accepts_exactly_fourteen_digits(digits in "[0-9]{1,20}") {
        prop_assert_eq!(landline_pattern().is_match(&digits), digits.len() == 14);
    }

    #[test]
    fn mobile_pattern_accepts_exactly_ten_digits(digits in "[0-9]{1,20}") {
        prop_assert_eq!(mobile_pattern().is_match(&digits), digits.len() == 10);
    }

    #[test]
    fn stored_phones_display_like_entered_ones(digits in "[0-9]{12}") {
        let stored = format!("00{}", digits);
        prop_assert_eq!(display_stored_phone(&stored), format_phone(&digits));
    }
}

// Property: Currency formatting is reversible to the penny
proptest! {
    #[test]
    fn currency_round_trips_within_a_penny(amount in -1e9f64..1e9f64) {
        let parsed = parse_currency(&format_currency(amount));
        prop_assert!((parsed - amount).abs() < 0.0051, "{} -> {}", amount, parsed);
    }
}

// Property: Dates normalized for display always validate
proptest! {
    #[test]
    fn normalized_iso_dates_are_valid(year in 1900i32..2100, month in 1u32..=12, day in 1u32..=28) {
        let iso = format!("{:04}-{:02}-{:02}", year, month, day);
        let display = format_date(&iso);
        prop_assert!(is_valid_date(&display), "{} -> {}", iso, display);
        prop_assert_eq!(display, format!("{:02}-{:02}-{:04}", day, month, year));
    }
}

// Property: Previous addresses are needed exactly below 36 months
proptest! {
    #[test]
    fn address_history_threshold(years in 0i64..10, months in 0i64..12) {
        let time = TimeAtAddress::new(years, months);
        prop_assert_eq!(
            requires_previous_addresses(&time),
            years * 12 + months < ADDRESS_HISTORY_MONTHS
        );
    }
}
