use proptest::prelude::*;

use asty_types::{addresses_match, format_token_amount, is_address_format, parse_address, scale_to_units, U256};

proptest! {
    /// Any 40 hex digits behind `0x` is a well-formed address.
    #[test]
    fn hex_body_is_address_format(body in "[0-9a-fA-F]{40}") {
        let candidate = format!("0x{body}");
        prop_assert!(is_address_format(&candidate));
        let parsed = parse_address(&candidate).unwrap();
        prop_assert!(addresses_match(&parsed.to_string(), &candidate));
    }

    /// Bodies of any other length are rejected.
    #[test]
    fn wrong_length_is_not_address_format(body in "[0-9a-f]{0,80}") {
        prop_assume!(body.len() != 40);
        let candidate = format!("0x{body}");
        prop_assert!(!is_address_format(&candidate));
    }

    /// Whole-token amounts format back to the same integer.
    #[test]
    fn whole_amounts_format_as_integers(whole in 0u64..1_000_000_000, decimals in 0u8..=18) {
        let units = scale_to_units(whole, decimals).unwrap();
        prop_assert_eq!(format_token_amount(units, decimals), whole.to_string());
    }

    /// Formatting never emits a trailing fractional zero or a dangling point.
    #[test]
    fn formatted_fraction_is_trimmed(raw in 0u64..u64::MAX, decimals in 1u8..=18) {
        let text = format_token_amount(U256::from(raw), decimals);
        if let Some((_, frac)) = text.split_once('.') {
            prop_assert!(!frac.is_empty());
            prop_assert!(!frac.ends_with('0'));
            prop_assert!(frac.len() <= decimals as usize);
        }
    }
}
