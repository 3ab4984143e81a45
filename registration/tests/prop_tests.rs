use proptest::prelude::*;

use asty_registration::{
    build_payment_config, validate_referral, AppConfig, ReferralError, RegistrationResolver, ResolverState,
};
use asty_types::{is_address_format, parse_address, Address, NEUTRAL_ADDRESS};

fn any_address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from)
}

/// An address rendered with a random per-character case.
fn mixed_case(address: Address, mask: u64) -> String {
    let lower = address.to_string().to_ascii_lowercase();
    let body: String = lower
        .trim_start_matches("0x")
        .chars()
        .enumerate()
        .map(|(i, c)| if (mask >> (i % 64)) & 1 == 1 { c.to_ascii_uppercase() } else { c })
        .collect();
    format!("0x{body}")
}

#[derive(Debug, Clone)]
enum ResolverOp {
    Begin(Address),
    CompleteLatest(Option<bool>),
    Reset,
}

fn resolver_op() -> impl Strategy<Value = ResolverOp> {
    prop_oneof![
        any_address().prop_map(ResolverOp::Begin),
        prop::option::of(any::<bool>()).prop_map(ResolverOp::CompleteLatest),
        Just(ResolverOp::Reset),
    ]
}

proptest! {
    /// Anything that is not `0x` + 40 hex digits is a format error, unless it
    /// is blank.
    #[test]
    fn malformed_candidates_are_format_errors(candidate in ".{0,60}", owner in prop::option::of(any_address())) {
        prop_assume!(!is_address_format(&candidate));
        let error = validate_referral(&candidate, owner.as_ref());
        if candidate.trim().is_empty() {
            prop_assert_eq!(error, None);
        } else {
            prop_assert_eq!(error, Some(ReferralError::InvalidFormat));
        }
    }

    /// A wallet can never refer itself, whatever the letter case.
    #[test]
    fn own_address_is_self_referral(own in any_address(), mask in any::<u64>()) {
        let candidate = mixed_case(own, mask);
        prop_assert_eq!(validate_referral(&candidate, Some(&own)), Some(ReferralError::SelfReferral));
    }

    /// The effective referral is neutral unless the resolver says registered.
    #[test]
    fn effective_referral_neutral_unless_registered(
        ops in prop::collection::vec(resolver_op(), 1..20),
        input_from_candidate in any::<bool>(),
        other in any_address(),
    ) {
        let mut resolver = RegistrationResolver::new();
        let mut latest = None;
        for op in ops {
            match op {
                ResolverOp::Begin(address) => latest = Some(resolver.begin(address)),
                ResolverOp::CompleteLatest(registered) => {
                    if let Some(ticket) = latest {
                        let input = ticket.address.to_string();
                        resolver.complete(ticket, registered, &input);
                    }
                }
                ResolverOp::Reset => resolver.reset(),
            }
        }

        let input = match (input_from_candidate, resolver.candidate()) {
            (true, Some(candidate)) => candidate.to_string(),
            _ => other.to_string(),
        };
        let effective = resolver.effective_referral(&input);
        if resolver.state() != ResolverState::Registered {
            prop_assert_eq!(effective, NEUTRAL_ADDRESS);
        } else {
            prop_assert!(effective == NEUTRAL_ADDRESS || Some(effective) == resolver.candidate());
        }
    }

    /// The payment configuration exists exactly when wallet, token and
    /// contract are all known.
    #[test]
    fn payment_config_requires_wallet_token_and_contract(
        wallet in prop::option::of(any_address()),
        token in prop::option::of(any_address()),
        contract in prop::option::of(any_address()),
        referral in any_address(),
        testnet in any::<bool>(),
    ) {
        let config = AppConfig {
            deposit_token: token,
            referral_contract: contract,
            testnet,
            ..Default::default()
        };
        let payment = build_payment_config(&config, wallet, referral);
        let all_present = wallet.is_some() && token.is_some() && contract.is_some();
        prop_assert_eq!(payment.is_some(), all_present);
    }

    /// Mixed-case renderings parse back to the same address.
    #[test]
    fn mixed_case_parses_to_same_address(address in any_address(), mask in any::<u64>()) {
        prop_assert_eq!(parse_address(&mixed_case(address, mask)).unwrap(), address);
    }
}
