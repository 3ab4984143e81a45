//! Configuration handed to the cross-chain payment widget.
//!
//! The widget bridges the user's funds to the target chain and then executes
//! [`PaymentConfig::calls`] in order as one payment: approve the referral
//! contract, then `depositFor(wallet, referrer)`.

use alloy_primitives::{Bytes, U256};
use asty_chain::abi;
use asty_types::{amount::unit, scale_to_units, Address, ChainId, TypesError};
use serde::{Deserialize, Serialize};

use crate::AppConfig;

/// One encoded contract call for the widget to execute on the target chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCall {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformFee {
    pub amount: U256,
    pub recipient: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfig {
    pub to_chain: ChainId,
    pub to_token: Address,
    /// Membership fee in smallest deposit-token units.
    pub to_units: U256,
    pub to_address: Address,
    pub token_symbol: String,
    pub token_decimals: u8,
    /// Approve first, deposit second. Order is significant.
    pub calls: Vec<ContractCall>,
    /// Receives the bridged funds if the calls revert.
    pub fallback_recipient: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_fee: Option<PlatformFee>,
}

/// The fee charged for membership, in smallest token units.
///
/// Testnet charges one hundredth of a token (at least one unit). Fails when
/// the fee does not fit in 256 bits at the configured decimals.
pub fn membership_fee(config: &AppConfig) -> Result<U256, TypesError> {
    let decimals = config.deposit_token_decimals;
    if config.testnet {
        Ok((unit(decimals)? / U256::from(100u64)).max(U256::from(1u64)))
    } else {
        scale_to_units(config.membership_fee, decimals)
    }
}

/// Assemble the widget configuration.
///
/// `None` when the wallet, the deposit token, or the referral contract is
/// unknown, or when the membership fee cannot be represented. An absent
/// platform fee is simply omitted.
pub fn build_payment_config(
    config: &AppConfig,
    wallet: Option<Address>,
    effective_referral: Address,
) -> Option<PaymentConfig> {
    let wallet = wallet?;
    let token = config.deposit_token?;
    let contract = config.referral_contract?;
    let amount = match membership_fee(config) {
        Ok(amount) => amount,
        Err(error) => {
            tracing::warn!(%error, "membership fee not representable; payment unavailable");
            return None;
        }
    };

    let calls = vec![
        ContractCall {
            to: token,
            data: abi::encode_approve(contract, amount),
            value: U256::ZERO,
        },
        ContractCall {
            to: contract,
            data: abi::encode_deposit_for(wallet, effective_referral),
            value: U256::ZERO,
        },
    ];

    let platform_fee = config.platform_fee.as_ref().map(|fee| PlatformFee {
        amount: U256::from(fee.amount),
        recipient: fee.recipient,
    });

    Some(PaymentConfig {
        to_chain: config.target_chain_id,
        to_token: token,
        to_units: amount,
        to_address: contract,
        token_symbol: config.deposit_token_symbol.clone(),
        token_decimals: config.deposit_token_decimals,
        calls,
        fallback_recipient: wallet,
        platform_fee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlatformFeeConfig;
    use asty_types::NEUTRAL_ADDRESS;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn config() -> AppConfig {
        AppConfig {
            deposit_token: Some(addr(0x70)),
            referral_contract: Some(addr(0xc0)),
            ..Default::default()
        }
    }

    #[test]
    fn none_without_required_addresses() {
        assert!(build_payment_config(&config(), None, NEUTRAL_ADDRESS).is_none());

        let mut missing_token = config();
        missing_token.deposit_token = None;
        assert!(build_payment_config(&missing_token, Some(addr(1)), NEUTRAL_ADDRESS).is_none());

        let mut missing_contract = config();
        missing_contract.referral_contract = None;
        assert!(build_payment_config(&missing_contract, Some(addr(1)), NEUTRAL_ADDRESS).is_none());
    }

    #[test]
    fn approve_precedes_deposit() {
        let payment = build_payment_config(&config(), Some(addr(1)), addr(2)).unwrap();
        assert_eq!(payment.calls.len(), 2);
        assert_eq!(payment.calls[0].to, addr(0x70));
        assert_eq!(payment.calls[0].data, abi::encode_approve(addr(0xc0), payment.to_units));
        assert_eq!(payment.calls[1].to, addr(0xc0));
        assert_eq!(payment.calls[1].data, abi::encode_deposit_for(addr(1), addr(2)));
    }

    #[test]
    fn neutral_referral_is_encoded() {
        let payment = build_payment_config(&config(), Some(addr(1)), NEUTRAL_ADDRESS).unwrap();
        assert_eq!(payment.calls[1].data, abi::encode_deposit_for(addr(1), NEUTRAL_ADDRESS));
    }

    #[test]
    fn targets_contract_and_falls_back_to_wallet() {
        let payment = build_payment_config(&config(), Some(addr(1)), NEUTRAL_ADDRESS).unwrap();
        assert_eq!(payment.to_chain, 8453);
        assert_eq!(payment.to_token, addr(0x70));
        assert_eq!(payment.to_address, addr(0xc0));
        assert_eq!(payment.fallback_recipient, addr(1));
        assert!(payment.platform_fee.is_none());
    }

    #[test]
    fn fee_scales_with_decimals() {
        assert_eq!(membership_fee(&config()), Ok(U256::from(30_000_000u64)));

        let mut eighteen = config();
        eighteen.deposit_token_decimals = 18;
        assert_eq!(
            membership_fee(&eighteen),
            Ok(U256::from(30u64) * U256::from(10u64).pow(U256::from(18u8)))
        );
    }

    #[test]
    fn unrepresentable_fee_means_no_payment() {
        let mut huge = config();
        huge.deposit_token_decimals = 80;
        assert_eq!(membership_fee(&huge), Err(TypesError::DecimalsOutOfRange(80)));
        assert_eq!(build_payment_config(&huge, Some(addr(1)), NEUTRAL_ADDRESS), None);

        huge.deposit_token_decimals = 77;
        assert!(membership_fee(&huge).is_err());
        huge.testnet = true;
        assert!(membership_fee(&huge).is_ok());
    }

    #[test]
    fn testnet_uses_reduced_amount() {
        let mut testnet = config();
        testnet.testnet = true;
        assert_eq!(membership_fee(&testnet), Ok(U256::from(10_000u64)));

        testnet.deposit_token_decimals = 0;
        assert_eq!(membership_fee(&testnet), Ok(U256::from(1u64)));
    }

    #[test]
    fn platform_fee_is_attached() {
        let mut with_fee = config();
        with_fee.platform_fee = Some(PlatformFeeConfig {
            amount: 250_000,
            recipient: addr(0xfe),
        });
        let payment = build_payment_config(&with_fee, Some(addr(1)), NEUTRAL_ADDRESS).unwrap();
        assert_eq!(
            payment.platform_fee,
            Some(PlatformFee {
                amount: U256::from(250_000u64),
                recipient: addr(0xfe)
            })
        );
    }

    #[test]
    fn serializes_camel_case() {
        let payment = build_payment_config(&config(), Some(addr(1)), NEUTRAL_ADDRESS).unwrap();
        let json = serde_json::to_value(&payment).unwrap();
        assert!(json.get("toChain").is_some());
        assert!(json.get("fallbackRecipient").is_some());
        assert!(json.get("platformFee").is_none());
        assert_eq!(json["calls"].as_array().unwrap().len(), 2);
    }
}
