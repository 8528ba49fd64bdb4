//! Mathematical utility functions

use alloy::primitives::U256;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

const MAX_SIGNIFICANT_DIGITS: usize = 28;

pub fn pow10(n: i32) -> Decimal {
    match n {
        0 => dec!(1),
        6 => dec!(1_000_000),
        9 => dec!(1_000_000_000),
        18 => dec!(1_000_000_000_000_000_000),
        _ => {
            let mut result = dec!(1);
            if n > 0 {
                for _ in 0..n {
                    result *= dec!(10);
                }
            } else {
                for _ in 0..(-n) {
                    result /= dec!(10);
                }
            }
            result
        }
    }
}

/// Scales a raw on-chain integer by `decimals`. Fractional digits beyond what a
/// `Decimal` can hold are dropped from the right; `None` if the integer part overflows.
pub fn u256_to_decimal(value: U256, decimals: u32) -> Option<Decimal> {
    let digits = value.to_string();
    let decimals = decimals as usize;
    let (int_part, frac_part) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = decimals))
    };
    if int_part.len() > MAX_SIGNIFICANT_DIGITS {
        return None;
    }
    let keep = MAX_SIGNIFICANT_DIGITS.saturating_sub(int_part.len()).min(frac_part.len());
    let text = if keep == 0 {
        int_part
    } else {
        format!("{}.{}", int_part, &frac_part[..keep])
    };
    Decimal::from_str(&text).ok().map(|d| d.normalize())
}

/// Converts a token amount to its raw on-chain integer, truncating below `decimals`.
pub fn decimal_to_u256(value: Decimal, decimals: u32) -> Option<U256> {
    if value.is_sign_negative() {
        return None;
    }
    let raw = value.checked_mul(pow10(decimals as i32))?.trunc();
    U256::from_str(&raw.normalize().to_string()).ok()
}

pub fn wei_to_gwei(wei: u128) -> Decimal {
    Decimal::from(wei) / pow10(9)
}

pub fn gwei_to_wei(gwei: u64) -> u128 {
    gwei as u128 * 1_000_000_000
}

/// Cost of `gas_limit` units at `gas_price_wei`, in native units.
pub fn gas_cost_native(gas_price_wei: u128, gas_limit: u64) -> Decimal {
    Decimal::from(gas_price_wei) * Decimal::from(gas_limit) / pow10(18)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_raw_reserves() {
        let raw = U256::from(1_500_000_000_000_000_000u128);
        assert_eq!(u256_to_decimal(raw, 18), Some(dec!(1.5)));
        assert_eq!(u256_to_decimal(U256::from(1234u64), 6), Some(dec!(0.001234)));
        assert_eq!(u256_to_decimal(U256::ZERO, 18), Some(Decimal::ZERO));
    }

    #[test]
    fn keeps_native_precision_for_large_reserves() {
        // 12,345,678.123456789012345678 with 18 decimals
        let raw = U256::from_str("12345678123456789012345678").unwrap();
        assert_eq!(
            u256_to_decimal(raw, 18),
            Some(Decimal::from_str("12345678.123456789012345678").unwrap())
        );
    }

    #[test]
    fn overflowing_integer_part_is_rejected() {
        assert_eq!(u256_to_decimal(U256::MAX, 0), None);
    }

    #[test]
    fn decimal_to_raw_amount() {
        assert_eq!(decimal_to_u256(dec!(1), 18), Some(U256::from(10u128.pow(18))));
        assert_eq!(decimal_to_u256(dec!(2.5), 6), Some(U256::from(2_500_000u64)));
        assert_eq!(decimal_to_u256(dec!(-1), 6), None);
    }

    #[test]
    fn gas_cost_in_native_units() {
        // 50 gwei * 500k gas = 0.025 ETH
        assert_eq!(gas_cost_native(gwei_to_wei(50), 500_000), dec!(0.025));
        assert_eq!(wei_to_gwei(gwei_to_wei(7)), dec!(7));
    }
}
