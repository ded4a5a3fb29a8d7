/// Shared helpers: address parsing and amount formatting
use crate::errors::ConfigError;
use alloy_primitives::{Address, U256};
use std::str::FromStr;

/// Parse a configured address, naming the field on failure
pub fn parse_address(field: &str, value: &str) -> Result<Address, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidField {
            field: field.to_string(),
            reason: "address is required".to_string(),
        });
    }

    Address::from_str(trimmed).map_err(|e| ConfigError::InvalidField {
        field: field.to_string(),
        reason: format!("'{}' is not an address: {}", trimmed, e),
    })
}

/// Render a raw on-chain amount as a decimal string with `decimals` places.
///
/// Trailing fractional zeros are dropped, so 1_500_000 with 6 decimals is "1.5".
pub fn format_token_amount(amount: U256, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }

    let base = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / base;
    let fraction = amount % base;

    if fraction.is_zero() {
        return whole.to_string();
    }

    let digits = fraction.to_string();
    let padded = format!("{:0>width$}", digits, width = decimals as usize);
    format!("{}.{}", whole, padded.trim_end_matches('0'))
}

/// Shorten an address for table output: 0x1234…abcd
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    if full.len() <= 12 {
        return full;
    }
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}
