use rust_decimal::Decimal;

use super::{MarketError, MarketResult};

/// Prices are stored as `NUMERIC(12, 2)`.
const MAX_SCALE: u32 = 2;

/// Integer digits left by `NUMERIC(12, 2)`.
const MAX_INTEGER_DIGITS: u32 = 10;

/// Reject any price the storage column would round or overflow.
///
/// Trailing zeros do not count towards the scale, so `100.500` is accepted
/// as `100.5`.
pub fn validate_price(price: Decimal) -> MarketResult<Decimal> {
    let price = price.normalize();
    let ceiling = Decimal::from(10u64.pow(MAX_INTEGER_DIGITS));
    if price <= Decimal::ZERO || price >= ceiling || price.scale() > MAX_SCALE {
        return Err(MarketError::InvalidPrice);
    }
    Ok(price)
}
