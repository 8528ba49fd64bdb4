//! Cross-venue spread detection

use alloy::primitives::Address;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::time::Instant;
use tracing::debug;
use crate::types::{Opportunity, PriceQuote, PriceSnapshot};

/// Picks the cheapest and the dearest valid quote in `snapshot` and builds an opportunity
/// when the spread between them is strictly above `min_spread_pct`.
///
/// Ties keep the venue that appears first in configuration order. Fewer than two valid
/// quotes, or both extremes on the same venue, yield nothing.
pub fn find_opportunity(snapshot: &PriceSnapshot, min_spread_pct: Decimal) -> Option<Opportunity> {
    let mut lowest: Option<(&PriceQuote, Decimal)> = None;
    let mut highest: Option<(&PriceQuote, Decimal)> = None;

    for quote in snapshot.valid_quotes() {
        let Some(rate) = quote.rate else { continue };
        if lowest.is_none_or(|(_, low)| rate < low) {
            lowest = Some((quote, rate));
        }
        if highest.is_none_or(|(_, high)| rate > high) {
            highest = Some((quote, rate));
        }
    }

    let (buy, buy_rate) = lowest?;
    let (sell, sell_rate) = highest?;
    if buy.venue == sell.venue {
        return None;
    }

    let spread_pct = spread_pct(buy_rate, sell_rate)?;
    if spread_pct <= min_spread_pct {
        debug!(
            token = %snapshot.token,
            spread = %spread_pct.round_dp(4),
            "Spread below minimum"
        );
        return None;
    }

    Some(build(snapshot.token, buy, buy_rate, sell, sell_rate, spread_pct))
}

pub fn spread_pct(buy_rate: Decimal, sell_rate: Decimal) -> Option<Decimal> {
    (sell_rate - buy_rate)
        .checked_div(buy_rate)
        .map(|ratio| ratio * dec!(100))
}

fn build(
    token: Address,
    buy: &PriceQuote,
    buy_rate: Decimal,
    sell: &PriceQuote,
    sell_rate: Decimal,
    spread_pct: Decimal,
) -> Opportunity {
    Opportunity {
        id: uuid::Uuid::new_v4().to_string(),
        token,
        buy_venue: buy.venue.clone(),
        sell_venue: sell.venue.clone(),
        buy_rate,
        sell_rate,
        spread_pct,
        timestamp: Utc::now(),
        detected_at: Instant::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(rates: &[(&str, Option<Decimal>)]) -> PriceSnapshot {
        let token = Address::repeat_byte(0x11);
        PriceSnapshot {
            token,
            quotes: rates
                .iter()
                .map(|(venue, rate)| match rate {
                    Some(r) => PriceQuote::available(venue, token, *r),
                    None => PriceQuote::absent(venue, token),
                })
                .collect(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn picks_lowest_buy_and_highest_sell() {
        let snap = snapshot(&[
            ("a", Some(dec!(100))),
            ("b", Some(dec!(100.5))),
            ("c", Some(dec!(102))),
        ]);
        let opp = find_opportunity(&snap, dec!(0.01)).unwrap();
        assert_eq!(opp.buy_venue, "a");
        assert_eq!(opp.sell_venue, "c");
        assert_eq!(opp.spread_pct, dec!(2));
        assert_eq!(opp.route(), "a → c");
    }

    #[test]
    fn spread_must_strictly_exceed_minimum() {
        let snap = snapshot(&[("a", Some(dec!(100))), ("b", Some(dec!(101)))]);
        assert!(find_opportunity(&snap, dec!(1)).is_none());
        assert!(find_opportunity(&snap, dec!(0.99)).is_some());
    }

    #[test]
    fn needs_two_valid_quotes() {
        let snap = snapshot(&[("a", Some(dec!(100))), ("b", None), ("c", Some(dec!(0)))]);
        assert!(find_opportunity(&snap, Decimal::ZERO).is_none());
    }

    #[test]
    fn equal_rates_do_not_produce_an_opportunity() {
        let snap = snapshot(&[("a", Some(dec!(5))), ("b", Some(dec!(5)))]);
        assert!(find_opportunity(&snap, Decimal::ZERO).is_none());
    }

    #[test]
    fn ties_keep_configuration_order() {
        let snap = snapshot(&[
            ("a", Some(dec!(100))),
            ("b", Some(dec!(100))),
            ("c", Some(dec!(103))),
            ("d", Some(dec!(103))),
        ]);
        let opp = find_opportunity(&snap, Decimal::ZERO).unwrap();
        assert_eq!(opp.buy_venue, "a");
        assert_eq!(opp.sell_venue, "c");
    }
}
