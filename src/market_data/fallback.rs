//! Deterministic fallback market data.
//!
//! When the live provider fails, [`MarketDataService`](super::MarketDataService)
//! substitutes this data so the valuation engine always receives a
//! well-formed snapshot. The figures are fixed; two calls with the same
//! inputs produce identical output.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use super::{AssetPrice, GlobalMarket, HistoryRange, PriceHistory, PricePoint, PriceSnapshot};

struct FallbackCoin {
    id: &'static str,
    symbol: &'static str,
    name: &'static str,
    image: &'static str,
    // (mantissa, scale) triples keep the table readable without parsing.
    current_price: (i64, u32),
    price_change_24h: (i64, u32),
    price_change_percentage_24h: (i64, u32),
}

const FALLBACK_COINS: &[FallbackCoin] = &[
    FallbackCoin {
        id: "bitcoin",
        symbol: "btc",
        name: "Bitcoin",
        image: "https://assets.coingecko.com/coins/images/1/large/bitcoin.png",
        current_price: (57000, 0),
        price_change_24h: (1400, 0),
        price_change_percentage_24h: (25, 1),
    },
    FallbackCoin {
        id: "ethereum",
        symbol: "eth",
        name: "Ethereum",
        image: "https://assets.coingecko.com/coins/images/279/large/ethereum.png",
        current_price: (3500, 0),
        price_change_24h: (110, 0),
        price_change_percentage_24h: (32, 1),
    },
    FallbackCoin {
        id: "binancecoin",
        symbol: "bnb",
        name: "BNB",
        image: "https://assets.coingecko.com/coins/images/825/large/bnb-icon2_2x.png",
        current_price: (550, 0),
        price_change_24h: (98, 1),
        price_change_percentage_24h: (18, 1),
    },
    FallbackCoin {
        id: "solana",
        symbol: "sol",
        name: "Solana",
        image: "https://assets.coingecko.com/coins/images/4128/large/solana.png",
        current_price: (120, 0),
        price_change_24h: (52, 1),
        price_change_percentage_24h: (45, 1),
    },
    FallbackCoin {
        id: "cardano",
        symbol: "ada",
        name: "Cardano",
        image: "https://assets.coingecko.com/coins/images/975/large/cardano.png",
        current_price: (55, 2),
        price_change_24h: (-7, 3),
        price_change_percentage_24h: (-12, 1),
    },
    FallbackCoin {
        id: "polkadot",
        symbol: "dot",
        name: "Polkadot",
        image: "https://assets.coingecko.com/coins/images/12171/large/polkadot.png",
        current_price: (78, 1),
        price_change_24h: (16, 2),
        price_change_percentage_24h: (21, 1),
    },
    FallbackCoin {
        id: "avalanche-2",
        symbol: "avax",
        name: "Avalanche",
        image: "https://assets.coingecko.com/coins/images/12559/large/Avalanche_Circle_RedWhite_Trans.png",
        current_price: (355, 1),
        price_change_24h: (13, 1),
        price_change_percentage_24h: (38, 1),
    },
    FallbackCoin {
        id: "chainlink",
        symbol: "link",
        name: "Chainlink",
        image: "https://assets.coingecko.com/coins/images/877/large/chainlink-new-logo.png",
        current_price: (142, 1),
        price_change_24h: (4, 1),
        price_change_percentage_24h: (29, 1),
    },
];

/// A fixed snapshot of eight major coins.
pub fn fallback_snapshot(fetched_at: DateTime<Utc>) -> PriceSnapshot {
    let prices = FALLBACK_COINS
        .iter()
        .map(|coin| AssetPrice {
            id: coin.id.to_string(),
            symbol: coin.symbol.to_string(),
            name: coin.name.to_string(),
            image: Some(coin.image.to_string()),
            current_price: Decimal::new(coin.current_price.0, coin.current_price.1),
            price_change_24h: Decimal::new(coin.price_change_24h.0, coin.price_change_24h.1),
            price_change_percentage_24h: Decimal::new(
                coin.price_change_percentage_24h.0,
                coin.price_change_percentage_24h.1,
            ),
        })
        .collect();

    PriceSnapshot::new(fetched_at, prices)
}

/// A fixed market-wide overview.
pub fn fallback_global() -> GlobalMarket {
    GlobalMarket {
        total_market_cap: Decimal::new(2_345_678_901_234, 0),
        total_volume: Decimal::new(123_456_789_012, 0),
        market_cap_change_percentage_24h: Decimal::new(25, 1),
        btc_dominance: Decimal::new(425, 1),
        eth_dominance: Decimal::new(183, 1),
    }
}

const FALLBACK_HISTORY_BASE: Decimal = Decimal::from_parts(50000, 0, 0, false, 0);

/// A synthetic but deterministic price series: hourly points over one day,
/// daily points otherwise, wobbling around a fixed base price.
pub fn fallback_history(asset_id: &str, range: HistoryRange, now: DateTime<Utc>) -> PriceHistory {
    let (count, step) = match range {
        HistoryRange::Day => (24u32, Duration::hours(1)),
        other => (other.days(), Duration::days(1)),
    };

    let mut points = Vec::with_capacity(count as usize + 1);
    for i in (0..=count).rev() {
        let timestamp = now - step * i as i32;
        // +/-2.5% around the base, cycling every 11 samples.
        let offset = Decimal::new(i64::from(i % 11) - 5, 0);
        let price = FALLBACK_HISTORY_BASE
            + FALLBACK_HISTORY_BASE * offset / Decimal::new(200, 0);
        points.push(PricePoint { timestamp, price });
    }

    PriceHistory {
        asset_id: asset_id.to_string(),
        range,
        points,
    }
}
