//! Example: public market data through the rate governor
//!
//! Fetches the server time, a ticker, an order book and the latest candles,
//! then prints how much of the call-rate budget was used.
//!
//! Run with: cargo run --example public_market
//!
//! Set RUST_LOG=krakgov=debug to see each attempt and its cost.

use krakgov::{Interval, KrakenClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Kraken Public Market Data ===\n");

    let client = KrakenClient::new()?;
    let market = client.market();

    let status = market.system_status().await?;
    let time = market.server_time().await?;
    println!("System: {} at {}\n", status.status, time.rfc1123);

    println!("Fetching BTC/USD ticker...");
    match client.get_ticker("XBTUSD").await {
        Ok(tickers) => {
            for (pair, ticker) in &tickers {
                println!("  {pair}");
                if let Some(last) = ticker.last_price() {
                    println!("  Last Price: ${last}");
                }
                if let Some(mid) = ticker.mid_price() {
                    println!("  Mid Price:  ${mid}");
                }
            }
        }
        Err(e) => println!("  Error: {e}"),
    }
    println!();

    println!("Fetching BTC/USD order book (depth=5)...");
    let book = client.get_order_book("XBTUSD", Some(5)).await?;
    for (i, level) in book.bids.iter().enumerate() {
        println!("  bid {}. ${} x {}", i + 1, level.price, level.volume);
    }
    for (i, level) in book.asks.iter().enumerate() {
        println!("  ask {}. ${} x {}", i + 1, level.price, level.volume);
    }
    if let Some(spread) = book.spread() {
        println!("  Spread: ${spread}");
    }
    println!();

    println!("Fetching hourly candles...");
    let candles = market.ohlc("XBTUSD", Interval::Hour1, None).await?;
    for candle in candles.rows.iter().rev().take(3) {
        println!(
            "  {}  O {}  H {}  L {}  C {}",
            candle.datetime().map(|t| t.to_rfc3339()).unwrap_or_default(),
            candle.open,
            candle.high,
            candle.low,
            candle.close
        );
    }
    println!("  Next cursor: {}", candles.last);

    println!(
        "\nSent {} request(s); counter at {:.2} of {}",
        client.request_count(),
        client.consumed(),
        client.dispatcher().governor().ceiling()
    );
    Ok(())
}
