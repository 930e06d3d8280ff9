//! Example: private account data and a validate-only order
//!
//! Run with: cargo run --example private_account
//!
//! NOTE: Requires KRAKEN_API_KEY and KRAKEN_PRIVATE_KEY. Set KRAKEN_OTP to
//! the key's static password if it has one. Set KRAKEN_PROXY (for example
//! `socks5h://127.0.0.1:9050`) to route requests through a proxy.

use std::env;

use krakgov::types::ReportKind;
use krakgov::{ClientConfig, HistoryRange, KrakenClient, OrderRequest, OrderSide, SecondFactor};
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("--- Private Endpoints Skipped ---");
            println!("{e}");
            println!();
            println!("Example:");
            println!("  export KRAKEN_API_KEY='your-api-key'");
            println!("  export KRAKEN_PRIVATE_KEY='your-base64-private-key'");
            return Ok(());
        }
    };
    if let Ok(password) = env::var("KRAKEN_OTP") {
        config = config.with_second_factor(SecondFactor::static_password(password));
    }
    if let Ok(proxy) = env::var("KRAKEN_PROXY") {
        config = config.with_proxy(proxy);
    }

    let client = KrakenClient::with_config(config)?;

    println!("--- Balances ---");
    let balances = client.get_balance().await?;
    for (asset, amount) in balances.non_zero() {
        println!("  {asset}: {amount}");
    }
    println!();

    println!("--- Open Orders ---");
    let orders = client.get_open_orders().await?;
    if orders.is_empty() {
        println!("  No open orders");
    }
    for (txid, order) in orders.iter().take(5) {
        println!("  {txid} - {}", order.descr.order);
    }
    println!();

    println!("--- Recent Ledger Entries ---");
    let page = client
        .account()
        .ledgers(&[], None, None, HistoryRange::new())
        .await?;
    println!("  {} entries in total", page.count);
    for (id, entry) in page.ledger.iter().take(5) {
        println!("  {id}: {} {} {}", entry.entry_type, entry.amount, entry.asset);
    }
    println!();

    println!("--- Ledger Reports ---");
    for report in client.exports().report_status(ReportKind::Ledgers).await? {
        println!("  {} {}", report.id, report.status);
    }
    println!();

    println!("--- Order Example (validate only) ---");
    let order = OrderRequest::limit("XBTUSD", OrderSide::Buy, dec!(0.001), dec!(30000)).validate_only();
    match client.add_order(&order).await {
        Ok(result) => println!("  Validation passed: {}", result.descr.order),
        Err(e) if e.is_exchange_error() => println!("  Rejected by Kraken: {e}"),
        Err(e) => return Err(e.into()),
    }

    println!(
        "\nSent {} request(s); counter at {:.2}",
        client.request_count(),
        client.consumed()
    );
    Ok(())
}
