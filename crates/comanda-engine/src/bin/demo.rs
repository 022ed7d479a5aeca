//! # Comanda Demo
//!
//! Runs one service round against the fixture backend:
//! table 5 seats two, orders two burgers and a coke, pays cash and leaves.
//!
//! ```text
//! open(5, 2) ──► cart ──► submit ──► kitchen ──► bill ──► pay ──► close
//! ```
//!
//! Config comes from `comanda.toml` / `COMANDA_*` like any embedding
//! binary; `RUST_LOG` controls verbosity.

use tracing::{info, warn};

use comanda_core::{Cart, Money, PaymentMethod};
use comanda_engine::{init_tracing, DataSource, DataSourceMode, EngineConfig, TableService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = EngineConfig::load_or_default(None);
    if config.mode() == DataSourceMode::Live {
        warn!("The demo has no live collaborators; running against the fixture backend");
    }

    let service = TableService::start(&config, DataSource::fixture()).await?;

    let catalog = service.catalog().await;
    for product in catalog.visible() {
        info!(id = product.id, name = %product.name, price = %product.price(), "Menu");
    }

    service.open_table(5, 2).await?;

    let mut cart = Cart::new(5);
    service.add_to_cart(&mut cart, 1, 2).await?;
    service.add_to_cart(&mut cart, 2, 1).await?;
    info!(subtotal = %service.cart_subtotal(&cart).await?, "Cart ready");

    let order = service.submit_order(&cart).await?;
    cart.clear();

    service.start_preparation(order.id()).await?;
    service.mark_ready(order.id()).await?;
    service.mark_delivered(order.id()).await?;

    let bill = service.compute_bill(5).await?;
    info!(
        subtotal = %bill.subtotal,
        service = %bill.service_charge,
        total = %bill.total,
        "Bill"
    );

    let payment = service
        .resolve_payment(5, PaymentMethod::Cash, Some(Money::from_cents(7000)))
        .await?;
    info!(change = %payment.change, "Paid in cash");

    let closed = service.close_table(5).await?;
    println!("{}", serde_json::to_string_pretty(&closed)?);

    Ok(())
}
