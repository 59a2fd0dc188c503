//! Seeds a development database with demo catalog data.
//!
//! Usage: `cargo run -p till-db --bin seed [path]` (default: `till.db`).

use till_core::{Money, Percent};
use till_db::{Database, DbConfig, NewCustomer, NewProduct, NewSupplier};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "till.db".to_string());
    info!(path = %path, "seeding database");

    let db = Database::new(DbConfig::new(&path)).await?;

    if db.products().count().await? > 0 {
        info!("database already has products, nothing to do");
        return Ok(());
    }

    let metro = db
        .suppliers()
        .create(NewSupplier::new("Metro Wholesale").contact("021-111-636-222"))
        .await?;
    let alfalah = db
        .suppliers()
        .create(NewSupplier::new("Al-Falah Distributors").email("orders@alfalah.example"))
        .await?;

    let catalog: [(&str, &str, i64, i64, u32, i64, &str); 8] = [
        // name, category, price cents, stock, discount bps, min stock, supplier
        ("Cola 330ml", "Beverages", 150, 48, 0, 12, "metro"),
        ("Mineral Water 1.5L", "Beverages", 80, 60, 0, 24, "metro"),
        ("Green Tea 100g", "Beverages", 550, 15, 500, 5, "alfalah"),
        ("Potato Chips 150g", "Snacks", 250, 30, 0, 10, "metro"),
        ("Chocolate Biscuits", "Snacks", 180, 4, 1000, 8, "alfalah"),
        ("Basmati Rice 5kg", "Grocery", 2375, 12, 0, 4, "alfalah"),
        ("Cooking Oil 1L", "Grocery", 950, 20, 0, 6, "alfalah"),
        ("Dish Soap 500ml", "Household", 320, 18, 0, 6, "metro"),
    ];

    for (name, category, price, stock, discount, min_stock, supplier) in catalog {
        let supplier_id = if supplier == "metro" { &metro.id } else { &alfalah.id };
        db.products()
            .create(
                NewProduct::new(name, category, Money::from_cents(price))
                    .quantity(stock)
                    .discount(Percent::from_bps(discount))
                    .min_stock(min_stock)
                    .supplier(supplier_id),
            )
            .await?;
    }

    for (name, phone) in [
        ("Ayesha Khan", Some("0300-1234567")),
        ("Bilal Ahmed", Some("0321-7654321")),
        ("Walk-in", None),
    ] {
        let mut new = NewCustomer::new(name);
        if let Some(phone) = phone {
            new = new.phone(phone);
        }
        db.customers().create(new).await?;
    }

    info!(
        products = db.products().count().await?,
        customers = db.customers().count().await?,
        "seed complete"
    );
    Ok(())
}
