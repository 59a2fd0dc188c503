//! End-to-end sale flow tests: cart assembly, finalize, returns, and the
//! notifications that fan out after commit.

use till_core::{CoreError, PosEvent, ValidationError};
use till_db::{Database, DbConfig, NewCustomer, NewProduct, NewSupplier, ReturnLine};
use till_engine::{EngineError, EventBus, SaleSession};
use till_core::{Money, Percent};

async fn setup() -> (Database, EventBus, SaleSession) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let supplier = db
        .suppliers()
        .create(NewSupplier::new("Metro Wholesale"))
        .await
        .unwrap();

    db.products()
        .create(
            NewProduct::new("Cola 330ml", "Beverages", Money::from_cents(150))
                .quantity(10)
                .min_stock(3)
                .supplier(&supplier.id),
        )
        .await
        .unwrap();
    db.products()
        .create(
            NewProduct::new("Potato Chips 150g", "Snacks", Money::from_cents(250))
                .quantity(20)
                .min_stock(5)
                .discount(Percent::from_bps(1000)), // 10% off -> 225
        )
        .await
        .unwrap();

    db.customers()
        .create(NewCustomer::new("Ayesha Khan"))
        .await
        .unwrap();

    let bus = EventBus::new();
    let session = SaleSession::new(db.clone(), bus.clone());
    (db, bus, session)
}

fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<PosEvent>) -> Vec<PosEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn full_sale_flow_with_events() {
    let (db, bus, mut session) = setup().await;
    let mut rx = bus.subscribe();

    let totals = session.add_line("Cola 330ml", "4").await.unwrap();
    assert_eq!(totals.subtotal_cents, 600);

    // per-product discount frozen into the line
    let totals = session.add_line("Potato Chips 150g", "2").await.unwrap();
    assert_eq!(totals.subtotal_cents, 600 + 450);

    let totals = session.set_cart_discount("10").unwrap();
    assert_eq!(totals.total_cents, 945); // 1050 - 10%

    let committed = session.finalize("Ayesha Khan", "cash").await.unwrap();
    assert_eq!(committed.sale.total_cents, 945);
    assert_eq!(committed.items.len(), 2);
    assert_eq!(committed.points_earned, 0);

    // cart is ready for the next sale; a second finalize cannot double-commit
    assert!(session.cart().is_empty());
    assert_eq!(session.cart_totals().total_cents, 0);
    assert!(matches!(
        session.finalize("Ayesha Khan", "cash").await,
        Err(EngineError::Domain(CoreError::EmptyCart))
    ));
    assert_eq!(db.sales().count().await.unwrap(), 1);

    // stock moved
    let cola = db.products().get_by_name("Cola 330ml").await.unwrap();
    assert_eq!(cola.quantity, 6);

    // events arrived after the commit
    let events = drain_events(&mut rx);
    let types: Vec<&str> = events.iter().map(|e| e.event_type()).collect();
    assert!(types.contains(&"new_sale"));
    assert!(types.contains(&"inventory_updated"));

    // nothing pending once drained
    assert_eq!(db.outbox().count_pending().await.unwrap(), 0);
}

#[tokio::test]
async fn totals_reconcile_with_receipt() {
    let (_db, _bus, mut session) = setup().await;

    session.add_line("Cola 330ml", "3").await.unwrap();
    session.set_cart_discount("12.5").unwrap();
    let expected = session.cart_totals().total_cents;

    let committed = session.finalize("Ayesha Khan", "credit card").await.unwrap();
    assert_eq!(committed.sale.total_cents, expected);

    let receipt = session.receipt(&committed.sale.id).await.unwrap();
    assert_eq!(receipt.total_cents, expected);
    assert_eq!(receipt.customer_name, "Ayesha Khan");
    assert_eq!(receipt.lines.len(), 1);
    assert_eq!(receipt.lines[0].name, "Cola 330ml");
    assert_eq!(receipt.lines[0].quantity, 3);
}

#[tokio::test]
async fn invalid_input_leaves_cart_untouched() {
    let (_db, _bus, mut session) = setup().await;

    session.add_line("Cola 330ml", "1").await.unwrap();

    assert!(matches!(
        session.add_line("Cola 330ml", "six").await,
        Err(EngineError::Validation(ValidationError::NotAPositiveInteger { .. }))
    ));
    assert!(matches!(
        session.add_line("Cola 330ml", "").await,
        Err(EngineError::Validation(ValidationError::Required { .. }))
    ));
    assert!(matches!(
        session.add_line("No Such Thing", "1").await,
        Err(EngineError::Domain(CoreError::ProductNotFound(_)))
    ));
    assert!(matches!(
        session.set_cart_discount("150"),
        Err(EngineError::Validation(ValidationError::OutOfRange { .. }))
    ));

    let totals = session.cart_totals();
    assert_eq!(totals.line_count, 1);
    assert_eq!(totals.discount_bps, 0);
}

#[tokio::test]
async fn advisory_stock_check_reports_available() {
    let (_db, _bus, mut session) = setup().await;

    let err = session.add_line("Cola 330ml", "11").await.unwrap_err();
    match err {
        EngineError::Domain(CoreError::InsufficientStock {
            available,
            requested,
            ..
        }) => {
            assert_eq!(available, 10);
            assert_eq!(requested, 11);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(session.cart().is_empty());
}

#[tokio::test]
async fn empty_cart_cannot_finalize() {
    let (db, _bus, mut session) = setup().await;

    let err = session.finalize("Ayesha Khan", "cash").await.unwrap_err();
    assert!(matches!(err, EngineError::Domain(CoreError::EmptyCart)));
    assert_eq!(db.sales().count().await.unwrap(), 0);
}

#[tokio::test]
async fn unknown_customer_preserves_cart() {
    let (db, _bus, mut session) = setup().await;

    session.add_line("Cola 330ml", "2").await.unwrap();
    let err = session.finalize("Nobody", "cash").await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Domain(CoreError::CustomerNotFound(_))
    ));

    // cart intact, nothing written
    assert_eq!(session.cart_totals().line_count, 1);
    assert_eq!(db.sales().count().await.unwrap(), 0);
}

#[tokio::test]
async fn failed_commit_preserves_cart_for_retry() {
    let (db, _bus, mut session) = setup().await;

    session.add_line("Cola 330ml", "8").await.unwrap();

    // another station drains the stock between add and finalize
    let cola = db.products().get_by_name("Cola 330ml").await.unwrap();
    db.products().adjust_stock(&cola.id, -7).await.unwrap();

    let err = session.finalize("Ayesha Khan", "cash").await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Domain(CoreError::InsufficientStock { available: 3, .. })
    ));

    // the operator can fix the cart and retry in the same session
    assert_eq!(session.cart_totals().line_count, 1);
    session.clear_cart();
    session.add_line("Cola 330ml", "3").await.unwrap();
    let committed = session.finalize("Ayesha Khan", "cash").await.unwrap();
    assert_eq!(committed.sale.total_cents, 450);
}

#[tokio::test]
async fn loyalty_points_floor_at_ten_dollars() {
    let (db, _bus, mut session) = setup().await;

    db.products()
        .create(NewProduct::new("Basmati Rice 5kg", "Grocery", Money::from_cents(2375)).quantity(5))
        .await
        .unwrap();

    // $47.50 -> 4 points
    session.add_line("Basmati Rice 5kg", "2").await.unwrap();
    let committed = session.finalize("Ayesha Khan", "cash").await.unwrap();
    assert_eq!(committed.points_earned, 4);

    // $9.99 cart -> 0 points
    db.products()
        .create(NewProduct::new("Snack Bar", "Snacks", Money::from_cents(999)).quantity(5))
        .await
        .unwrap();
    session.add_line("Snack Bar", "1").await.unwrap();
    let committed = session.finalize("Ayesha Khan", "online").await.unwrap();
    assert_eq!(committed.points_earned, 0);

    let customer = db.customers().get_by_name("Ayesha Khan").await.unwrap();
    assert_eq!(customer.loyalty_points, 4);
}

#[tokio::test]
async fn low_stock_alert_fires_after_commit() {
    let (_db, bus, mut session) = setup().await;
    let mut rx = bus.subscribe();

    // cola: 10 on hand, min 3; selling 8 leaves 2 -> below threshold
    session.add_line("Cola 330ml", "8").await.unwrap();
    session.finalize("Ayesha Khan", "cash").await.unwrap();

    let events = drain_events(&mut rx);
    let alert = events
        .iter()
        .find(|e| e.event_type() == "low_stock_alert")
        .expect("expected a low-stock alert");
    match alert {
        PosEvent::LowStockAlert { products } => {
            assert_eq!(products.len(), 1);
            assert_eq!(products[0].name, "Cola 330ml");
            assert_eq!(products[0].quantity, 2);
            assert_eq!(products[0].min_stock, 3);
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn return_flow_restocks_and_notifies() {
    let (db, bus, mut session) = setup().await;

    session.add_line("Cola 330ml", "4").await.unwrap();
    let committed = session.finalize("Ayesha Khan", "cash").await.unwrap();

    let mut rx = bus.subscribe();
    let cola = db.products().get_by_name("Cola 330ml").await.unwrap();

    let outcome = session
        .process_return(
            &committed.sale.id,
            &[ReturnLine {
                sale_item_id: committed.items[0].id.clone(),
                quantity: 2,
            }],
        )
        .await
        .unwrap();

    assert_eq!(outcome.refund.cents(), 300);
    assert_eq!(outcome.new_total.cents(), 300);
    assert_eq!(db.products().get_by_id(&cola.id).await.unwrap().quantity, 8);

    let events = drain_events(&mut rx);
    assert!(events.iter().any(|e| e.event_type() == "inventory_updated"));
}

#[tokio::test]
async fn return_against_unknown_sale() {
    let (_db, _bus, session) = setup().await;

    let err = session
        .process_return(
            "no-such-sale",
            &[ReturnLine {
                sale_item_id: "i".to_string(),
                quantity: 1,
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Domain(CoreError::SaleNotFound(_))));
}

#[tokio::test]
async fn over_return_is_rejected_whole() {
    let (db, _bus, mut session) = setup().await;

    session.add_line("Cola 330ml", "2").await.unwrap();
    let committed = session.finalize("Ayesha Khan", "cash").await.unwrap();

    let err = session
        .process_return(
            &committed.sale.id,
            &[ReturnLine {
                sale_item_id: committed.items[0].id.clone(),
                quantity: 3,
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Domain(CoreError::ReturnExceedsSold { sold: 2, requested: 3, .. })
    ));

    // no restock happened
    let cola = db.products().get_by_name("Cola 330ml").await.unwrap();
    assert_eq!(cola.quantity, 8);
}
