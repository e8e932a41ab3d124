//! Demo data seeder for Sauda.
//!
//! Boots one demo tenant, runs a full purchase and sales cycle through
//! the engine, prints the reports, and round-trips the books through the
//! configured snapshot store.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sauda_core::books::{DraftLine, HistoricalDocument, HistoricalLine, InMemoryPartyDirectory, TenantBooks};
use sauda_core::ledger::{AccountKind, PartyKind};
use sauda_core::reports::ReportService;
use sauda_core::snapshot::{SnapshotProvider, SnapshotStore};
use sauda_core::stock::Zone;
use sauda_core::trade::{DocumentKind, ProductSnapshot, QuantityLine};
use sauda_shared::AppConfig;
use sauda_shared::types::{AccountId, PartyId, ProductId, TenantId};

const ACTOR: &str = "seeder";

struct Catalogue {
    chair: ProductSnapshot,
    desk: ProductSnapshot,
    lamp: ProductSnapshot,
}

struct Seed {
    books: TenantBooks,
    directory: InMemoryPartyDirectory,
    catalogue: Catalogue,
    cash: AccountId,
    bank: AccountId,
    customer: PartyId,
    supplier: PartyId,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sauda=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    println!("Seeding demo tenant: {}", config.company.name);

    let today = Utc::now().date_naive();
    let mut seed = seed_tenant(today)?;

    println!("Running purchase cycle...");
    run_purchase_cycle(&mut seed, today)?;

    println!("Running sales cycle...");
    run_sales_cycle(&mut seed, today)?;

    println!("Recording counter activity...");
    run_counter_activity(&mut seed, today)?;

    println!("Importing historical document...");
    import_history(&mut seed, today)?;

    assert!(seed.books.verify_balances(), "ledger caches out of sync");

    print_reports(&seed, today);

    println!("Saving snapshot...");
    let provider = SnapshotProvider::from_settings(&config.snapshot)?;
    run_snapshot_round_trip(&seed.books, &provider).await?;

    println!("Seeding complete!");
    Ok(())
}

fn product(name: &str, sku: &str, brand: Option<&str>) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::new(),
        name: name.to_string(),
        sku: sku.to_string(),
        brand: brand.map(str::to_string),
        image: None,
    }
}

fn qty(product: &ProductSnapshot, qty: i64) -> QuantityLine {
    QuantityLine {
        product_id: product.id,
        qty,
    }
}

fn seed_tenant(today: NaiveDate) -> anyhow::Result<Seed> {
    let mut books = TenantBooks::new(TenantId::new());
    let cash = books.open_account("Cash Drawer", AccountKind::Cash, dec!(25000));
    let bank = books.open_account("HDFC Current", AccountKind::Bank, dec!(150000));

    let mut directory = InMemoryPartyDirectory::new();
    let customer = directory.register("Acme Retail", PartyKind::Customer, Decimal::ZERO);
    let supplier = directory.register("Orbit Wholesale", PartyKind::Supplier, Decimal::ZERO);

    let catalogue = Catalogue {
        chair: product("Office Chair", "CHR-001", Some("Orbit")),
        desk: product("Standing Desk", "DSK-010", Some("Orbit")),
        lamp: product("Desk Lamp", "LMP-204", None),
    };

    // Opening stock straight into the godown.
    books.receive_stock(
        catalogue.lamp.id,
        Zone::Godown,
        40,
        "Opening stock",
        None,
        ACTOR,
    )?;
    info!(date = %today, "Tenant seeded");

    Ok(Seed {
        books,
        directory,
        catalogue,
        cash,
        bank,
        customer,
        supplier,
    })
}

fn day_offset(today: NaiveDate, days_ago: u64) -> NaiveDate {
    today.checked_sub_days(Days::new(days_ago)).unwrap_or(today)
}

fn run_purchase_cycle(seed: &mut Seed, today: NaiveDate) -> anyhow::Result<()> {
    let issue = day_offset(today, 20);
    let id = seed.books.draft_document(
        DocumentKind::Purchase,
        seed.supplier,
        Zone::Godown,
        vec![
            DraftLine {
                product: seed.catalogue.chair.clone(),
                qty: 30,
                unit_price: dec!(1800),
                discount_pct: dec!(5),
                tax_pct: dec!(18),
            },
            DraftLine {
                product: seed.catalogue.desk.clone(),
                qty: 10,
                unit_price: dec!(9500),
                discount_pct: Decimal::ZERO,
                tax_pct: dec!(18),
            },
        ],
        issue,
        Some(day_offset(today, 12)),
        &seed.directory,
    )?;
    seed.books.confirm(id)?;

    let grn = seed.books.record_fulfillment(
        id,
        &[qty(&seed.catalogue.chair, 30), qty(&seed.catalogue.desk, 10)],
        Zone::Godown,
        day_offset(today, 14),
        ACTOR,
    )?;
    println!("  Goods received under {grn}");

    let bill = seed.books.settle(
        id,
        &[qty(&seed.catalogue.chair, 30), qty(&seed.catalogue.desk, 10)],
        day_offset(today, 13),
    )?;
    let outstanding = seed.books.document(id)?.outstanding();
    println!("  Billed {bill} for {outstanding}");

    seed.books.pay_vendor(
        id,
        outstanding,
        seed.bank,
        "NEFT-99812",
        day_offset(today, 10),
    )?;
    println!("  Vendor paid in full");
    Ok(())
}

fn run_sales_cycle(seed: &mut Seed, today: NaiveDate) -> anyhow::Result<()> {
    // The customer pays a deposit before the order is even drafted.
    let (_, advance_leg) = seed.books.record_advance(
        seed.customer,
        dec!(10000),
        seed.bank,
        "UPI-55120",
        day_offset(today, 9),
        &seed.directory,
    )?;

    let id = seed.books.draft_document(
        DocumentKind::Sales,
        seed.customer,
        Zone::Godown,
        vec![
            DraftLine {
                product: seed.catalogue.chair.clone(),
                qty: 12,
                unit_price: dec!(2600),
                discount_pct: dec!(10),
                tax_pct: dec!(18),
            },
            DraftLine {
                product: seed.catalogue.lamp.clone(),
                qty: 6,
                unit_price: dec!(750),
                discount_pct: Decimal::ZERO,
                tax_pct: dec!(18),
            },
        ],
        day_offset(today, 8),
        Some(day_offset(today, 2)),
        &seed.directory,
    )?;
    seed.books.mark_quotation_sent(id)?;
    seed.books.confirm(id)?;
    println!("  Confirmed order {}", seed.books.document(id)?.number);

    // Hold the chairs for this order until dispatch day.
    seed.books.reserve_stock(
        id,
        &[qty(&seed.catalogue.chair, 12)],
        Zone::Godown,
        ACTOR,
    )?;
    let dn = seed.books.record_fulfillment(
        id,
        &[qty(&seed.catalogue.chair, 12)],
        Zone::Booked,
        day_offset(today, 5),
        ACTOR,
    )?;
    seed.books.record_fulfillment(
        id,
        &[qty(&seed.catalogue.lamp, 6)],
        Zone::Godown,
        day_offset(today, 5),
        ACTOR,
    )?;
    println!("  Delivered under {dn}");

    let invoice = seed.books.settle(
        id,
        &[qty(&seed.catalogue.chair, 12), qty(&seed.catalogue.lamp, 6)],
        day_offset(today, 4),
    )?;
    println!("  Invoiced {invoice}");

    seed.books.reconcile_advance(id, advance_leg, dec!(10000))?;
    let outstanding = seed.books.document(id)?.outstanding();
    seed.books.collect_payment(
        id,
        outstanding,
        seed.cash,
        "CASH",
        day_offset(today, 3),
    )?;
    println!("  Collected balance of {outstanding}");
    Ok(())
}

fn run_counter_activity(seed: &mut Seed, today: NaiveDate) -> anyhow::Result<()> {
    seed.books
        .record_cash_sale(seed.cash, dec!(1450), "Walk-in", day_offset(today, 6))?;
    seed.books.record_expense(
        "Salaries",
        dec!(18000),
        seed.bank,
        "April payroll",
        day_offset(today, 7),
    )?;
    seed.books.record_expense(
        "Rent",
        dec!(12000),
        seed.bank,
        "Shop rent",
        day_offset(today, 7),
    )?;
    seed.books.transfer_funds(
        seed.cash,
        seed.bank,
        dec!(5000),
        day_offset(today, 2),
        "End-of-week deposit",
    )?;
    Ok(())
}

fn import_history(seed: &mut Seed, today: NaiveDate) -> anyhow::Result<()> {
    let id = seed.books.import_historical(
        HistoricalDocument {
            kind: DocumentKind::Purchase,
            number: "LEGACY-PO-118".to_string(),
            issue_date: day_offset(today, 400),
            party_id: seed.supplier,
            lines: vec![HistoricalLine {
                product: seed.catalogue.desk.clone(),
                ordered: 4,
                fulfilled: 4,
                settled: 4,
                unit_price: dec!(8200),
                discount_pct: Decimal::ZERO,
                tax_pct: dec!(18),
            }],
            amount_paid: dec!(38704),
        },
        &seed.directory,
        ACTOR,
    )?;
    println!("  Imported {}", seed.books.document(id)?.number);
    Ok(())
}

fn print_reports(seed: &Seed, today: NaiveDate) {
    let from = day_offset(today, 30);

    println!("\n=== Ageing ===");
    let ageing = ReportService::ageing(seed.books.ledger());
    for row in &ageing.receivables {
        println!("  receivable {}: due {}", row.party_id, row.due);
    }
    for row in &ageing.payables {
        println!("  payable {}: due {}", row.party_id, row.due);
    }

    println!("\n=== Cash flow ({from}..{today}) ===");
    let cash_flow = ReportService::cash_flow(seed.books.ledger(), from, today);
    for bucket in cash_flow.inflows.iter().chain(&cash_flow.outflows) {
        println!("  {:?}: {}", bucket.category, bucket.total);
    }
    println!("  net: {}", cash_flow.net);

    println!("\n=== Day book (last 7 days) ===");
    let day_book = ReportService::day_book(seed.books.ledger(), day_offset(today, 7), today);
    for row in &day_book.rows {
        println!(
            "  {}: opening {} receipts {} payments {} closing {}",
            row.date, row.opening, row.receipts, row.payments, row.closing
        );
    }

    println!("\n=== Profit and loss ===");
    let pnl = ReportService::profit_and_loss(seed.books.ledger(), from, today);
    println!("  gross sales:  {}", pnl.gross_sales);
    println!("  cost of goods: {}", pnl.cost_of_goods);
    println!("  expenses:     {}", pnl.operating_expenses);
    println!("  net income:   {}", pnl.net_income);

    println!("\n=== Brand sales ===");
    for row in ReportService::brand_sales(seed.books.documents()) {
        println!("  {}: {} units, revenue {}", row.brand, row.units, row.revenue);
    }

    println!("\n=== Slow movers ===");
    for age in seed.books.stock().stock_ageing(Utc::now()) {
        println!(
            "  product {}: {} on hand, idle {} days",
            age.product_id, age.total, age.idle_days
        );
    }
}

async fn run_snapshot_round_trip(
    books: &TenantBooks,
    provider: &SnapshotProvider,
) -> anyhow::Result<()> {
    let store = SnapshotStore::new(provider)?;
    store.save(books).await?;
    let restored = store
        .load(books.tenant_id())
        .await?
        .context("snapshot missing after save")?;
    anyhow::ensure!(
        restored.updated_at() == books.updated_at(),
        "snapshot round trip drifted"
    );
    println!(
        "  Snapshot verified on '{}' backend ({} documents)",
        store.provider_name(),
        restored.documents().count()
    );
    Ok(())
}
