//! Scenario tests driving the engine facade end to end.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sauda_shared::types::{AccountId, PartyId, ProductId, TenantId};

use super::{DraftLine, HistoricalDocument, HistoricalLine, InMemoryPartyDirectory, TenantBooks};
use crate::error::EngineError;
use crate::ledger::{AccountKind, EntryType, PartyKind};
use crate::stock::Zone;
use crate::trade::{
    DocumentKind, DocumentStatus, PaymentStatus, ProductSnapshot, QuantityLine, TradeError,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, d).expect("valid date")
}

fn product(name: &str) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::new(),
        name: name.to_string(),
        sku: format!("SKU-{name}"),
        brand: Some("Orbit".to_string()),
        image: None,
    }
}

fn draft_line(product: &ProductSnapshot, qty: i64, price: Decimal) -> DraftLine {
    DraftLine {
        product: product.clone(),
        qty,
        unit_price: price,
        discount_pct: Decimal::ZERO,
        tax_pct: Decimal::ZERO,
    }
}

struct Fixture {
    books: TenantBooks,
    directory: InMemoryPartyDirectory,
    cash: AccountId,
    customer: PartyId,
    supplier: PartyId,
}

fn fixture() -> Fixture {
    let mut books = TenantBooks::new(TenantId::new());
    let cash = books.open_account("Cash", AccountKind::Cash, dec!(10000));
    let mut directory = InMemoryPartyDirectory::new();
    let customer = directory.register("Acme Retail", PartyKind::Customer, Decimal::ZERO);
    let supplier = directory.register("Orbit Wholesale", PartyKind::Supplier, Decimal::ZERO);
    Fixture {
        books,
        directory,
        cash,
        customer,
        supplier,
    }
}

#[test]
fn test_full_sales_cycle() {
    let mut fx = fixture();
    let chair = product("Chair");
    fx.books
        .receive_stock(chair.id, Zone::Godown, 20, "Opening stock", None, "admin")
        .unwrap();

    let id = fx
        .books
        .draft_document(
            DocumentKind::Sales,
            fx.customer,
            Zone::Godown,
            vec![draft_line(&chair, 10, dec!(100))],
            day(1),
            Some(day(7)),
            &fx.directory,
        )
        .unwrap();
    assert_eq!(fx.books.document(id).unwrap().status, DocumentStatus::Quotation);
    assert_eq!(fx.books.document(id).unwrap().number, "QT-0001");
    assert_eq!(fx.books.document(id).unwrap().totals.grand_total, dec!(1000.00));

    fx.books.mark_quotation_sent(id).unwrap();
    fx.books.confirm(id).unwrap();
    let doc = fx.books.document(id).unwrap();
    assert_eq!(doc.status, DocumentStatus::SalesOrder);
    assert_eq!(doc.number, "SO-0001");
    assert_eq!(doc.quotation_number.as_deref(), Some("QT-0001"));

    let lines = [QuantityLine {
        product_id: chair.id,
        qty: 6,
    }];
    let dn = fx
        .books
        .record_fulfillment(id, &lines, Zone::Godown, day(2), "admin")
        .unwrap();
    assert_eq!(dn, "DN-0001");
    assert_eq!(
        fx.books.document(id).unwrap().status,
        DocumentStatus::PartiallyDelivered
    );
    assert_eq!(fx.books.stock().on_hand(chair.id, Zone::Godown), 14);

    let rest = [QuantityLine {
        product_id: chair.id,
        qty: 4,
    }];
    fx.books
        .record_fulfillment(id, &rest, Zone::Godown, day(3), "admin")
        .unwrap();
    assert_eq!(
        fx.books.document(id).unwrap().status,
        DocumentStatus::FullyDelivered
    );

    let inv = fx
        .books
        .settle(
            id,
            &[QuantityLine {
                product_id: chair.id,
                qty: 10,
            }],
            day(4),
        )
        .unwrap();
    assert_eq!(inv, "INV-0001");
    assert_eq!(
        fx.books.document(id).unwrap().status,
        DocumentStatus::FullyBilled
    );
    // The invoice leg is receivable until paid.
    assert_eq!(
        fx.books.party_balance(fx.customer, &fx.directory).unwrap(),
        dec!(1000.00)
    );

    fx.books
        .collect_payment(id, dec!(1000.00), fx.cash, "UPI-881", day(5))
        .unwrap();
    let doc = fx.books.document(id).unwrap();
    assert_eq!(doc.payment_status, PaymentStatus::Paid);
    assert_eq!(doc.outstanding(), Decimal::ZERO);
    assert_eq!(fx.books.account_balance(fx.cash).unwrap(), dec!(11000.00));
    assert_eq!(
        fx.books.party_balance(fx.customer, &fx.directory).unwrap(),
        Decimal::ZERO
    );
    assert!(fx.books.verify_balances());
}

#[test]
fn test_full_purchase_cycle() {
    let mut fx = fixture();
    let desk = product("Desk");

    let id = fx
        .books
        .draft_document(
            DocumentKind::Purchase,
            fx.supplier,
            Zone::Godown,
            vec![draft_line(&desk, 5, dec!(400))],
            day(1),
            None,
            &fx.directory,
        )
        .unwrap();
    assert_eq!(fx.books.document(id).unwrap().status, DocumentStatus::Rfq);
    assert_eq!(fx.books.document(id).unwrap().number, "RFQ-0001");

    fx.books.confirm(id).unwrap();
    assert_eq!(
        fx.books.document(id).unwrap().status,
        DocumentStatus::PurchaseOrder
    );
    assert_eq!(fx.books.document(id).unwrap().number, "PO-0001");

    let grn = fx
        .books
        .record_fulfillment(
            id,
            &[QuantityLine {
                product_id: desk.id,
                qty: 5,
            }],
            Zone::Godown,
            day(2),
            "admin",
        )
        .unwrap();
    assert_eq!(grn, "GRN-0001");
    assert_eq!(
        fx.books.document(id).unwrap().status,
        DocumentStatus::GrnCompleted
    );
    assert_eq!(fx.books.stock().on_hand(desk.id, Zone::Godown), 5);

    let bill = fx
        .books
        .settle(
            id,
            &[QuantityLine {
                product_id: desk.id,
                qty: 5,
            }],
            day(3),
        )
        .unwrap();
    assert_eq!(bill, "BILL-0001");
    assert_eq!(fx.books.document(id).unwrap().status, DocumentStatus::Billed);
    // We owe the supplier the billed amount.
    assert_eq!(
        fx.books.party_balance(fx.supplier, &fx.directory).unwrap(),
        dec!(2000.00)
    );

    fx.books
        .pay_vendor(id, dec!(2000.00), fx.cash, "CHQ-114", day(4))
        .unwrap();
    assert_eq!(fx.books.account_balance(fx.cash).unwrap(), dec!(8000.00));
    assert_eq!(
        fx.books.party_balance(fx.supplier, &fx.directory).unwrap(),
        Decimal::ZERO
    );
    assert_eq!(
        fx.books.document(id).unwrap().payment_status,
        PaymentStatus::Paid
    );
    assert!(fx.books.verify_balances());
}

#[test]
fn test_insufficient_stock_fulfillment_is_all_or_nothing() {
    let mut fx = fixture();
    let chair = product("Chair");
    let lamp = product("Lamp");
    fx.books
        .receive_stock(chair.id, Zone::Godown, 10, "Opening stock", None, "admin")
        .unwrap();
    fx.books
        .receive_stock(lamp.id, Zone::Godown, 2, "Opening stock", None, "admin")
        .unwrap();

    let id = fx
        .books
        .draft_document(
            DocumentKind::Sales,
            fx.customer,
            Zone::Godown,
            vec![draft_line(&chair, 5, dec!(100)), draft_line(&lamp, 5, dec!(50))],
            day(1),
            None,
            &fx.directory,
        )
        .unwrap();
    fx.books.confirm(id).unwrap();

    // Lamp is short; nothing may move, chair included.
    let result = fx.books.record_fulfillment(
        id,
        &[
            QuantityLine {
                product_id: chair.id,
                qty: 5,
            },
            QuantityLine {
                product_id: lamp.id,
                qty: 5,
            },
        ],
        Zone::Godown,
        day(2),
        "admin",
    );
    assert!(matches!(result, Err(EngineError::Stock(_))));
    assert_eq!(fx.books.stock().on_hand(chair.id, Zone::Godown), 10);
    assert_eq!(fx.books.stock().on_hand(lamp.id, Zone::Godown), 2);
    let doc = fx.books.document(id).unwrap();
    assert_eq!(doc.status, DocumentStatus::SalesOrder);
    assert!(doc.fulfillments.is_empty());
}

#[test]
fn test_overfulfillment_rejected() {
    let mut fx = fixture();
    let chair = product("Chair");
    fx.books
        .receive_stock(chair.id, Zone::Godown, 50, "Opening stock", None, "admin")
        .unwrap();

    let id = fx
        .books
        .draft_document(
            DocumentKind::Sales,
            fx.customer,
            Zone::Godown,
            vec![draft_line(&chair, 10, dec!(100))],
            day(1),
            None,
            &fx.directory,
        )
        .unwrap();
    fx.books.confirm(id).unwrap();

    let result = fx.books.record_fulfillment(
        id,
        &[QuantityLine {
            product_id: chair.id,
            qty: 11,
        }],
        Zone::Godown,
        day(2),
        "admin",
    );
    assert!(matches!(
        result,
        Err(EngineError::Trade(TradeError::QuantityExceedsRemaining { .. }))
    ));
    assert_eq!(fx.books.stock().on_hand(chair.id, Zone::Godown), 50);
}

#[test]
fn test_reservation_round_trip() {
    let mut fx = fixture();
    let chair = product("Chair");
    fx.books
        .receive_stock(chair.id, Zone::Godown, 10, "Opening stock", None, "admin")
        .unwrap();

    let id = fx
        .books
        .draft_document(
            DocumentKind::Sales,
            fx.customer,
            Zone::Godown,
            vec![draft_line(&chair, 6, dec!(100))],
            day(1),
            None,
            &fx.directory,
        )
        .unwrap();
    fx.books.confirm(id).unwrap();

    let lines = [QuantityLine {
        product_id: chair.id,
        qty: 6,
    }];
    fx.books
        .reserve_stock(id, &lines, Zone::Godown, "admin")
        .unwrap();
    assert_eq!(fx.books.stock().on_hand(chair.id, Zone::Booked), 6);
    // Booked stock is excluded from the sellable figure.
    assert_eq!(fx.books.stock().sellable(chair.id), 4);
    assert_eq!(fx.books.stock().total(chair.id), 10);

    // Delivery then draws from the booked zone.
    fx.books
        .record_fulfillment(id, &lines, Zone::Booked, day(2), "admin")
        .unwrap();
    assert_eq!(fx.books.stock().on_hand(chair.id, Zone::Booked), 0);
    assert_eq!(fx.books.stock().total(chair.id), 4);
}

#[test]
fn test_release_reservation_restores_zone() {
    let mut fx = fixture();
    let chair = product("Chair");
    fx.books
        .receive_stock(chair.id, Zone::Godown, 10, "Opening stock", None, "admin")
        .unwrap();

    let id = fx
        .books
        .draft_document(
            DocumentKind::Sales,
            fx.customer,
            Zone::Godown,
            vec![draft_line(&chair, 4, dec!(100))],
            day(1),
            None,
            &fx.directory,
        )
        .unwrap();
    fx.books.confirm(id).unwrap();

    let lines = [QuantityLine {
        product_id: chair.id,
        qty: 4,
    }];
    fx.books
        .reserve_stock(id, &lines, Zone::Godown, "admin")
        .unwrap();
    fx.books
        .release_reservation(id, &lines, Zone::Godown, "admin")
        .unwrap();
    assert_eq!(fx.books.stock().on_hand(chair.id, Zone::Godown), 10);
    assert_eq!(fx.books.stock().on_hand(chair.id, Zone::Booked), 0);
}

#[test]
fn test_cancel_only_before_fulfillment() {
    let mut fx = fixture();
    let chair = product("Chair");
    fx.books
        .receive_stock(chair.id, Zone::Godown, 10, "Opening stock", None, "admin")
        .unwrap();

    let id = fx
        .books
        .draft_document(
            DocumentKind::Sales,
            fx.customer,
            Zone::Godown,
            vec![draft_line(&chair, 5, dec!(100))],
            day(1),
            None,
            &fx.directory,
        )
        .unwrap();
    fx.books.confirm(id).unwrap();
    fx.books
        .record_fulfillment(
            id,
            &[QuantityLine {
                product_id: chair.id,
                qty: 2,
            }],
            Zone::Godown,
            day(2),
            "admin",
        )
        .unwrap();

    let result = fx.books.cancel(id);
    assert!(matches!(
        result,
        Err(EngineError::Trade(TradeError::InvalidTransition { .. }))
    ));

    // Lines are frozen too once quantity has flowed.
    let result = fx.books.update_lines(id, vec![draft_line(&chair, 3, dec!(100))]);
    assert!(matches!(
        result,
        Err(EngineError::Trade(TradeError::InvalidTransition { .. }))
    ));
}

#[test]
fn test_cancel_draft() {
    let mut fx = fixture();
    let chair = product("Chair");
    let id = fx
        .books
        .draft_document(
            DocumentKind::Sales,
            fx.customer,
            Zone::Godown,
            vec![draft_line(&chair, 5, dec!(100))],
            day(1),
            None,
            &fx.directory,
        )
        .unwrap();
    fx.books.cancel(id).unwrap();
    assert_eq!(fx.books.document(id).unwrap().status, DocumentStatus::Cancelled);

    let result = fx.books.mark_quotation_sent(id);
    assert!(matches!(
        result,
        Err(EngineError::Trade(TradeError::InvalidTransition { .. }))
    ));
}

#[test]
fn test_payment_cannot_exceed_outstanding() {
    let mut fx = fixture();
    let chair = product("Chair");
    fx.books
        .receive_stock(chair.id, Zone::Godown, 10, "Opening stock", None, "admin")
        .unwrap();

    let id = fx
        .books
        .draft_document(
            DocumentKind::Sales,
            fx.customer,
            Zone::Godown,
            vec![draft_line(&chair, 10, dec!(100))],
            day(1),
            None,
            &fx.directory,
        )
        .unwrap();
    fx.books.confirm(id).unwrap();

    let result = fx
        .books
        .collect_payment(id, dec!(1000.01), fx.cash, "UPI-1", day(2));
    assert!(matches!(
        result,
        Err(EngineError::Trade(TradeError::PaymentExceedsOutstanding { .. }))
    ));
    assert_eq!(fx.books.account_balance(fx.cash).unwrap(), dec!(10000));

    // Partial payments accumulate.
    fx.books
        .collect_payment(id, dec!(400), fx.cash, "UPI-2", day(2))
        .unwrap();
    fx.books
        .collect_payment(id, dec!(600), fx.cash, "UPI-3", day(3))
        .unwrap();
    assert_eq!(
        fx.books.document(id).unwrap().payment_status,
        PaymentStatus::Paid
    );
    let result = fx
        .books
        .collect_payment(id, dec!(1), fx.cash, "UPI-4", day(4));
    assert!(result.is_err());
}

#[test]
fn test_advance_nets_until_reconciled() {
    let mut fx = fixture();
    let chair = product("Chair");
    fx.books
        .receive_stock(chair.id, Zone::Godown, 10, "Opening stock", None, "admin")
        .unwrap();

    // Customer pays 300 up front.
    let (_, party_leg) = fx
        .books
        .record_advance(fx.customer, dec!(300), fx.cash, "ADV-1", day(1), &fx.directory)
        .unwrap();
    assert_eq!(
        fx.books.party_balance(fx.customer, &fx.directory).unwrap(),
        dec!(-300)
    );
    assert_eq!(fx.books.account_balance(fx.cash).unwrap(), dec!(10300));

    let id = fx
        .books
        .draft_document(
            DocumentKind::Sales,
            fx.customer,
            Zone::Godown,
            vec![draft_line(&chair, 10, dec!(100))],
            day(2),
            None,
            &fx.directory,
        )
        .unwrap();
    fx.books.confirm(id).unwrap();
    fx.books
        .record_fulfillment(
            id,
            &[QuantityLine {
                product_id: chair.id,
                qty: 10,
            }],
            Zone::Godown,
            day(3),
            "admin",
        )
        .unwrap();
    fx.books
        .settle(
            id,
            &[QuantityLine {
                product_id: chair.id,
                qty: 10,
            }],
            day(4),
        )
        .unwrap();
    // Invoice 1000 nets against the advance: 1000 - 300.
    assert_eq!(
        fx.books.party_balance(fx.customer, &fx.directory).unwrap(),
        dec!(700.00)
    );
    assert_eq!(fx.books.document(id).unwrap().amount_paid, Decimal::ZERO);

    // Reconciling moves no balances; it only applies the amount to the
    // document.
    fx.books.reconcile_advance(id, party_leg, dec!(300)).unwrap();
    assert_eq!(
        fx.books.party_balance(fx.customer, &fx.directory).unwrap(),
        dec!(700.00)
    );
    assert_eq!(fx.books.document(id).unwrap().amount_paid, dec!(300));
    assert_eq!(fx.books.document(id).unwrap().outstanding(), dec!(700.00));

    // A consumed advance cannot be reconciled twice.
    let result = fx.books.reconcile_advance(id, party_leg, dec!(300));
    assert!(result.is_err());
    assert!(fx.books.verify_balances());
}

#[test]
fn test_cash_sale_and_expense() {
    let mut fx = fixture();
    fx.books
        .record_cash_sale(fx.cash, dec!(850), "Walk-in", day(1))
        .unwrap();
    fx.books
        .record_expense("Rent", dec!(5000), fx.cash, "April shop rent", day(2))
        .unwrap();
    assert_eq!(fx.books.account_balance(fx.cash).unwrap(), dec!(5850));
    assert_eq!(fx.books.expenses().len(), 1);
    assert_eq!(fx.books.expenses()[0].category, "Rent");

    let expense_legs = fx
        .books
        .ledger()
        .entries()
        .iter()
        .filter(|e| e.entry_type == EntryType::Expense)
        .count();
    assert_eq!(expense_legs, 1);
    assert!(fx.books.verify_balances());
}

#[test]
fn test_import_historical_is_read_only() {
    let mut fx = fixture();
    let desk = product("Desk");
    let id = fx
        .books
        .import_historical(
            HistoricalDocument {
                kind: DocumentKind::Purchase,
                number: "OLD-PO-77".to_string(),
                issue_date: day(1),
                party_id: fx.supplier,
                lines: vec![HistoricalLine {
                    product: desk.clone(),
                    ordered: 8,
                    fulfilled: 8,
                    settled: 8,
                    unit_price: dec!(400),
                    discount_pct: Decimal::ZERO,
                    tax_pct: Decimal::ZERO,
                }],
                amount_paid: dec!(3200),
            },
            &fx.directory,
            "migrator",
        )
        .unwrap();

    let doc = fx.books.document(id).unwrap();
    assert_eq!(doc.status, DocumentStatus::Migrated);
    assert_eq!(doc.number, "OLD-PO-77");
    assert_eq!(doc.payment_status, PaymentStatus::Paid);
    assert!(doc.is_historical());

    // Migrated goods land in the archive, outside operable totals.
    assert_eq!(fx.books.stock().on_hand(desk.id, Zone::Archive), 8);
    assert_eq!(fx.books.stock().total(desk.id), 0);
    assert_eq!(fx.books.stock().sellable(desk.id), 0);

    // No ledger legs were posted.
    assert!(fx.books.ledger().entries().is_empty());

    // Every mutation is rejected.
    assert!(matches!(
        fx.books.cancel(id),
        Err(EngineError::Trade(TradeError::ReadOnlyHistorical))
    ));
    assert!(matches!(
        fx.books.settle(
            id,
            &[QuantityLine {
                product_id: desk.id,
                qty: 1
            }],
            day(2)
        ),
        Err(EngineError::Trade(TradeError::ReadOnlyHistorical))
    ));
    assert!(matches!(
        fx.books.pay_vendor(id, dec!(1), fx.cash, "x", day(2)),
        Err(EngineError::Trade(TradeError::ReadOnlyHistorical))
    ));
}

#[test]
fn test_import_rejects_broken_quantity_triple() {
    let mut fx = fixture();
    let desk = product("Desk");
    let result = fx.books.import_historical(
        HistoricalDocument {
            kind: DocumentKind::Sales,
            number: "OLD-INV-3".to_string(),
            issue_date: day(1),
            party_id: fx.customer,
            lines: vec![HistoricalLine {
                product: desk,
                ordered: 5,
                fulfilled: 3,
                settled: 4,
                unit_price: dec!(100),
                discount_pct: Decimal::ZERO,
                tax_pct: Decimal::ZERO,
            }],
            amount_paid: Decimal::ZERO,
        },
        &fx.directory,
        "migrator",
    );
    assert!(matches!(
        result,
        Err(EngineError::Trade(TradeError::QuantityExceedsRemaining { .. }))
    ));
}

#[test]
fn test_wrong_kind_operations_rejected() {
    let mut fx = fixture();
    let desk = product("Desk");
    let id = fx
        .books
        .draft_document(
            DocumentKind::Purchase,
            fx.supplier,
            Zone::Godown,
            vec![draft_line(&desk, 5, dec!(400))],
            day(1),
            None,
            &fx.directory,
        )
        .unwrap();

    assert!(matches!(
        fx.books.mark_quotation_sent(id),
        Err(EngineError::Trade(TradeError::WrongKind { .. }))
    ));

    fx.books.confirm(id).unwrap();
    assert!(matches!(
        fx.books.collect_payment(id, dec!(100), fx.cash, "x", day(2)),
        Err(EngineError::Trade(TradeError::WrongKind { .. }))
    ));
    assert!(matches!(
        fx.books
            .reserve_stock(
                id,
                &[QuantityLine {
                    product_id: desk.id,
                    qty: 1
                }],
                Zone::Godown,
                "admin"
            ),
        Err(EngineError::Trade(TradeError::WrongKind { .. }))
    ));
}

#[test]
fn test_transfer_funds_between_accounts() {
    let mut fx = fixture();
    let bank = fx.books.open_account("HDFC Current", AccountKind::Bank, dec!(50000));

    fx.books
        .transfer_funds(bank, fx.cash, dec!(5000), day(1), "ATM withdrawal")
        .unwrap();
    assert_eq!(fx.books.account_balance(bank).unwrap(), dec!(45000));
    assert_eq!(fx.books.account_balance(fx.cash).unwrap(), dec!(15000));

    // A transfer the source cannot cover leaves both untouched.
    let result = fx
        .books
        .transfer_funds(fx.cash, bank, dec!(15001), day(2), "overdraw");
    assert!(result.is_err());
    assert_eq!(fx.books.account_balance(bank).unwrap(), dec!(45000));
    assert_eq!(fx.books.account_balance(fx.cash).unwrap(), dec!(15000));
    assert!(fx.books.verify_balances());
}

#[test]
fn test_draft_validation() {
    let mut fx = fixture();
    let chair = product("Chair");

    let result = fx.books.draft_document(
        DocumentKind::Sales,
        fx.customer,
        Zone::Godown,
        vec![],
        day(1),
        None,
        &fx.directory,
    );
    assert!(matches!(
        result,
        Err(EngineError::Trade(TradeError::EmptyLines))
    ));

    let result = fx.books.draft_document(
        DocumentKind::Sales,
        fx.customer,
        Zone::Godown,
        vec![
            draft_line(&chair, 2, dec!(100)),
            draft_line(&chair, 3, dec!(100)),
        ],
        day(1),
        None,
        &fx.directory,
    );
    assert!(matches!(
        result,
        Err(EngineError::Trade(TradeError::DuplicateProduct(_)))
    ));

    let result = fx.books.draft_document(
        DocumentKind::Sales,
        PartyId::new(),
        Zone::Godown,
        vec![draft_line(&chair, 2, dec!(100))],
        day(1),
        None,
        &fx.directory,
    );
    assert!(matches!(result, Err(EngineError::PartyNotFound(_))));
}
