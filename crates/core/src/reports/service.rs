//! Report generation over the ledgers.
//!
//! All reports are pure reads: they scan the financial ledger entries
//! (and, for brand sales, the trade documents) and never mutate state.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sauda_shared::types::PartyId;

use super::types::{
    AgeingReport, AgeingRow, BrandSalesRow, CashFlowBucket, CashFlowCategory, CashFlowReport,
    DayBookReport, DayBookRow, ProfitAndLossSummary,
};
use crate::ledger::{EntryType, FinancialLedger, LedgerEntry};
use crate::trade::{DocumentKind, DocumentStatus, TradeDocument};

/// Service for generating reports.
pub struct ReportService;

impl ReportService {
    /// Outstanding receivables and payables per party, largest due
    /// first.
    ///
    /// A party sits on the receivable side if it carries any revenue or
    /// customer payment legs, otherwise on the payable side. Recognition
    /// legs make up `total`, payment legs make up `paid`.
    #[must_use]
    pub fn ageing(ledger: &FinancialLedger) -> AgeingReport {
        #[derive(Default)]
        struct Position {
            receivable: bool,
            recognized: Decimal,
            paid: Decimal,
        }

        let mut positions: BTreeMap<PartyId, Position> = BTreeMap::new();
        for entry in ledger.entries() {
            let Some(party_id) = entry.party_id else {
                continue;
            };
            if entry.account_id.is_some() {
                continue;
            }
            let position = positions.entry(party_id).or_default();
            if entry.entry_type.marks_receivable() {
                position.receivable = true;
            }
            match entry.entry_type {
                EntryType::Revenue => position.recognized += entry.debit,
                EntryType::Cost => position.recognized += entry.credit,
                EntryType::CustomerPayment => position.paid += entry.credit,
                EntryType::VendorPayment => position.paid += entry.debit,
                EntryType::Expense | EntryType::FundTransfer => {}
            }
        }

        let mut receivables = Vec::new();
        let mut payables = Vec::new();
        for (party_id, position) in positions {
            let row = AgeingRow {
                party_id,
                total: position.recognized,
                paid: position.paid,
                due: position.recognized - position.paid,
            };
            if position.receivable {
                receivables.push(row);
            } else {
                payables.push(row);
            }
        }
        receivables.sort_by(|a, b| b.due.cmp(&a.due));
        payables.sort_by(|a, b| b.due.cmp(&a.due));
        AgeingReport {
            receivables,
            payables,
        }
    }

    /// Cash flow through the treasury accounts over a date range,
    /// bucketed by category.
    #[must_use]
    pub fn cash_flow(ledger: &FinancialLedger, from: NaiveDate, to: NaiveDate) -> CashFlowReport {
        let mut inflows: BTreeMap<CashFlowCategory, CashFlowBucket> = BTreeMap::new();
        let mut outflows: BTreeMap<CashFlowCategory, CashFlowBucket> = BTreeMap::new();

        for entry in ledger.entries() {
            if !entry.is_treasury() || entry.date < from || entry.date > to {
                continue;
            }
            let inflow = entry.debit > Decimal::ZERO;
            let category = Self::classify(entry, inflow);
            let buckets = if inflow { &mut inflows } else { &mut outflows };
            let bucket = buckets.entry(category).or_insert_with(|| CashFlowBucket {
                category,
                total: Decimal::ZERO,
                entries: Vec::new(),
            });
            bucket.total += entry.debit.max(entry.credit);
            bucket.entries.push(entry.id);
        }

        let inflows: Vec<CashFlowBucket> = inflows.into_values().collect();
        let outflows: Vec<CashFlowBucket> = outflows.into_values().collect();
        let total_inflow: Decimal = inflows.iter().map(|b| b.total).sum();
        let total_outflow: Decimal = outflows.iter().map(|b| b.total).sum();
        CashFlowReport {
            from,
            to,
            net: total_inflow - total_outflow,
            inflows,
            outflows,
            total_inflow,
            total_outflow,
        }
    }

    /// Day-by-day treasury position over a date range.
    ///
    /// Opening of the first row carries in the account opening balances
    /// plus every treasury leg dated before the range.
    #[must_use]
    pub fn day_book(ledger: &FinancialLedger, from: NaiveDate, to: NaiveDate) -> DayBookReport {
        let mut opening: Decimal = ledger.accounts().map(|a| a.opening_balance).sum();
        for entry in ledger.entries() {
            if entry.is_treasury() && entry.date < from {
                opening += entry.signed_amount();
            }
        }

        let mut rows = Vec::new();
        for date in from.iter_days().take_while(|d| *d <= to) {
            let mut receipts = Decimal::ZERO;
            let mut payments = Decimal::ZERO;
            for entry in ledger.entries() {
                if entry.is_treasury() && entry.date == date {
                    receipts += entry.debit;
                    payments += entry.credit;
                }
            }
            let closing = opening + receipts - payments;
            rows.push(DayBookRow {
                date,
                opening,
                receipts,
                payments,
                closing,
            });
            opening = closing;
        }
        DayBookReport { from, to, rows }
    }

    /// Profit and loss over a date range.
    #[must_use]
    pub fn profit_and_loss(
        ledger: &FinancialLedger,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ProfitAndLossSummary {
        let mut gross_sales = Decimal::ZERO;
        let mut cost_of_goods = Decimal::ZERO;
        let mut operating_expenses = Decimal::ZERO;
        for entry in ledger.entries() {
            if entry.date < from || entry.date > to {
                continue;
            }
            match entry.entry_type {
                // Revenue is recognized once per sale: the party leg of
                // an invoice, or the treasury leg of a cash sale.
                EntryType::Revenue => gross_sales += entry.debit,
                EntryType::Cost => cost_of_goods += entry.credit,
                EntryType::Expense => operating_expenses += entry.credit,
                EntryType::CustomerPayment
                | EntryType::VendorPayment
                | EntryType::FundTransfer => {}
            }
        }
        ProfitAndLossSummary {
            gross_sales,
            cost_of_goods,
            operating_expenses,
            net_income: gross_sales - cost_of_goods - operating_expenses,
        }
    }

    /// Settled sales value per brand, largest revenue first.
    ///
    /// Scans uncancelled sales documents; each line contributes its
    /// settled quantity at line pricing.
    #[must_use]
    pub fn brand_sales<'a>(documents: impl Iterator<Item = &'a TradeDocument>) -> Vec<BrandSalesRow> {
        let mut rows: BTreeMap<String, BrandSalesRow> = BTreeMap::new();
        for doc in documents {
            if doc.kind != DocumentKind::Sales || doc.status == DocumentStatus::Cancelled {
                continue;
            }
            for line in &doc.lines {
                if line.settled == 0 {
                    continue;
                }
                let brand = line
                    .product
                    .brand
                    .clone()
                    .unwrap_or_else(|| "Unbranded".to_string());
                let row = rows.entry(brand.clone()).or_insert_with(|| BrandSalesRow {
                    brand,
                    units: 0,
                    revenue: Decimal::ZERO,
                    products: Vec::new(),
                });
                row.units += line.settled;
                row.revenue += line.value_of(line.settled);
                if !row.products.contains(&line.product.id) {
                    row.products.push(line.product.id);
                }
            }
        }
        let mut rows: Vec<BrandSalesRow> = rows.into_values().collect();
        rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
        rows
    }

    fn classify(entry: &LedgerEntry, inflow: bool) -> CashFlowCategory {
        if inflow {
            match entry.entry_type {
                EntryType::CustomerPayment => CashFlowCategory::CustomerReceipts,
                EntryType::Revenue => CashFlowCategory::CashSales,
                EntryType::FundTransfer => CashFlowCategory::InternalTransfers,
                _ => CashFlowCategory::OtherIncome,
            }
        } else {
            match entry.entry_type {
                EntryType::VendorPayment => CashFlowCategory::VendorPayments,
                EntryType::FundTransfer => CashFlowCategory::InternalTransfers,
                EntryType::Expense => {
                    let description = entry.description.to_lowercase();
                    if ["salary", "salaries", "payroll", "wages"]
                        .iter()
                        .any(|k| description.contains(k))
                    {
                        CashFlowCategory::PayrollPayments
                    } else {
                        CashFlowCategory::ExpensePayments
                    }
                }
                _ => CashFlowCategory::OtherPayments,
            }
        }
    }
}
