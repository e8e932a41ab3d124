//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sauda_shared::types::{EntryId, PartyId, ProductId};
use serde::{Deserialize, Serialize};

/// One party's position in the ageing report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeingRow {
    /// The counterparty.
    pub party_id: PartyId,
    /// Total recognized against the party (invoiced or billed).
    pub total: Decimal,
    /// Total payments applied.
    pub paid: Decimal,
    /// What is still owed.
    pub due: Decimal,
}

/// Outstanding receivables and payables per party.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeingReport {
    /// Customers who owe us, largest due first.
    pub receivables: Vec<AgeingRow>,
    /// Suppliers we owe, largest due first.
    pub payables: Vec<AgeingRow>,
}

/// Buckets money movement through the treasury accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowCategory {
    /// Customer payments collected against documents.
    CustomerReceipts,
    /// Walk-in sales taken straight into an account.
    CashSales,
    /// Movement between own accounts.
    InternalTransfers,
    /// Inflows outside the other buckets.
    OtherIncome,
    /// Payments made to vendors.
    VendorPayments,
    /// Salary and wage expenses.
    PayrollPayments,
    /// Other operating expenses.
    ExpensePayments,
    /// Outflows outside the other buckets.
    OtherPayments,
}

/// One cash flow bucket with the entries behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowBucket {
    /// The bucket.
    pub category: CashFlowCategory,
    /// Summed amount.
    pub total: Decimal,
    /// Ledger entries that make up the total.
    pub entries: Vec<EntryId>,
}

/// Cash flow over a date range, bucketed by category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowReport {
    /// First day of the range, inclusive.
    pub from: NaiveDate,
    /// Last day of the range, inclusive.
    pub to: NaiveDate,
    /// Money entering treasury accounts.
    pub inflows: Vec<CashFlowBucket>,
    /// Money leaving treasury accounts.
    pub outflows: Vec<CashFlowBucket>,
    /// Sum of all inflow buckets.
    pub total_inflow: Decimal,
    /// Sum of all outflow buckets.
    pub total_outflow: Decimal,
    /// Inflow minus outflow.
    pub net: Decimal,
}

/// One day's treasury position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayBookRow {
    /// The day.
    pub date: NaiveDate,
    /// Balance carried in at start of day.
    pub opening: Decimal,
    /// Treasury debits during the day.
    pub receipts: Decimal,
    /// Treasury credits during the day.
    pub payments: Decimal,
    /// Balance carried out at end of day.
    pub closing: Decimal,
}

/// Day-by-day treasury position over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayBookReport {
    /// First day of the range, inclusive.
    pub from: NaiveDate,
    /// Last day of the range, inclusive.
    pub to: NaiveDate,
    /// One row per day, oldest first.
    pub rows: Vec<DayBookRow>,
}

/// Profit and loss over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitAndLossSummary {
    /// Revenue recognized (invoices plus cash sales).
    pub gross_sales: Decimal,
    /// Cost recognized against purchase bills.
    pub cost_of_goods: Decimal,
    /// Operating expenses paid.
    pub operating_expenses: Decimal,
    /// Gross sales minus cost of goods and expenses.
    pub net_income: Decimal,
}

/// Settled sales of one brand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandSalesRow {
    /// The brand, or "Unbranded" for products without one.
    pub brand: String,
    /// Units settled.
    pub units: i64,
    /// Settled value at line pricing.
    pub revenue: Decimal,
    /// Distinct products contributing.
    pub products: Vec<ProductId>,
}
