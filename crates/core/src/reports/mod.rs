//! Aggregate reporting: ageing, cash flow, day book, profit and loss,
//! and brand sales.

mod service;
mod types;


pub use service::ReportService;
pub use types::{
    AgeingReport, AgeingRow, BrandSalesRow, CashFlowBucket, CashFlowCategory, CashFlowReport,
    DayBookReport, DayBookRow, ProfitAndLossSummary,
};
