//! Property tests for the financial ledger.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use sauda_shared::types::{AccountId, PartyId, TenantId};

use super::service::FinancialLedger;
use super::types::{AccountKind, EntryType, LegDraft, Side};

/// Strategy for positive 2-dp monetary amounts.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|n| Decimal::new(n, 2))
}

fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Debit), Just(Side::Credit)]
}

fn entry_type_strategy() -> impl Strategy<Value = EntryType> {
    prop_oneof![
        Just(EntryType::Revenue),
        Just(EntryType::Cost),
        Just(EntryType::CustomerPayment),
        Just(EntryType::VendorPayment),
        Just(EntryType::Expense),
        Just(EntryType::FundTransfer),
    ]
}

/// One randomly-generated posting: a target selector, a side, a type and
/// an amount. The target selector indexes into a small fixed pool of
/// accounts and parties so postings collide on the same targets.
#[derive(Debug, Clone)]
struct PostingSpec {
    target: usize,
    against_account: bool,
    side: Side,
    entry_type: EntryType,
    amount: Decimal,
    day: u32,
}

fn posting_strategy() -> impl Strategy<Value = PostingSpec> {
    (
        0usize..3,
        any::<bool>(),
        side_strategy(),
        entry_type_strategy(),
        amount_strategy(),
        1u32..28,
    )
        .prop_map(
            |(target, against_account, side, entry_type, amount, day)| PostingSpec {
                target,
                against_account,
                side,
                entry_type,
                amount,
                day,
            },
        )
}

fn apply(
    ledger: &mut FinancialLedger,
    accounts: &[AccountId],
    parties: &[PartyId],
    spec: &PostingSpec,
) {
    let date = NaiveDate::from_ymd_opt(2026, 3, spec.day).unwrap();
    let draft = if spec.against_account {
        LegDraft::treasury(
            accounts[spec.target],
            spec.side,
            spec.amount,
            spec.entry_type,
            date,
        )
    } else {
        LegDraft::party(
            parties[spec.target],
            spec.side,
            spec.amount,
            spec.entry_type,
            date,
        )
    };
    ledger.post_single(draft).unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// After any sequence of postings the incremental balance caches
    /// agree with a from-scratch recomputation over all legs.
    #[test]
    fn prop_caches_match_full_scan_oracle(
        openings in prop::collection::vec(amount_strategy(), 3),
        postings in prop::collection::vec(posting_strategy(), 0..40),
    ) {
        let mut ledger = FinancialLedger::new(TenantId::new());
        let accounts: Vec<AccountId> = openings
            .iter()
            .enumerate()
            .map(|(i, opening)| ledger.open_account(format!("Account {i}"), AccountKind::Cash, *opening))
            .collect();
        let parties: Vec<PartyId> = (0..3).map(|_| PartyId::new()).collect();

        for spec in &postings {
            apply(&mut ledger, &accounts, &parties, spec);
            prop_assert!(ledger.verify_balances());
        }
    }

    /// Every pair accepted by `post_pair` has Σdebit == Σcredit, and a
    /// rejected pair appends nothing.
    #[test]
    fn prop_pairs_balance_or_append_nothing(
        amount_a in amount_strategy(),
        amount_b in amount_strategy(),
    ) {
        let mut ledger = FinancialLedger::new(TenantId::new());
        let account = ledger.open_account("Cash", AccountKind::Cash, Decimal::ZERO);
        let party = PartyId::new();
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        let before = ledger.entries().len();
        let result = ledger.post_pair(
            LegDraft::treasury(account, Side::Debit, amount_a, EntryType::CustomerPayment, date),
            LegDraft::party(party, Side::Credit, amount_b, EntryType::CustomerPayment, date),
        );

        if amount_a == amount_b {
            prop_assert!(result.is_ok());
            let debit: Decimal = ledger.entries().iter().map(|e| e.debit).sum();
            let credit: Decimal = ledger.entries().iter().map(|e| e.credit).sum();
            prop_assert_eq!(debit, credit);
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(ledger.entries().len(), before);
        }
    }

    /// Toggling reconciliation flags never moves any balance.
    #[test]
    fn prop_reconciliation_never_moves_balances(
        postings in prop::collection::vec(posting_strategy(), 1..20),
        toggles in prop::collection::vec(any::<prop::sample::Index>(), 1..10),
    ) {
        let mut ledger = FinancialLedger::new(TenantId::new());
        let accounts: Vec<AccountId> = (0..3)
            .map(|i| ledger.open_account(format!("Account {i}"), AccountKind::Bank, Decimal::ZERO))
            .collect();
        let parties: Vec<PartyId> = (0..3).map(|_| PartyId::new()).collect();

        for spec in &postings {
            apply(&mut ledger, &accounts, &parties, spec);
        }

        let balances_before: Vec<Decimal> = accounts
            .iter()
            .map(|id| ledger.account_balance(*id).unwrap())
            .collect();
        let nets_before: Vec<Decimal> = parties.iter().map(|id| ledger.party_net(*id)).collect();

        let ids: Vec<_> = ledger.entries().iter().map(|e| e.id).collect();
        for toggle in &toggles {
            ledger.toggle_reconciled(*toggle.get(&ids)).unwrap();
        }

        let balances_after: Vec<Decimal> = accounts
            .iter()
            .map(|id| ledger.account_balance(*id).unwrap())
            .collect();
        let nets_after: Vec<Decimal> = parties.iter().map(|id| ledger.party_net(*id)).collect();

        prop_assert_eq!(balances_before, balances_after);
        prop_assert_eq!(nets_before, nets_after);
        prop_assert!(ledger.verify_balances());
    }

    /// A failed fund transfer leaves the ledger byte-identical.
    #[test]
    fn prop_failed_transfer_has_no_side_effects(
        opening in amount_strategy(),
        requested in amount_strategy(),
    ) {
        prop_assume!(requested > opening);

        let mut ledger = FinancialLedger::new(TenantId::new());
        let from = ledger.open_account("From", AccountKind::Cash, opening);
        let to = ledger.open_account("To", AccountKind::Bank, Decimal::ZERO);
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        let result = ledger.transfer_funds(from, to, requested, date, "TRF");
        prop_assert!(result.is_err());
        prop_assert!(ledger.entries().is_empty());
        prop_assert_eq!(ledger.account_balance(from).unwrap(), opening);
        prop_assert_eq!(ledger.account_balance(to).unwrap(), Decimal::ZERO);
    }
}
