//! Append-only financial ledger with incrementally-maintained balances.
//!
//! The ledger itself is a dumb store of legs: it never decides which legs
//! belong together. Higher-level posting recipes (payments, advances,
//! settlements, fund transfers) build balanced pairs and submit them
//! through [`FinancialLedger::post_pair`], which rejects any pair whose
//! debits and credits do not sum to the same amount.
//!
//! Account and party balances are maintained as caches updated inside the
//! same append that stores a leg. The full-scan recomputation is retained
//! in [`FinancialLedger::verify_balances`] as a reconciliation oracle.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sauda_shared::types::{AccountId, DocumentId, EntryId, PartyId, TenantId};
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::types::{
    Account, AccountKind, EntryType, LedgerEntry, LedgerRow, LegDraft, PartyKind, Side,
};

/// Append-only store of ledger legs for one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialLedger {
    tenant_id: TenantId,
    accounts: BTreeMap<AccountId, Account>,
    entries: Vec<LedgerEntry>,
    /// Cached account balances (opening included), updated per append.
    account_balances: BTreeMap<AccountId, Decimal>,
    /// Cached per-party net Σ(debit − credit), updated per append.
    ///
    /// The sign convention of [`PartyKind`] is applied at read time so the
    /// cache stays kind-agnostic.
    party_nets: BTreeMap<PartyId, Decimal>,
}

impl FinancialLedger {
    /// Creates an empty ledger for a tenant.
    #[must_use]
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            accounts: BTreeMap::new(),
            entries: Vec::new(),
            account_balances: BTreeMap::new(),
            party_nets: BTreeMap::new(),
        }
    }

    /// The tenant this ledger belongs to.
    #[must_use]
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    // ========== Accounts ==========

    /// Opens a financial account with an opening balance.
    pub fn open_account(
        &mut self,
        name: impl Into<String>,
        kind: AccountKind,
        opening_balance: Decimal,
    ) -> AccountId {
        let account = Account {
            id: AccountId::new(),
            tenant_id: self.tenant_id,
            name: name.into(),
            kind,
            opening_balance,
        };
        let id = account.id;
        self.account_balances.insert(id, opening_balance);
        self.accounts.insert(id, account);
        id
    }

    /// Looks up an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account has this id.
    pub fn account(&self, id: AccountId) -> Result<&Account, LedgerError> {
        self.accounts.get(&id).ok_or(LedgerError::AccountNotFound(id))
    }

    /// All accounts, ordered by id.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Current balance of an account: opening + Σ(debit − credit), served
    /// from the incrementally-updated cache.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account has this id.
    pub fn account_balance(&self, id: AccountId) -> Result<Decimal, LedgerError> {
        self.account(id)?;
        Ok(self
            .account_balances
            .get(&id)
            .copied()
            .unwrap_or(Decimal::ZERO))
    }

    /// Net Σ(debit − credit) over a party's legs, sign convention not yet
    /// applied. Zero for a party with no legs.
    #[must_use]
    pub fn party_net(&self, id: PartyId) -> Decimal {
        self.party_nets.get(&id).copied().unwrap_or(Decimal::ZERO)
    }

    /// Current balance of a party under its kind's sign convention.
    ///
    /// Customer balance = opening + Σ(debit − credit); supplier balance =
    /// opening + Σ(credit − debit).
    #[must_use]
    pub fn party_balance(&self, id: PartyId, kind: PartyKind, opening_balance: Decimal) -> Decimal {
        let net = self.party_net(id);
        match kind {
            PartyKind::Customer => opening_balance + net,
            PartyKind::Supplier => opening_balance - net,
        }
    }

    // ========== Posting ==========

    /// Appends a single leg.
    ///
    /// Used only by recipes whose counterweight is outside the ledger
    /// (revenue/cost recognition against a party, cash sales, expenses).
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive, the leg does not
    /// reference exactly one of an account or a party, or the referenced
    /// account does not exist.
    pub fn post_single(&mut self, draft: LegDraft) -> Result<EntryId, LedgerError> {
        self.validate(&draft)?;
        Ok(self.append(draft))
    }

    /// Appends a balanced two-leg pair.
    ///
    /// Both legs are validated before either is appended; a failed call
    /// leaves the ledger untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if either leg fails single-leg validation or the
    /// pair's total debit does not equal its total credit.
    pub fn post_pair(
        &mut self,
        first: LegDraft,
        second: LegDraft,
    ) -> Result<(EntryId, EntryId), LedgerError> {
        self.validate(&first)?;
        self.validate(&second)?;

        let debit = first.debit() + second.debit();
        let credit = first.credit() + second.credit();
        if debit != credit {
            return Err(LedgerError::UnbalancedPair { debit, credit });
        }

        Ok((self.append(first), self.append(second)))
    }

    /// Moves money between two accounts.
    ///
    /// Posts a credit leg on the source and a debit leg on the
    /// destination, both of type `FundTransfer`.
    ///
    /// # Errors
    ///
    /// Returns `SameAccount` if source and destination are the same,
    /// `AccountNotFound` if either account is unknown, `InvalidAmount` if
    /// the amount is not positive, and `InsufficientBalance` if the source
    /// balance is lower than the amount.
    pub fn transfer_funds(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        date: NaiveDate,
        reference: impl Into<String>,
    ) -> Result<(EntryId, EntryId), LedgerError> {
        if from == to {
            return Err(LedgerError::SameAccount);
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let from_name = self.account(from)?.name.clone();
        let to_name = self.account(to)?.name.clone();
        let balance = self.account_balance(from)?;
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                account_id: from,
                balance,
                requested: amount,
            });
        }

        let reference = reference.into();
        self.post_pair(
            LegDraft::treasury(from, Side::Credit, amount, EntryType::FundTransfer, date)
                .with_reference(reference.clone())
                .with_description(format!("Transfer to {to_name}")),
            LegDraft::treasury(to, Side::Debit, amount, EntryType::FundTransfer, date)
                .with_reference(reference)
                .with_description(format!("Transfer from {from_name}")),
        )
    }

    fn validate(&self, draft: &LegDraft) -> Result<(), LedgerError> {
        if draft.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(draft.amount));
        }
        match (draft.account_id, draft.party_id) {
            (Some(account_id), None) => {
                self.account(account_id)?;
            }
            (None, Some(_)) => {}
            _ => return Err(LedgerError::InvalidLegTarget),
        }
        Ok(())
    }

    /// Appends a validated draft and updates the balance caches.
    fn append(&mut self, draft: LegDraft) -> EntryId {
        let entry = LedgerEntry {
            id: EntryId::new(),
            tenant_id: self.tenant_id,
            date: draft.date,
            entry_type: draft.entry_type,
            debit: draft.debit(),
            credit: draft.credit(),
            account_id: draft.account_id,
            party_id: draft.party_id,
            transaction_id: draft.transaction_id,
            reference: draft.reference,
            description: draft.description,
            reconciled: false,
            posted_at: Utc::now(),
        };
        let id = entry.id;
        let change = entry.signed_amount();
        if let Some(account_id) = entry.account_id {
            *self
                .account_balances
                .entry(account_id)
                .or_insert(Decimal::ZERO) += change;
        }
        if let Some(party_id) = entry.party_id {
            *self.party_nets.entry(party_id).or_insert(Decimal::ZERO) += change;
        }
        self.entries.push(entry);
        id
    }

    // ========== Queries ==========

    /// All legs in append order.
    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Looks up a leg by id.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if no leg has this id.
    pub fn entry(&self, id: EntryId) -> Result<&LedgerEntry, LedgerError> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or(LedgerError::EntryNotFound(id))
    }

    /// Legs of one account, in append order.
    pub fn entries_for_account(&self, id: AccountId) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(move |e| e.account_id == Some(id))
    }

    /// Party legs of one party, in append order.
    ///
    /// The `account_id == None` filter is the documented rule for party
    /// balance computations; with the leg-target invariant enforced at
    /// append it never excludes anything.
    pub fn entries_for_party(&self, id: PartyId) -> impl Iterator<Item = &LedgerEntry> {
        self.entries
            .iter()
            .filter(move |e| e.party_id == Some(id) && e.account_id.is_none())
    }

    /// Running ledger of an account: rows oldest-first in business date
    /// (ties broken by posting order), annotated with a forward-running
    /// balance starting from the opening balance, then reversed so the
    /// most recent row comes first.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account has this id.
    pub fn account_ledger(&self, id: AccountId) -> Result<Vec<LedgerRow>, LedgerError> {
        let opening = self.account(id)?.opening_balance;
        Ok(Self::running_rows(
            self.entries_for_account(id),
            opening,
            |e| e.signed_amount(),
        ))
    }

    /// Running ledger of a party under its kind's sign convention,
    /// most-recent-first like [`FinancialLedger::account_ledger`].
    #[must_use]
    pub fn party_ledger(
        &self,
        id: PartyId,
        kind: PartyKind,
        opening_balance: Decimal,
    ) -> Vec<LedgerRow> {
        Self::running_rows(self.entries_for_party(id), opening_balance, move |e| {
            kind.balance_change(e.debit, e.credit)
        })
    }

    fn running_rows<'a>(
        entries: impl Iterator<Item = &'a LedgerEntry>,
        opening: Decimal,
        change: impl Fn(&LedgerEntry) -> Decimal,
    ) -> Vec<LedgerRow> {
        let mut sorted: Vec<&LedgerEntry> = entries.collect();
        sorted.sort_by_key(|e| e.date);

        let mut balance = opening;
        let mut rows: Vec<LedgerRow> = sorted
            .into_iter()
            .map(|entry| {
                balance += change(entry);
                LedgerRow {
                    entry: entry.clone(),
                    running_balance: balance,
                }
            })
            .collect();
        rows.reverse();
        rows
    }

    // ========== Mutations outside the append path ==========

    /// Flips the reconciliation flag of a leg and returns the new state.
    ///
    /// Reconciliation is cosmetic bookkeeping; balances never change.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if no leg has this id.
    pub fn toggle_reconciled(&mut self, id: EntryId) -> Result<bool, LedgerError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(LedgerError::EntryNotFound(id))?;
        entry.reconciled = !entry.reconciled;
        Ok(entry.reconciled)
    }

    /// Re-tags an open party advance with the document that consumes it.
    ///
    /// Posts no legs; party and account balances are identical before and
    /// after. Returns the advance amount carried by the leg.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if no leg has this id and `NotAnAdvance` if
    /// the leg is not a party payment leg with an empty `transaction_id`.
    pub fn retag_advance(
        &mut self,
        id: EntryId,
        document_id: DocumentId,
    ) -> Result<Decimal, LedgerError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(LedgerError::EntryNotFound(id))?;
        let is_payment = matches!(
            entry.entry_type,
            EntryType::CustomerPayment | EntryType::VendorPayment
        );
        if entry.party_id.is_none() || entry.transaction_id.is_some() || !is_payment {
            return Err(LedgerError::NotAnAdvance(id));
        }
        entry.transaction_id = Some(document_id);
        Ok(entry.debit.max(entry.credit))
    }

    // ========== Reconciliation oracle ==========

    /// Recomputes every account and party balance from scratch and checks
    /// the result against the incremental caches.
    ///
    /// The caches are maintained inside the same append that stores each
    /// leg, so this should never return false; it exists as the
    /// reconciliation oracle for tests and integrity checks.
    #[must_use]
    pub fn verify_balances(&self) -> bool {
        let mut accounts: BTreeMap<AccountId, Decimal> = self
            .accounts
            .values()
            .map(|a| (a.id, a.opening_balance))
            .collect();
        let mut parties: BTreeMap<PartyId, Decimal> = BTreeMap::new();

        for entry in &self.entries {
            if let Some(account_id) = entry.account_id {
                *accounts.entry(account_id).or_insert(Decimal::ZERO) += entry.signed_amount();
            }
            if let Some(party_id) = entry.party_id {
                *parties.entry(party_id).or_insert(Decimal::ZERO) += entry.signed_amount();
            }
        }

        let cached_parties: BTreeMap<PartyId, Decimal> = self
            .party_nets
            .iter()
            .filter(|(_, net)| **net != Decimal::ZERO)
            .map(|(id, net)| (*id, *net))
            .collect();
        parties.retain(|_, net| *net != Decimal::ZERO);

        accounts == self.account_balances && parties == cached_parties
    }
}
