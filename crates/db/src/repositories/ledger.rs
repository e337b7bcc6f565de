//! Ledger writer: atomic, floor-checked, idempotent entry pairs.
//!
//! Every pair is written in one SERIALIZABLE transaction that first re-reads
//! the debited account's balance, so two writers racing on the same account
//! cannot both pass the sufficiency check. The loser's serialization failure
//! is retried with backoff in a fresh transaction.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use creditline_core::ledger::{
    AccountBalance, Credit, CreditService, EntryFilter, EntryPair, EntryType, LedgerEntry,
    LedgerError, Metadata, TimeRange, check_sufficiency, total_debited, validate_pair,
};
use creditline_shared::LedgerSettings;
use creditline_shared::types::{AccountId, LedgerEntryId};
use rand::Rng;
use sea_orm::{AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait};
use tracing::{debug, error, info, warn};

use super::account::AccountDirectory;
use super::balance::BalanceCalculator;
use super::bounded;
use super::entry::{EntryStoreError, LedgerEntryRepository};

/// Ledger repository orchestrating balance checks and pair writes.
#[derive(Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
    entries: LedgerEntryRepository,
    balances: BalanceCalculator,
    accounts: Arc<dyn AccountDirectory>,
    settings: LedgerSettings,
}

impl LedgerRepository {
    /// Creates a ledger repository with default settings.
    #[must_use]
    pub fn new(db: DatabaseConnection, accounts: Arc<dyn AccountDirectory>) -> Self {
        Self::with_settings(db, accounts, LedgerSettings::default())
    }

    /// Creates a ledger repository with explicit timeout and retry settings.
    #[must_use]
    pub fn with_settings(
        db: DatabaseConnection,
        accounts: Arc<dyn AccountDirectory>,
        settings: LedgerSettings,
    ) -> Self {
        let entries =
            LedgerEntryRepository::new(db.clone()).with_statement_timeout(settings.statement_timeout);
        let balances = BalanceCalculator::new(entries.clone());

        Self {
            db,
            entries,
            balances,
            accounts,
            settings,
        }
    }

    /// Overrides the bound applied to every statement.
    #[must_use]
    pub fn with_statement_timeout(self, limit: Duration) -> Self {
        let settings = LedgerSettings {
            statement_timeout: limit,
            ..self.settings
        };
        Self::with_settings(self.db, self.accounts, settings)
    }

    /// Returns the underlying entry store.
    #[must_use]
    pub fn entries(&self) -> &LedgerEntryRepository {
        &self.entries
    }

    /// Writes a debit/credit pair atomically.
    ///
    /// When the debited account is not the platform account, its floor is
    /// resolved first and the balance is checked inside the write transaction.
    ///
    /// # Errors
    ///
    /// - Validation errors before anything is opened
    /// - `AccountNotFound` if the debited account has no floor
    /// - `InsufficientCredits` if the debit would cross the floor
    /// - `AlreadyApplied` if either side's ID already exists
    /// - `ConcurrentModification` once the retry budget is spent
    pub async fn create_entry(
        &self,
        pair: EntryPair,
    ) -> Result<(LedgerEntry, LedgerEntry), LedgerError> {
        validate_pair(&pair)?;

        let floor = if pair.debits_customer() {
            Some(self.accounts.get_account_floor(pair.debit.account_id).await?)
        } else {
            None
        };
        let pair = pair.with_default_metadata();

        let result = self
            .with_retry("create entry", || self.create_entry_once(&pair, floor))
            .await;

        match &result {
            Ok((debit, credit)) => debug!(
                debit_account = %debit.account_id,
                credit_account = %credit.account_id,
                amount = debit.amount,
                "Ledger entry pair committed"
            ),
            Err(LedgerError::AlreadyApplied(id)) => {
                info!(entry_id = %id, "Ledger entry pair already applied");
            }
            Err(LedgerError::InsufficientCredits {
                account_id,
                balance,
                amount,
                floor,
            }) => info!(
                account_id = %account_id,
                balance,
                amount,
                floor,
                "Debit rejected by credit floor"
            ),
            Err(LedgerError::Storage(message)) => {
                error!(error = %message, "Ledger entry pair failed");
            }
            Err(_) => {}
        }

        result
    }

    async fn create_entry_once(
        &self,
        pair: &EntryPair,
        floor: Option<i64>,
    ) -> Result<(LedgerEntry, LedgerEntry), LedgerError> {
        let txn = self.begin(AccessMode::ReadWrite).await?;
        let outcome = self.write_pair(&txn, pair, floor).await;
        self.finish(txn, outcome).await
    }

    async fn write_pair(
        &self,
        txn: &DatabaseTransaction,
        pair: &EntryPair,
        floor: Option<i64>,
    ) -> Result<(LedgerEntry, LedgerEntry), LedgerError> {
        if let Some(floor) = floor {
            let balance = self
                .balances
                .balance_in_scope(txn, pair.debit.account_id, None)
                .await?
                .balance();
            check_sufficiency(pair.debit.account_id, floor, balance, pair.debit.amount)?;
        }

        let debit = self
            .entries
            .insert(txn, pair.debit.clone(), EntryType::Debit)
            .await?;
        let credit = self
            .entries
            .insert(txn, pair.credit.clone(), EntryType::Credit)
            .await?;

        Ok((debit, credit))
    }

    /// Adds credits: debits the platform account and credits the customer.
    ///
    /// # Errors
    ///
    /// Same as [`create_entry`](Self::create_entry); replaying the same ID yields `AlreadyApplied`.
    pub async fn add_credits(
        &self,
        credit: &Credit,
    ) -> Result<(LedgerEntry, LedgerEntry), LedgerError> {
        let pair = CreditService::prepare_add(credit)?;
        self.create_entry(pair).await
    }

    /// Deducts credits: debits the customer and credits the platform account.
    ///
    /// # Errors
    ///
    /// Same as [`create_entry`](Self::create_entry), including `InsufficientCredits`.
    pub async fn deduct_credits(
        &self,
        credit: &Credit,
    ) -> Result<(LedgerEntry, LedgerEntry), LedgerError> {
        let pair = CreditService::prepare_deduct(credit)?;
        self.create_entry(pair).await
    }

    /// Returns the account's current balance.
    pub async fn get_balance(&self, account_id: AccountId) -> Result<i64, LedgerError> {
        let totals = self
            .with_retry("get balance", || self.read_balance_once(account_id, None))
            .await?;
        Ok(totals.balance())
    }

    /// Returns the balance over entries created in `[start, end)`.
    pub async fn get_balance_for_range(
        &self,
        account_id: AccountId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, LedgerError> {
        let range = Some(TimeRange::new(start, end));
        let totals = self
            .with_retry("get balance for range", || {
                self.read_balance_once(account_id, range)
            })
            .await?;
        Ok(totals.balance())
    }

    async fn read_balance_once(
        &self,
        account_id: AccountId,
        range: Option<TimeRange>,
    ) -> Result<AccountBalance, LedgerError> {
        let txn = self.begin(AccessMode::ReadOnly).await?;
        let outcome = self
            .balances
            .balance_in_scope(&txn, account_id, range)
            .await
            .map_err(LedgerError::from);
        self.finish(txn, outcome).await
    }

    /// Returns everything the account has spent, net of reverted debits.
    pub async fn get_total_debited_amount(&self, account_id: AccountId) -> Result<i64, LedgerError> {
        let entries = self.list(EntryFilter::for_account(account_id)).await?;
        Ok(total_debited(&entries))
    }

    /// Lists entries, newest first.
    pub async fn list(&self, filter: EntryFilter) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.entries.list(filter).await?)
    }

    /// Gets an entry by ID.
    pub async fn get_by_id(&self, id: LedgerEntryId) -> Result<LedgerEntry, LedgerError> {
        Ok(self.entries.get_by_id(id).await?)
    }

    /// Replaces an entry's metadata.
    pub async fn update_metadata(
        &self,
        id: LedgerEntryId,
        metadata: Metadata,
    ) -> Result<LedgerEntry, LedgerError> {
        Ok(self.entries.update_metadata(id, metadata).await?)
    }

    async fn begin(&self, mode: AccessMode) -> Result<DatabaseTransaction, LedgerError> {
        let txn = bounded::<_, EntryStoreError, _>(
            self.settings.statement_timeout,
            "begin transaction",
            self.db
                .begin_with_config(Some(IsolationLevel::Serializable), Some(mode)),
        )
        .await?;
        Ok(txn)
    }

    /// Commits on success, rolls back on any error.
    async fn finish<T>(
        &self,
        txn: DatabaseTransaction,
        outcome: Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        match outcome {
            Ok(value) => {
                bounded::<_, EntryStoreError, _>(
                    self.settings.statement_timeout,
                    "commit transaction",
                    txn.commit(),
                )
                .await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = bounded::<_, EntryStoreError, _>(
                    self.settings.statement_timeout,
                    "rollback transaction",
                    txn.rollback(),
                )
                .await
                {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Runs `attempt` until it stops failing with `ConcurrentModification`
    /// or the retry budget is spent.
    async fn with_retry<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt: F,
    ) -> Result<T, LedgerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LedgerError>>,
    {
        let mut retries = 0;
        loop {
            match attempt().await {
                Err(LedgerError::ConcurrentModification) if retries < self.settings.max_retries => {
                    let delay = self.backoff(retries);
                    retries += 1;
                    warn!(
                        operation,
                        attempt = retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Serialization conflict, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    /// `base * 2^retries` plus jitter in `[0, backoff / 2)`.
    fn backoff(&self, retries: u32) -> Duration {
        let backoff = self
            .settings
            .retry_base_delay
            .saturating_mul(2u32.saturating_pow(retries));
        let jitter_cap = u64::try_from((backoff / 2).as_micros()).unwrap_or(u64::MAX);
        if jitter_cap == 0 {
            return backoff;
        }
        backoff.saturating_add(Duration::from_micros(
            rand::rng().random_range(0..jitter_cap),
        ))
    }
}
