//! Account repository for `billing_accounts`.
//!
//! The ledger only needs one thing from an account: its credit floor. That
//! contract is the [`AccountDirectory`] trait, so a host with its own
//! customer service can supply floors without this table.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use creditline_core::ledger::LedgerError;
use creditline_shared::LedgerSettings;
use creditline_shared::types::AccountId;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};

use super::{StatementError, bounded};
use crate::entities::billing_accounts;

/// Supplies credit floors to the ledger writer.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Returns the account's credit floor.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    async fn get_account_floor(&self, account_id: AccountId) -> Result<i64, LedgerError>;
}

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// Statement exceeded its bound.
    #[error("Operation {operation} timed out")]
    Timeout {
        /// The timed-out operation.
        operation: &'static str,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StatementError for AccountError {
    fn timed_out(operation: &'static str) -> Self {
        Self::Timeout { operation }
    }
}

impl From<AccountError> for LedgerError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(id) => Self::AccountNotFound(id),
            AccountError::Timeout { operation } => Self::Timeout { operation },
            AccountError::Database(db_err) => Self::Storage(db_err.to_string()),
        }
    }
}

/// Input for creating an account.
#[derive(Debug, Clone, Default)]
pub struct CreateAccountInput {
    /// Account ID. Generated when absent.
    pub id: Option<AccountId>,
    /// Display name.
    pub name: String,
    /// Credit floor: negative allows overdraft, positive holds a reserve.
    pub credit_min: i64,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
    statement_timeout: Duration,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            statement_timeout: LedgerSettings::default().statement_timeout,
        }
    }

    /// Overrides the bound applied to every statement.
    #[must_use]
    pub fn with_statement_timeout(mut self, limit: Duration) -> Self {
        self.statement_timeout = limit;
        self
    }

    /// Creates a new account.
    pub async fn create(
        &self,
        input: CreateAccountInput,
    ) -> Result<billing_accounts::Model, AccountError> {
        let now = Utc::now().into();
        let account = billing_accounts::ActiveModel {
            id: Set(input.id.unwrap_or_else(AccountId::new).into_inner()),
            name: Set(input.name),
            credit_min: Set(input.credit_min),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = bounded::<_, AccountError, _>(
            self.statement_timeout,
            "create account",
            account.insert(&self.db),
        )
        .await?;

        tracing::debug!(account_id = %created.id, credit_min = created.credit_min, "Account created");
        Ok(created)
    }

    /// Gets an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist.
    pub async fn get_by_id(&self, id: AccountId) -> Result<billing_accounts::Model, AccountError> {
        bounded::<_, AccountError, _>(
            self.statement_timeout,
            "get account",
            billing_accounts::Entity::find_by_id(id.into_inner()).one(&self.db),
        )
        .await?
        .ok_or(AccountError::NotFound(id))
    }

    /// Changes the account's credit floor.
    ///
    /// Existing entries are untouched; the new floor applies to the next debit.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist.
    pub async fn update_credit_min(
        &self,
        id: AccountId,
        credit_min: i64,
    ) -> Result<billing_accounts::Model, AccountError> {
        let mut account: billing_accounts::ActiveModel = self.get_by_id(id).await?.into();
        account.credit_min = Set(credit_min);
        account.updated_at = Set(Utc::now().into());

        bounded::<_, AccountError, _>(
            self.statement_timeout,
            "update account",
            account.update(&self.db),
        )
        .await
    }
}

#[async_trait]
impl AccountDirectory for AccountRepository {
    async fn get_account_floor(&self, account_id: AccountId) -> Result<i64, LedgerError> {
        let account = self.get_by_id(account_id).await?;
        Ok(account.credit_min)
    }
}
