//! Entry store for `billing_transactions`.
//!
//! Pure storage for ledger entries: inserts, point lookups, filtered listing,
//! metadata patches and per-type sums. It holds no ledger invariants; the
//! [`LedgerRepository`](super::LedgerRepository) owns those.

use std::time::Duration;

use chrono::Utc;
use creditline_core::ledger::{
    EntryFilter, EntryType, LedgerEntry, LedgerError, Metadata, NewLedgerEntry, TimeRange,
};
use creditline_shared::LedgerSettings;
use creditline_shared::types::{AccountId, LedgerEntryId, UserId};
use sea_orm::prelude::Json;
use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};

use super::{StatementError, bounded, is_serialization_failure};
use crate::entities::billing_transactions;
use crate::entities::sea_orm_active_enums::EntryKind;

/// Column named by a uniqueness violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryColumn {
    /// The entry ID (primary key).
    Id,
    /// A constraint the store does not recognise.
    Unknown,
}

impl EntryColumn {
    fn from_violation(message: &str) -> Self {
        if message.contains("billing_transactions_pkey") || message.contains("billing_transactions.id")
        {
            Self::Id
        } else {
            Self::Unknown
        }
    }
}

/// Error types for entry store operations.
#[derive(Debug, thiserror::Error)]
pub enum EntryStoreError {
    /// An insert collided with an existing row.
    #[error("Unique violation on {column:?} for entry {id}")]
    UniqueViolation {
        /// The violated column.
        column: EntryColumn,
        /// ID of the entry being inserted.
        id: LedgerEntryId,
    },

    /// Entry not found.
    #[error("Ledger entry not found: {0}")]
    NotFound(LedgerEntryId),

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

impl StatementError for EntryStoreError {
    fn timed_out(operation: &'static str) -> Self {
        Self::Timeout { operation }
    }
}

impl From<EntryStoreError> for LedgerError {
    fn from(err: EntryStoreError) -> Self {
        match err {
            EntryStoreError::UniqueViolation {
                column: EntryColumn::Id,
                id,
            } => Self::AlreadyApplied(id),
            EntryStoreError::NotFound(id) => Self::EntryNotFound(id),
            EntryStoreError::Timeout { operation } => Self::Timeout { operation },
            EntryStoreError::Database(ref db_err) if is_serialization_failure(db_err) => {
                Self::ConcurrentModification
            }
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Entry store backed by `SeaORM`.
#[derive(Debug, Clone)]
pub struct LedgerEntryRepository {
    db: DatabaseConnection,
    statement_timeout: Duration,
}

impl LedgerEntryRepository {
    /// Creates a new entry repository with the default statement bound.
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

    /// Inserts one entry through `conn`, which may be an open transaction.
    ///
    /// A missing ID is generated. Absent metadata is stored as an empty object.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the ID already exists.
    pub async fn insert<C: ConnectionTrait>(
        &self,
        conn: &C,
        entry: NewLedgerEntry,
        entry_type: EntryType,
    ) -> Result<LedgerEntry, EntryStoreError> {
        let id = entry.id.unwrap_or_else(LedgerEntryId::new);
        let now = Utc::now().into();

        let model = billing_transactions::ActiveModel {
            id: Set(id.into_inner()),
            account_id: Set(entry.account_id.into_inner()),
            amount: Set(entry.amount),
            entry_type: Set(EntryKind::from(entry_type)),
            source: Set(entry.source),
            description: Set(entry.description),
            user_id: Set(entry.user_id.map(UserId::into_inner)),
            metadata: Set(Some(Json::Object(entry.metadata.unwrap_or_default()))),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = bounded::<_, EntryStoreError, _>(
            self.statement_timeout,
            "insert entry",
            model.insert(conn),
        )
        .await;

        match inserted {
            Ok(inserted) => Ok(inserted.into()),
            Err(EntryStoreError::Database(err)) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(message)) => {
                    Err(EntryStoreError::UniqueViolation {
                        column: EntryColumn::from_violation(&message),
                        id,
                    })
                }
                _ => Err(EntryStoreError::Database(err)),
            },
            Err(other) => Err(other),
        }
    }

    /// Gets an entry by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no entry has this ID.
    pub async fn get_by_id(&self, id: LedgerEntryId) -> Result<LedgerEntry, EntryStoreError> {
        let model = bounded::<_, EntryStoreError, _>(
            self.statement_timeout,
            "get entry",
            billing_transactions::Entity::find_by_id(id.into_inner()).one(&self.db),
        )
        .await?
        .ok_or(EntryStoreError::NotFound(id))?;

        Ok(model.into())
    }

    /// Lists entries matching the filter, newest first. Time bounds are inclusive.
    pub async fn list(&self, filter: EntryFilter) -> Result<Vec<LedgerEntry>, EntryStoreError> {
        let mut query = billing_transactions::Entity::find();

        if let Some(account_id) = filter.account_id {
            query = query.filter(billing_transactions::Column::AccountId.eq(account_id.into_inner()));
        }
        if let Some(start) = filter.start {
            query = query.filter(billing_transactions::Column::CreatedAt.gte(start));
        }
        if let Some(end) = filter.end {
            query = query.filter(billing_transactions::Column::CreatedAt.lte(end));
        }

        let models = bounded::<_, EntryStoreError, _>(
            self.statement_timeout,
            "list entries",
            query
                .order_by_desc(billing_transactions::Column::CreatedAt)
                .order_by_desc(billing_transactions::Column::Id)
                .all(&self.db),
        )
        .await?;

        Ok(models.into_iter().map(LedgerEntry::from).collect())
    }

    /// Replaces an entry's metadata and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no entry has this ID.
    pub async fn update_metadata(
        &self,
        id: LedgerEntryId,
        metadata: Metadata,
    ) -> Result<LedgerEntry, EntryStoreError> {
        let existing = bounded::<_, EntryStoreError, _>(
            self.statement_timeout,
            "get entry",
            billing_transactions::Entity::find_by_id(id.into_inner()).one(&self.db),
        )
        .await?
        .ok_or(EntryStoreError::NotFound(id))?;

        let mut active: billing_transactions::ActiveModel = existing.into();
        active.metadata = Set(Some(Json::Object(metadata)));
        active.updated_at = Set(Utc::now().into());

        let updated = bounded::<_, EntryStoreError, _>(
            self.statement_timeout,
            "update entry metadata",
            active.update(&self.db),
        )
        .await?;

        Ok(updated.into())
    }

    /// Sums the amounts of one entry type for an account through `conn`.
    ///
    /// With a range, only entries with `start <= created_at < end` count.
    /// No matching rows sums to zero.
    pub async fn sum_by_type<C: ConnectionTrait>(
        &self,
        conn: &C,
        account_id: AccountId,
        entry_type: EntryType,
        range: Option<TimeRange>,
    ) -> Result<i64, EntryStoreError> {
        let total = SimpleExpr::from(Func::cast_as(
            Func::sum(Expr::col(billing_transactions::Column::Amount)),
            Alias::new("BIGINT"),
        ));

        let mut query = billing_transactions::Entity::find()
            .select_only()
            .column_as(total, "total")
            .filter(billing_transactions::Column::AccountId.eq(account_id.into_inner()))
            .filter(billing_transactions::Column::EntryType.eq(EntryKind::from(entry_type)));

        if let Some(range) = range {
            query = query
                .filter(billing_transactions::Column::CreatedAt.gte(range.start))
                .filter(billing_transactions::Column::CreatedAt.lt(range.end));
        }

        let sum: Option<Option<i64>> = bounded::<_, EntryStoreError, _>(
            self.statement_timeout,
            "sum entries",
            query.into_tuple::<Option<i64>>().one(conn),
        )
        .await?;

        Ok(sum.flatten().unwrap_or(0))
    }
}

impl From<billing_transactions::Model> for LedgerEntry {
    fn from(model: billing_transactions::Model) -> Self {
        let metadata = match model.metadata {
            Some(Json::Object(map)) => map,
            _ => Metadata::new(),
        };

        Self {
            id: LedgerEntryId::from_uuid(model.id),
            account_id: AccountId::from_uuid(model.account_id),
            amount: model.amount,
            entry_type: model.entry_type.into(),
            source: model.source,
            description: model.description,
            user_id: model.user_id.map(UserId::from_uuid),
            metadata,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
