//! PostgreSQL implementation of SubscriptionRepository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{SubscriptionRecord, SubscriptionStatus};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::SubscriptionRepository;

/// Subscription store backed by the `subscriptions` table.
///
/// The vendor subscription id is the primary key; upserts replace every
/// column so replays are idempotent.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: String,
    user_id: Uuid,
    status: String,
    price_id: Option<String>,
    quantity: i64,
    cancel_at_period_end: bool,
    cancel_at: Option<DateTime<Utc>>,
    canceled_at: Option<DateTime<Utc>>,
    current_period_start: DateTime<Utc>,
    current_period_end: DateTime<Utc>,
    created: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    trial_start: Option<DateTime<Utc>>,
    trial_end: Option<DateTime<Utc>>,
    metadata: Json<HashMap<String, String>>,
}

impl TryFrom<SubscriptionRow> for SubscriptionRecord {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let status = SubscriptionStatus::from_vendor(&row.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid status value: {}", row.status),
            )
        })?;

        Ok(SubscriptionRecord {
            id: row.id,
            user_id: UserId::new(row.user_id.to_string()).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            status,
            price_id: row.price_id,
            quantity: row.quantity,
            cancel_at_period_end: row.cancel_at_period_end,
            cancel_at: row.cancel_at.map(Timestamp::from_datetime),
            canceled_at: row.canceled_at.map(Timestamp::from_datetime),
            current_period_start: Timestamp::from_datetime(row.current_period_start),
            current_period_end: Timestamp::from_datetime(row.current_period_end),
            created: Timestamp::from_datetime(row.created),
            ended_at: row.ended_at.map(Timestamp::from_datetime),
            trial_start: row.trial_start.map(Timestamp::from_datetime),
            trial_end: row.trial_end.map(Timestamp::from_datetime),
            metadata: row.metadata.0,
        })
    }
}

fn parse_user_id_as_uuid(user_id: &UserId) -> Result<Uuid, DomainError> {
    Uuid::parse_str(user_id.as_str()).map_err(|e| {
        DomainError::new(
            ErrorCode::ValidationFailed,
            format!("User ID must be a valid UUID: {}", e),
        )
    })
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn upsert(&self, record: &SubscriptionRecord) -> Result<(), DomainError> {
        let user_uuid = parse_user_id_as_uuid(&record.user_id)?;

        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, status, price_id, quantity, cancel_at_period_end,
                cancel_at, canceled_at, current_period_start, current_period_end,
                created, ended_at, trial_start, trial_end, metadata, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, NOW())
            ON CONFLICT (id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                status = EXCLUDED.status,
                price_id = EXCLUDED.price_id,
                quantity = EXCLUDED.quantity,
                cancel_at_period_end = EXCLUDED.cancel_at_period_end,
                cancel_at = EXCLUDED.cancel_at,
                canceled_at = EXCLUDED.canceled_at,
                current_period_start = EXCLUDED.current_period_start,
                current_period_end = EXCLUDED.current_period_end,
                created = EXCLUDED.created,
                ended_at = EXCLUDED.ended_at,
                trial_start = EXCLUDED.trial_start,
                trial_end = EXCLUDED.trial_end,
                metadata = EXCLUDED.metadata,
                updated_at = NOW()
            "#,
        )
        .bind(&record.id)
        .bind(user_uuid)
        .bind(record.status.as_str())
        .bind(&record.price_id)
        .bind(record.quantity)
        .bind(record.cancel_at_period_end)
        .bind(record.cancel_at.map(|t| *t.as_datetime()))
        .bind(record.canceled_at.map(|t| *t.as_datetime()))
        .bind(record.current_period_start.as_datetime())
        .bind(record.current_period_end.as_datetime())
        .bind(record.created.as_datetime())
        .bind(record.ended_at.map(|t| *t.as_datetime()))
        .bind(record.trial_start.map(|t| *t.as_datetime()))
        .bind(record.trial_end.map(|t| *t.as_datetime()))
        .bind(Json(&record.metadata))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to upsert subscription: {}", e),
            )
        })?;

        Ok(())
    }

    async fn find_latest_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let user_uuid = parse_user_id_as_uuid(user_id)?;

        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, status, price_id, quantity, cancel_at_period_end,
                   cancel_at, canceled_at, current_period_start, current_period_end,
                   created, ended_at, trial_start, trial_end, metadata
            FROM subscriptions
            WHERE user_id = $1
            ORDER BY created DESC
            LIMIT 1
            "#,
        )
        .bind(user_uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to query subscription: {}", e),
            )
        })?;

        row.map(SubscriptionRecord::try_from).transpose()
    }
}
