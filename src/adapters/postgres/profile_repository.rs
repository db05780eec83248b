//! PostgreSQL implementation of ProfileRepository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{Profile, SubscriptionMirror, SubscriptionStatus};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{BillableProfile, MirrorOutcome, ProfileRepository};

/// Profile store backed by the `profiles` table.
///
/// Profiles are created by the account signup flow, not here; this
/// repository only reads them and maintains the subscription mirror
/// columns.
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    email: Option<String>,
    display_name: Option<String>,
    avatar_url: Option<String>,
    stripe_customer_id: Option<String>,
    subscription_status: Option<String>,
    subscription_price_id: Option<String>,
    subscription_id: Option<String>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = DomainError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let subscription_status = row
            .subscription_status
            .as_deref()
            .map(|s| {
                SubscriptionStatus::from_vendor(s).ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Invalid status value: {}", s),
                    )
                })
            })
            .transpose()?;

        Ok(Profile {
            id: UserId::new(row.id.to_string()).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            email: row.email,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            stripe_customer_id: row.stripe_customer_id,
            subscription_status,
            subscription_price_id: row.subscription_price_id,
            subscription_id: row.subscription_id,
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
impl ProfileRepository for PostgresProfileRepository {
    async fn apply_mirror(
        &self,
        user_id: &UserId,
        mirror: &SubscriptionMirror,
        customer_id: Option<&str>,
    ) -> Result<MirrorOutcome, DomainError> {
        let user_uuid = parse_user_id_as_uuid(user_id)?;

        // COALESCE keeps an existing customer id when no backfill is given.
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET subscription_status = $2,
                subscription_price_id = $3,
                subscription_id = $4,
                stripe_customer_id = COALESCE($5, stripe_customer_id),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_uuid)
        .bind(mirror.status.as_str())
        .bind(&mirror.price_id)
        .bind(&mirror.subscription_id)
        .bind(customer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update profile mirror: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            Ok(MirrorOutcome::ProfileMissing)
        } else {
            Ok(MirrorOutcome::Applied)
        }
    }

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<Profile>, DomainError> {
        let user_uuid = parse_user_id_as_uuid(user_id)?;

        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, email, display_name, avatar_url, stripe_customer_id,
                   subscription_status, subscription_price_id, subscription_id
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(user_uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to query profile: {}", e),
            )
        })?;

        row.map(Profile::try_from).transpose()
    }

    async fn list_billable(&self) -> Result<Vec<BillableProfile>, DomainError> {
        let rows: Vec<(Uuid, String)> = sqlx::query_as(
            r#"
            SELECT id, stripe_customer_id
            FROM profiles
            WHERE stripe_customer_id IS NOT NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list billable profiles: {}", e),
            )
        })?;

        rows.into_iter()
            .map(|(id, customer_id)| {
                Ok(BillableProfile {
                    user_id: UserId::new(id.to_string()).map_err(|e| {
                        DomainError::new(
                            ErrorCode::DatabaseError,
                            format!("Invalid user_id: {}", e),
                        )
                    })?,
                    stripe_customer_id: customer_id,
                })
            })
            .collect()
    }
}
