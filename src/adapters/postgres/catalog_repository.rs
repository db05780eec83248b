//! PostgreSQL implementation of CatalogRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::billing::{PriceRecord, ProductRecord};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::CatalogRepository;

/// Catalog store backed by the `products` and `prices` tables.
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn upsert_product(&self, product: &ProductRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, active, name, description, features, marketing_features,
                image, created, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (id) DO UPDATE SET
                active = EXCLUDED.active,
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                features = EXCLUDED.features,
                marketing_features = EXCLUDED.marketing_features,
                image = EXCLUDED.image,
                created = EXCLUDED.created,
                updated_at = NOW()
            "#,
        )
        .bind(&product.id)
        .bind(product.active)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.features)
        .bind(&product.marketing_features)
        .bind(&product.image)
        .bind(product.created.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to upsert product", e))?;

        Ok(())
    }

    async fn deactivate_product(&self, product_id: &str) -> Result<(), DomainError> {
        sqlx::query("UPDATE products SET active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to deactivate product", e))?;

        Ok(())
    }

    async fn upsert_price(&self, price: &PriceRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO prices (
                id, product_id, active, currency, pricing_type, unit_amount,
                billing_interval, interval_count, trial_period_days, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            ON CONFLICT (id) DO UPDATE SET
                product_id = EXCLUDED.product_id,
                active = EXCLUDED.active,
                currency = EXCLUDED.currency,
                pricing_type = EXCLUDED.pricing_type,
                unit_amount = EXCLUDED.unit_amount,
                billing_interval = EXCLUDED.billing_interval,
                interval_count = EXCLUDED.interval_count,
                trial_period_days = EXCLUDED.trial_period_days,
                updated_at = NOW()
            "#,
        )
        .bind(&price.id)
        .bind(&price.product_id)
        .bind(price.active)
        .bind(price.currency.as_str())
        .bind(price.pricing_type.as_str())
        .bind(price.unit_amount)
        .bind(price.interval.map(|i| i.as_str()))
        .bind(price.interval_count)
        .bind(price.trial_period_days)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to upsert price", e))?;

        Ok(())
    }

    async fn deactivate_price(&self, price_id: &str) -> Result<(), DomainError> {
        sqlx::query("UPDATE prices SET active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(price_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to deactivate price", e))?;

        Ok(())
    }
}
