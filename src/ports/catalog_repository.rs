//! Port for the mirrored product catalog.

use async_trait::async_trait;

use crate::domain::billing::{PriceRecord, ProductRecord};
use crate::domain::foundation::DomainError;

/// Persistence boundary for products and prices mirrored from the vendor.
///
/// Deletions are soft: the vendor retires catalog objects rather than
/// destroying them, so we flip `active` and keep the row for any
/// subscriptions still referencing it.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn upsert_product(&self, product: &ProductRecord) -> Result<(), DomainError>;

    /// Marks a product inactive. Missing rows are a no-op.
    async fn deactivate_product(&self, product_id: &str) -> Result<(), DomainError>;

    async fn upsert_price(&self, price: &PriceRecord) -> Result<(), DomainError>;

    /// Marks a price inactive. Missing rows are a no-op.
    async fn deactivate_price(&self, price_id: &str) -> Result<(), DomainError>;
}
