use thiserror::Error;

use crate::db_types::{NewProduct, NewReview, Product, ProductStatus, Review};

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The requested product {0} does not exist")]
    ProductNotFound(i64),
    #[error("The requested vendor {0} does not exist")]
    VendorNotFound(i64),
    #[error("Ratings must be between 1 and 5, got {0}")]
    InvalidRating(i64),
    #[error("Reviews are only allowed for products bought in a paid order")]
    ReviewNotAllowed,
    #[error("This order item has already been reviewed")]
    DuplicateReview,
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Stores a new product. Products start out unapproved and need an admin's approval
    /// before they can be purchased.
    async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogApiError>;

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogApiError>;

    /// All purchasable products (Active and approved).
    async fn fetch_active_products(&self) -> Result<Vec<Product>, CatalogApiError>;

    async fn fetch_products_for_vendor(&self, vendor_id: i64) -> Result<Vec<Product>, CatalogApiError>;

    async fn approve_product(&self, product_id: i64) -> Result<Product, CatalogApiError>;

    async fn set_product_status(&self, product_id: i64, status: ProductStatus) -> Result<Product, CatalogApiError>;

    /// Stores a review. The reviewer must own a paid order that contains the product, and
    /// may review each (order, product) pair once.
    async fn create_review(&self, review: NewReview) -> Result<Review, CatalogApiError>;

    async fn fetch_reviews_for_product(&self, product_id: i64) -> Result<Vec<Review>, CatalogApiError>;
}
