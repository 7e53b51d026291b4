use crate::{
    db_types::{NewProduct, NewReview, Product, ProductStatus, Review},
    traits::{CatalogApiError, CatalogManagement},
};

/// The product catalog and reviews.
#[derive(Debug, Clone)]
pub struct CatalogApi<B> {
    db: B,
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogApiError> {
        self.db.create_product(product).await
    }

    pub async fn product(&self, product_id: i64) -> Result<Option<Product>, CatalogApiError> {
        self.db.fetch_product(product_id).await
    }

    pub async fn active_products(&self) -> Result<Vec<Product>, CatalogApiError> {
        self.db.fetch_active_products().await
    }

    pub async fn products_for_vendor(&self, vendor_id: i64) -> Result<Vec<Product>, CatalogApiError> {
        self.db.fetch_products_for_vendor(vendor_id).await
    }

    pub async fn approve_product(&self, product_id: i64) -> Result<Product, CatalogApiError> {
        self.db.approve_product(product_id).await
    }

    pub async fn set_product_status(&self, product_id: i64, status: ProductStatus) -> Result<Product, CatalogApiError> {
        self.db.set_product_status(product_id, status).await
    }

    pub async fn create_review(&self, review: NewReview) -> Result<Review, CatalogApiError> {
        self.db.create_review(review).await
    }

    pub async fn reviews_for_product(&self, product_id: i64) -> Result<Vec<Review>, CatalogApiError> {
        self.db.fetch_reviews_for_product(product_id).await
    }
}
