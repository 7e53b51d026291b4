use sqlx::SqliteConnection;

use crate::db_types::{NewProduct, Product, ProductStatus};

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO products (vendor_id, title, description, price, download_limit)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(product.vendor_id)
    .bind(product.title)
    .bind(product.description)
    .bind(product.price.value())
    .bind(product.download_limit)
    .fetch_one(conn)
    .await
}

pub async fn product_by_id(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await
}

/// Fetches a product only if it can currently be bought (Active and approved).
pub async fn purchasable_product(
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE id = $1 AND status = 'Active' AND approved = 1")
        .bind(product_id)
        .fetch_optional(conn)
        .await
}

pub async fn active_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE status = 'Active' AND approved = 1 ORDER BY created_at DESC")
        .fetch_all(conn)
        .await
}

pub async fn products_for_vendor(vendor_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE vendor_id = $1 ORDER BY created_at DESC")
        .bind(vendor_id)
        .fetch_all(conn)
        .await
}

pub async fn set_approved(
    product_id: i64,
    approved: bool,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("UPDATE products SET approved = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
        .bind(approved)
        .bind(product_id)
        .fetch_optional(conn)
        .await
}

pub async fn set_status(
    product_id: i64,
    status: ProductStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("UPDATE products SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
        .bind(status.to_string())
        .bind(product_id)
        .fetch_optional(conn)
        .await
}

pub async fn incr_sold_count(product_id: i64, by: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE products SET sold_count = sold_count + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
        .bind(by)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}
