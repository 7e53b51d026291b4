use sqlx::SqliteConnection;

use crate::{
    db_types::{NewReview, Review},
    traits::CatalogApiError,
};

pub async fn insert_review(review: NewReview, conn: &mut SqliteConnection) -> Result<Review, CatalogApiError> {
    let result = sqlx::query_as(
        r#"
            INSERT INTO reviews (product_id, user_id, order_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(review.product_id)
    .bind(review.user_id)
    .bind(review.order_id)
    .bind(review.rating)
    .bind(review.comment)
    .fetch_one(conn)
    .await;
    match result {
        Ok(review) => Ok(review),
        Err(e) if super::is_unique_violation(&e, "reviews.order_id") => Err(CatalogApiError::DuplicateReview),
        Err(e) => Err(e.into()),
    }
}

pub async fn reviews_for_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Review>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM reviews WHERE product_id = $1 ORDER BY created_at DESC")
        .bind(product_id)
        .fetch_all(conn)
        .await
}

/// True when the user has a delivered order containing the product, which is the
/// precondition for leaving a review.
pub async fn user_purchased_product(
    user_id: i64,
    product_id: i64,
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        r#"
            SELECT COUNT(*) FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.id = $1 AND o.user_id = $2 AND oi.product_id = $3 AND o.status = 'Delivered';
        "#,
    )
    .bind(order_id)
    .bind(user_id)
    .bind(product_id)
    .fetch_one(conn)
    .await?;
    Ok(row.0 > 0)
}
