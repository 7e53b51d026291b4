use ksw_common::Kobo;

use crate::{
    db_types::{NewProduct, NewUser, NewVendor, Product, User, Vendor, VendorStatus},
    traits::{AccountManagement, CatalogManagement},
    SqliteDatabase,
};

pub async fn seed_customer(db: &SqliteDatabase, email: &str) -> User {
    let user = NewUser::new(email, format!("Customer <{email}>"), "$argon2id$not-a-real-hash");
    db.create_user(user).await.expect("Error seeding customer")
}

/// Seeds a user with an approved vendor profile (and therefore a wallet).
pub async fn seed_vendor(db: &SqliteDatabase, email: &str, business_name: &str) -> (User, Vendor) {
    let user = seed_customer(db, email).await;
    let vendor = db
        .register_vendor(NewVendor { user_id: user.id, business_name: business_name.to_string() })
        .await
        .expect("Error seeding vendor");
    let vendor = db.update_vendor_status(vendor.id, VendorStatus::Approved).await.expect("Error approving vendor");
    (user, vendor)
}

/// Seeds a purchasable product (listed and admin-approved) for the vendor.
pub async fn seed_approved_product(db: &SqliteDatabase, vendor_id: i64, title: &str, price: i64) -> Product {
    let product = db
        .create_product(NewProduct::new(vendor_id, title, Kobo::from(price)))
        .await
        .expect("Error seeding product");
    db.approve_product(product.id).await.expect("Error approving product")
}
