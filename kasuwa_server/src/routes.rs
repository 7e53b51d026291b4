//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (I/O, database calls, gateway
//! calls) must be expressed as a future so that worker threads keep serving other requests while it is in flight.
use actix_web::{get, web, HttpResponse, Responder};
use kasuwa_engine::{
    db_types::{
        NewOrder,
        NewOrderItem,
        NewPayment,
        NewProduct,
        NewReview,
        NewUser,
        NewVendor,
        NewWithdrawal,
        Order,
        OrderNumber,
        PaymentStatus,
        ProductStatus,
        Role,
        Vendor,
        VendorStatus,
    },
    helpers::{new_payment_reference, new_refund_reference},
    traits::{
        AccountManagement,
        AuthManagement,
        CatalogManagement,
        NotificationManagement,
        PaymentConfirmation,
        PaymentConfirmationResult,
        PaymentGatewayDatabase,
        WalletManagement,
    },
    AccountApi,
    AuthApi,
    CatalogApi,
    NotificationApi,
    OrderFlowApi,
    WalletApi,
};
use log::*;
use paystack_tools::PaystackApi;
use rand::{distributions::Alphanumeric, Rng};
use serde_json::json;

use crate::{
    auth::{hash_password, verify_password, JwtClaims, TokenIssuer},
    data_objects::{
        CancelOrderRequest,
        CartAddRequest,
        CheckoutRequest,
        InitiatePaymentRequest,
        JsonResponse,
        LoginRequest,
        LoginResponse,
        NewProductRequest,
        NotificationFilter,
        ProductStatusRequest,
        RegisterUserRequest,
        RegisterVendorRequest,
        ReviewRequest,
        RoleUpdateRequest,
        SettleWithdrawalRequest,
        VendorStatusRequest,
        WithdrawalRequest,
    },
    errors::{AuthError, ServerError},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal requires [$($roles:ty),*]) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
                impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name)
                        .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:ty),*])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)* 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Accounts  ----------------------------------------------------
route!(register => Post "/register" impl AccountManagement);
/// Creates a customer account. The password is hashed with Argon2id before it is stored; the
/// plaintext never leaves this handler.
pub async fn register<B: AccountManagement>(
    body: web::Json<RegisterUserRequest>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(ServerError::InvalidRequestBody("A valid email address is required".to_string()));
    }
    if req.password.len() < 8 {
        return Err(ServerError::InvalidRequestBody("Passwords must be at least 8 characters long".to_string()));
    }
    let hash = hash_password(&req.password)?;
    let user = api.register_user(NewUser::new(req.email.trim().to_lowercase(), req.display_name, hash)).await?;
    debug!("💻️ Registered new user {} ({})", user.id, user.email);
    Ok(HttpResponse::Ok().json(user))
}

route!(login => Post "/login" impl AccountManagement);
/// Exchanges an email/password pair for an access token. Lookup failure and password failure
/// return the same error, so the endpoint does not reveal which emails have accounts.
pub async fn login<B: AccountManagement>(
    body: web::Json<LoginRequest>,
    api: web::Data<AccountApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    let user = api
        .user_by_email(&req.email.trim().to_lowercase())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(&req.password, &user.password_hash) {
        debug!("💻️ Failed login attempt for {}", user.email);
        return Err(AuthError::InvalidCredentials.into());
    }
    let token = signer.issue_token(&user)?;
    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

route!(check_token => Get "/check_token" requires [Role::Customer]);
pub async fn check_token(claims: JwtClaims) -> Result<HttpResponse, ServerError> {
    debug!("💻️ Checking token for {}", claims.email);
    Ok(HttpResponse::Ok().json(claims))
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(products => Get "/products" impl CatalogManagement);
/// The public storefront: every active, approved product.
pub async fn products<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    let products = api.active_products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product => Get "/products/{id}" impl CatalogManagement);
pub async fn product<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let product =
        api.product(id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Product {id} does not exist")))?;
    Ok(HttpResponse::Ok().json(product))
}

route!(product_reviews => Get "/products/{id}/reviews" impl CatalogManagement);
pub async fn product_reviews<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let reviews = api.reviews_for_product(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

route!(create_review => Post "/reviews" impl CatalogManagement where requires [Role::Customer]);
pub async fn create_review<A>(
    claims: JwtClaims,
    body: web::Json<ReviewRequest>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: CatalogManagement,
{
    let req = body.into_inner();
    let review = NewReview {
        product_id: req.product_id,
        user_id: claims.sub,
        order_id: req.order_id,
        rating: req.rating,
        comment: req.comment,
    };
    let review = api.create_review(review).await?;
    debug!("💻️ User {} reviewed product {}", claims.sub, review.product_id);
    Ok(HttpResponse::Ok().json(review))
}

//----------------------------------------------   Cart  ----------------------------------------------------
route!(my_cart => Get "/cart" impl AccountManagement where requires [Role::Customer]);
pub async fn my_cart<A>(claims: JwtClaims, api: web::Data<AccountApi<A>>) -> Result<HttpResponse, ServerError>
where A: AccountManagement {
    let cart = api.cart(claims.sub).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(add_to_cart => Post "/cart" impl AccountManagement where requires [Role::Customer]);
pub async fn add_to_cart<A>(
    claims: JwtClaims,
    body: web::Json<CartAddRequest>,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: AccountManagement,
{
    let req = body.into_inner();
    let item = api.add_to_cart(claims.sub, req.product_id, req.quantity).await?;
    Ok(HttpResponse::Ok().json(item))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(checkout => Post "/orders" impl PaymentGatewayDatabase, AccountManagement where requires [Role::Customer]);
/// Creates an order, either from the explicit line items in the request or, when they are
/// absent, from the user's cart. Pricing always comes from live product reads on the backend.
pub async fn checkout<A>(
    claims: JwtClaims,
    body: web::Json<CheckoutRequest>,
    orders: web::Data<OrderFlowApi<A>>,
    accounts: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: PaymentGatewayDatabase + AccountManagement,
{
    let req = body.into_inner();
    let items = match req.items {
        Some(items) => items,
        None => accounts
            .cart(claims.sub)
            .await?
            .into_iter()
            .map(|c| NewOrderItem { product_id: c.product_id, quantity: c.quantity })
            .collect(),
    };
    let order = NewOrder::new(claims.sub, items, req.shipping_method);
    let (order, items) = orders.create_order(order).await?;
    info!("💻️ Order {} created for user {}", order.order_number, claims.sub);
    Ok(HttpResponse::Ok().json(json!({ "order": order, "items": items })))
}

route!(my_orders => Get "/orders" impl AccountManagement where requires [Role::Customer]);
pub async fn my_orders<A>(claims: JwtClaims, api: web::Data<AccountApi<A>>) -> Result<HttpResponse, ServerError>
where A: AccountManagement {
    let orders = api.orders_for_user(claims.sub).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_number => Get "/orders/{order_number}" impl AccountManagement where requires [Role::Customer]);
pub async fn order_by_number<A>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: AccountManagement,
{
    let order_number = OrderNumber::from(path.into_inner());
    let order = fetch_order_for(&claims, &order_number, api.as_ref()).await?;
    let items = api.order_items(order.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "order": order, "items": items })))
}

route!(cancel_order => Post "/orders/{order_number}/cancel" impl PaymentGatewayDatabase, AccountManagement where requires [Role::Customer]);
pub async fn cancel_order<A>(
    claims: JwtClaims,
    path: web::Path<String>,
    body: Option<web::Json<CancelOrderRequest>>,
    orders: web::Data<OrderFlowApi<A>>,
    accounts: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: PaymentGatewayDatabase + AccountManagement,
{
    let order_number = OrderNumber::from(path.into_inner());
    let _ = fetch_order_for(&claims, &order_number, accounts.as_ref()).await?;
    let reason = body
        .and_then(|b| b.into_inner().reason)
        .unwrap_or_else(|| "Cancelled by buyer".to_string());
    let order = orders.cancel_order(&order_number, &reason).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// Fetches an order, treating other users' orders as nonexistent. Admins can read any order.
async fn fetch_order_for<B: AccountManagement>(
    claims: &JwtClaims,
    order_number: &OrderNumber,
    api: &AccountApi<B>,
) -> Result<Order, ServerError> {
    let order = api
        .order_by_number(order_number)
        .await?
        .filter(|o| o.user_id == claims.sub || claims.has_role(Role::Admin))
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_number} does not exist")))?;
    Ok(order)
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(initiate_payment => Post "/orders/{order_number}/pay" impl PaymentGatewayDatabase, AccountManagement where requires [Role::Customer]);
/// Registers a pending transaction with Paystack and stores the matching `Pending` payment.
/// The response carries the checkout URL the client must redirect the buyer to. Retries with
/// the same idempotency key return the original payment.
pub async fn initiate_payment<A>(
    claims: JwtClaims,
    path: web::Path<String>,
    body: Option<web::Json<InitiatePaymentRequest>>,
    orders: web::Data<OrderFlowApi<A>>,
    accounts: web::Data<AccountApi<A>>,
    paystack: web::Data<PaystackApi>,
) -> Result<HttpResponse, ServerError>
where
    A: PaymentGatewayDatabase + AccountManagement,
{
    let order_number = OrderNumber::from(path.into_inner());
    let order = fetch_order_for(&claims, &order_number, accounts.as_ref()).await?;
    if !order.is_cancellable() {
        // Pending and Confirmed are the only payable states
        return Err(ServerError::InvalidStateChange(format!(
            "Order {order_number} cannot be paid while it is {}",
            order.status
        )));
    }
    let idempotency_key = body
        .map(|b| b.into_inner())
        .unwrap_or_default()
        .idempotency_key
        .unwrap_or_else(random_idempotency_key);
    // A replayed key answers with the original payment before Paystack hears about it
    if let Some(existing) = accounts.payment_by_idempotency_key(&idempotency_key).await? {
        debug!("💻️ Payment init replayed for order {order_number}. Returning payment {}", existing.reference);
        return Ok(HttpResponse::Ok().json(existing));
    }
    let reference = new_payment_reference();
    let metadata = json!({ "order_number": order.order_number.as_str(), "user_id": claims.sub });
    let init = paystack.initialize_transaction(&claims.email, order.total, &reference, Some(metadata)).await?;
    let payment = orders
        .initialize_payment(NewPayment {
            order_id: order.id,
            reference,
            idempotency_key,
            amount: order.total,
            authorization_url: Some(init.authorization_url),
        })
        .await?;
    info!("💻️ Payment {} initialized for order {}", payment.reference, order_number);
    Ok(HttpResponse::Ok().json(payment))
}

route!(verify_payment => Post "/payments/{reference}/verify" impl PaymentGatewayDatabase where requires [Role::Customer]);
/// Asks Paystack for the authoritative state of a transaction and applies the result. This is
/// the client-driven confirmation path; webhooks race against it and whichever lands first
/// wins, with the loser becoming a no-op.
pub async fn verify_payment<A>(
    path: web::Path<String>,
    orders: web::Data<OrderFlowApi<A>>,
    paystack: web::Data<PaystackApi>,
) -> Result<HttpResponse, ServerError>
where
    A: PaymentGatewayDatabase,
{
    let reference = path.into_inner();
    let data = paystack.verify_transaction(&reference).await?;
    if data.is_successful() {
        let confirmation = PaymentConfirmation {
            channel: data.channel,
            gateway_response: data.gateway_response,
            paid_at: data.paid_at,
        };
        return match orders.confirm_payment(&reference, confirmation).await? {
            PaymentConfirmationResult::Confirmed(settled) => {
                Ok(HttpResponse::Ok().json(json!({ "order": settled.order, "payment": settled.payment })))
            },
            PaymentConfirmationResult::AlreadyFinal(payment) => {
                debug!("💻️ Payment {reference} was already {}", payment.status);
                Ok(HttpResponse::Ok().json(payment))
            },
        };
    }
    if data.status == "failed" {
        let reason = data.gateway_response.unwrap_or_else(|| "Charge failed".to_string());
        let payment = orders.fail_payment(&reference, &reason).await?;
        return Ok(HttpResponse::Ok().json(payment));
    }
    debug!("💻️ Payment {reference} is still {} at the gateway", data.status);
    Ok(HttpResponse::Ok().json(JsonResponse::failure(format!("Payment is still {} at the gateway", data.status))))
}

//----------------------------------------------   Notifications  ----------------------------------------------------
route!(my_notifications => Get "/notifications" impl NotificationManagement where requires [Role::Customer]);
pub async fn my_notifications<A>(
    claims: JwtClaims,
    filter: web::Query<NotificationFilter>,
    api: web::Data<NotificationApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: NotificationManagement,
{
    let notifications = api.notifications_for_user(claims.sub, filter.unread).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

route!(mark_notification_read => Post "/notifications/{id}/read" impl NotificationManagement where requires [Role::Customer]);
pub async fn mark_notification_read<A>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<NotificationApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: NotificationManagement,
{
    let id = path.into_inner();
    let updated = api.mark_read(id, claims.sub).await?;
    if updated == 0 {
        return Err(ServerError::NoRecordFound(format!("Notification {id} does not exist")));
    }
    Ok(HttpResponse::Ok().json(JsonResponse::success("Notification marked as read")))
}

//----------------------------------------------   Vendors  ----------------------------------------------------
route!(register_vendor => Post "/vendor/register" impl AccountManagement where requires [Role::Customer]);
/// Registers the authenticated user as a vendor. The vendor starts in `Pending` status and
/// cannot list products until an admin approves them. The granted vendor role only appears in
/// tokens issued after this call, so clients should log in again.
pub async fn register_vendor<A>(
    claims: JwtClaims,
    body: web::Json<RegisterVendorRequest>,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: AccountManagement,
{
    let business_name = body.into_inner().business_name;
    if business_name.trim().is_empty() {
        return Err(ServerError::InvalidRequestBody("A business name is required".to_string()));
    }
    let vendor = api.register_vendor(NewVendor { user_id: claims.sub, business_name }).await?;
    info!("💻️ User {} registered as vendor {} ({})", claims.sub, vendor.id, vendor.business_name);
    Ok(HttpResponse::Ok().json(vendor))
}

route!(my_vendor_profile => Get "/vendor" impl AccountManagement where requires [Role::Vendor]);
pub async fn my_vendor_profile<A>(claims: JwtClaims, api: web::Data<AccountApi<A>>) -> Result<HttpResponse, ServerError>
where A: AccountManagement {
    let vendor = vendor_for(&claims, api.as_ref()).await?;
    Ok(HttpResponse::Ok().json(vendor))
}

route!(my_products => Get "/vendor/products" impl AccountManagement, CatalogManagement where requires [Role::Vendor]);
pub async fn my_products<A>(
    claims: JwtClaims,
    accounts: web::Data<AccountApi<A>>,
    catalog: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: AccountManagement + CatalogManagement,
{
    let vendor = vendor_for(&claims, accounts.as_ref()).await?;
    let products = catalog.products_for_vendor(vendor.id).await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(create_product => Post "/vendor/products" impl AccountManagement, CatalogManagement where requires [Role::Vendor]);
/// Lists a new product. It stays invisible on the storefront until an admin approves it.
pub async fn create_product<A>(
    claims: JwtClaims,
    body: web::Json<NewProductRequest>,
    accounts: web::Data<AccountApi<A>>,
    catalog: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: AccountManagement + CatalogManagement,
{
    let vendor = vendor_for(&claims, accounts.as_ref()).await?;
    if vendor.status != VendorStatus::Approved {
        return Err(ServerError::InsufficientPermissions(format!(
            "Vendor {} is not approved to sell",
            vendor.business_name
        )));
    }
    let req = body.into_inner();
    let product = NewProduct {
        vendor_id: vendor.id,
        title: req.title,
        description: req.description,
        price: req.price,
        download_limit: req.download_limit.unwrap_or(5),
    };
    let product = catalog.create_product(product).await?;
    info!("💻️ Vendor {} listed product {} ({})", vendor.id, product.id, product.title);
    Ok(HttpResponse::Ok().json(product))
}

async fn vendor_for<B: AccountManagement>(
    claims: &JwtClaims,
    api: &AccountApi<B>,
) -> Result<Vendor, ServerError> {
    let vendor = api
        .vendor_for_user(claims.sub)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("User {} has no vendor profile", claims.sub)))?;
    Ok(vendor)
}

//----------------------------------------------   Wallet  ----------------------------------------------------
route!(my_wallet => Get "/wallet" impl WalletManagement where requires [Role::Vendor]);
pub async fn my_wallet<A>(claims: JwtClaims, api: web::Data<WalletApi<A>>) -> Result<HttpResponse, ServerError>
where A: WalletManagement {
    let wallet = api
        .balance(claims.sub)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("User {} has no wallet", claims.sub)))?;
    Ok(HttpResponse::Ok().json(wallet))
}

route!(wallet_history => Get "/wallet/history" impl WalletManagement where requires [Role::Vendor]);
pub async fn wallet_history<A>(claims: JwtClaims, api: web::Data<WalletApi<A>>) -> Result<HttpResponse, ServerError>
where A: WalletManagement {
    let entries = api.history(claims.sub).await?;
    Ok(HttpResponse::Ok().json(entries))
}

route!(request_withdrawal => Post "/wallet/withdrawals" impl WalletManagement where requires [Role::Vendor]);
/// Places a hold on the requested amount and records a `Pending` withdrawal. The actual bank
/// transfer is settled later by an admin or by the gateway's transfer webhook.
pub async fn request_withdrawal<A>(
    claims: JwtClaims,
    body: web::Json<WithdrawalRequest>,
    api: web::Data<WalletApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: WalletManagement,
{
    let req = body.into_inner();
    let withdrawal = NewWithdrawal {
        user_id: claims.sub,
        amount: req.amount,
        bank_name: req.bank_name,
        account_number: req.account_number,
        account_name: req.account_name,
    };
    let (wallet, withdrawal) = api.request_withdrawal(withdrawal).await?;
    info!("💻️ Withdrawal {} requested by user {} for {}", withdrawal.reference, claims.sub, withdrawal.amount);
    Ok(HttpResponse::Ok().json(json!({ "wallet": wallet, "withdrawal": withdrawal })))
}

route!(my_withdrawals => Get "/wallet/withdrawals" impl WalletManagement where requires [Role::Vendor]);
pub async fn my_withdrawals<A>(claims: JwtClaims, api: web::Data<WalletApi<A>>) -> Result<HttpResponse, ServerError>
where A: WalletManagement {
    let withdrawals = api.withdrawals_for_user(claims.sub).await?;
    Ok(HttpResponse::Ok().json(withdrawals))
}

//----------------------------------------------   Admin  ----------------------------------------------------
route!(update_roles => Post "/roles" impl AuthManagement where requires [Role::Admin]);
/// Grants and revokes roles. Only super-admins may touch the `SuperAdmin` role.
pub async fn update_roles<A>(
    claims: JwtClaims,
    body: web::Json<RoleUpdateRequest>,
    api: web::Data<AuthApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: AuthManagement,
{
    let req = body.into_inner();
    let touches_super_admin = req.apply.contains(&Role::SuperAdmin) || req.revoke.contains(&Role::SuperAdmin);
    if touches_super_admin && !claims.has_role(Role::SuperAdmin) {
        return Err(ServerError::InsufficientPermissions(
            "Only super-admins may grant or revoke the super_admin role".to_string(),
        ));
    }
    if !req.apply.is_empty() {
        api.assign_roles(req.user_id, &req.apply).await?;
    }
    let mut revoked = 0;
    if !req.revoke.is_empty() {
        revoked = api.remove_roles(req.user_id, &req.revoke).await?;
    }
    info!("💻️ Admin {} updated roles for user {}. {} role(s) revoked.", claims.sub, req.user_id, revoked);
    Ok(HttpResponse::Ok().json(JsonResponse::success("Roles updated")))
}

route!(set_vendor_status => Post "/vendors/{id}/status" impl AccountManagement where requires [Role::Admin]);
pub async fn set_vendor_status<A>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<VendorStatusRequest>,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: AccountManagement,
{
    let vendor_id = path.into_inner();
    let status = body.into_inner().status;
    let vendor = api.update_vendor_status(vendor_id, status).await?;
    info!("💻️ Admin {} set vendor {} to {}", claims.sub, vendor_id, vendor.status);
    Ok(HttpResponse::Ok().json(vendor))
}

route!(approve_product => Post "/products/{id}/approve" impl CatalogManagement where requires [Role::Admin]);
pub async fn approve_product<A>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: CatalogManagement,
{
    let product = api.approve_product(path.into_inner()).await?;
    info!("💻️ Admin {} approved product {} ({})", claims.sub, product.id, product.title);
    Ok(HttpResponse::Ok().json(product))
}

route!(set_product_status => Post "/products/{id}/status" impl CatalogManagement where requires [Role::Admin]);
pub async fn set_product_status<A>(
    path: web::Path<i64>,
    body: web::Json<ProductStatusRequest>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: CatalogManagement,
{
    let status = if body.into_inner().active { ProductStatus::Active } else { ProductStatus::Inactive };
    let product = api.set_product_status(path.into_inner(), status).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(refund_order => Post "/orders/{order_number}/refund" impl PaymentGatewayDatabase, AccountManagement where requires [Role::Admin]);
/// Admin refund for a delivered order. The gateway refund is requested first; only when
/// Paystack accepts it does the local state flip to `Refunded`. Vendor wallets are never
/// clawed back, so a refund is a marketplace expense.
pub async fn refund_order<A>(
    claims: JwtClaims,
    path: web::Path<String>,
    orders: web::Data<OrderFlowApi<A>>,
    accounts: web::Data<AccountApi<A>>,
    paystack: web::Data<PaystackApi>,
) -> Result<HttpResponse, ServerError>
where
    A: PaymentGatewayDatabase + AccountManagement,
{
    let order_number = OrderNumber::from(path.into_inner());
    let order = accounts
        .order_by_number(&order_number)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_number} does not exist")))?;
    let payment = accounts
        .payments_for_order(order.id)
        .await?
        .into_iter()
        .find(|p| p.status == PaymentStatus::Success)
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_number} has no successful payment")))?;
    paystack.refund_transaction(&payment.reference, None).await?;
    let refund_reference = new_refund_reference();
    let (order, payment) = orders.refund_order(&order_number, &refund_reference).await?;
    warn!("💻️ Admin {} refunded order {} ({})", claims.sub, order_number, payment.amount);
    Ok(HttpResponse::Ok().json(json!({ "order": order, "payment": payment })))
}

route!(settle_withdrawal => Post "/withdrawals/{reference}/settle" impl WalletManagement where requires [Role::Admin]);
/// Settles a pending withdrawal after the bank transfer has been made (or has failed). A
/// failed settlement releases the hold back into the vendor's available balance.
pub async fn settle_withdrawal<A>(
    claims: JwtClaims,
    path: web::Path<String>,
    body: web::Json<SettleWithdrawalRequest>,
    api: web::Data<WalletApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: WalletManagement,
{
    let reference = path.into_inner();
    let req = body.into_inner();
    if req.success {
        let withdrawal = api.finalize_withdrawal(&reference).await?;
        info!("💻️ Admin {} finalized withdrawal {reference}", claims.sub);
        return Ok(HttpResponse::Ok().json(withdrawal));
    }
    let reason = req
        .reason
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| ServerError::InvalidRequestBody("A reason is required to fail a withdrawal".to_string()))?;
    let (wallet, withdrawal) = api.fail_withdrawal(&reference, &reason).await?;
    warn!("💻️ Admin {} failed withdrawal {reference}: {reason}", claims.sub);
    Ok(HttpResponse::Ok().json(json!({ "wallet": wallet, "withdrawal": withdrawal })))
}

route!(audit_wallet => Get "/wallets/{user_id}/audit" impl WalletManagement where requires [Role::Admin]);
pub async fn audit_wallet<A>(
    path: web::Path<i64>,
    api: web::Data<WalletApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: WalletManagement,
{
    let audit = api.audit(path.into_inner()).await?;
    let consistent = audit.is_consistent();
    Ok(HttpResponse::Ok().json(json!({ "audit": audit, "consistent": consistent })))
}

fn random_idempotency_key() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(24).map(char::from).collect()
}
