//! Endpoint-level tests that run against an in-memory actix app, with no database behind them.
//! The middleware is exercised with stub handlers; the full money path is covered by the
//! engine's integration tests.
use actix_web::{http::StatusCode, test, web, App, HttpResponse};
use chrono::Utc;
use kasuwa_engine::db_types::{Role, RoleList, User};
use ksw_common::Secret;
use paystack_tools::sign_payload;

use crate::{
    auth::TokenIssuer,
    config::AuthConfig,
    middleware::{AclMiddlewareFactory, HmacMiddlewareFactory},
    routes::health,
};

fn test_issuer() -> TokenIssuer {
    let config =
        AuthConfig { jwt_secret: Secret::new("0123456789abcdef0123456789abcdef".to_string()), token_ttl: chrono::Duration::hours(1) };
    TokenIssuer::new(&config)
}

fn token_for(roles: &[Role]) -> String {
    let user = User {
        id: 7,
        email: "test@example.com".to_string(),
        display_name: "Test".to_string(),
        password_hash: String::default(),
        roles: RoleList::from_roles(roles),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    test_issuer().issue_token(&user).expect("Error issuing token")
}

async fn ok_handler() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

#[actix_web::test]
async fn health_check() {
    let app = test::init_service(App::new().service(health)).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn acl_gates_on_token_and_roles() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_issuer()))
            .service(web::resource("/admin").wrap(AclMiddlewareFactory::new(&[Role::Admin])).to(ok_handler)),
    )
    .await;

    let req = test::TestRequest::get().uri("/admin").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/admin")
        .insert_header(("Authorization", format!("Bearer {}", token_for(&[Role::Customer]))))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/admin")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/admin")
        .insert_header(("Authorization", format!("Bearer {}", token_for(&[Role::Customer, Role::Admin]))))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn webhook_signature_gate() {
    const SECRET: &str = "sk_test_webhook_secret";
    async fn echo(body: web::Bytes) -> HttpResponse {
        HttpResponse::Ok().body(body)
    }
    let app = test::init_service(
        App::new().service(
            web::scope("/webhook")
                .wrap(HmacMiddlewareFactory::new(Secret::new(SECRET.to_string()), true))
                .service(web::resource("/paystack").route(web::post().to(echo))),
        ),
    )
    .await;

    let body = br#"{"event":"charge.success","data":{"reference":"PSK-abc123","amount":322500}}"#.to_vec();
    let signature = sign_payload(SECRET, &body);

    let req = test::TestRequest::post()
        .uri("/webhook/paystack")
        .insert_header(("x-paystack-signature", signature))
        .set_payload(body.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    // The body must be re-injected intact for the handler
    let echoed = test::read_body(res).await;
    assert_eq!(echoed.as_ref(), body.as_slice());

    let req = test::TestRequest::post()
        .uri("/webhook/paystack")
        .insert_header(("x-paystack-signature", "deadbeef"))
        .set_payload(body.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post().uri("/webhook/paystack").set_payload(body).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn disabled_webhook_checks_allow_unsigned_requests() {
    async fn accept() -> HttpResponse {
        HttpResponse::Ok().finish()
    }
    let app = test::init_service(
        App::new().service(
            web::scope("/webhook")
                .wrap(HmacMiddlewareFactory::new(Secret::new("unused".to_string()), false))
                .service(web::resource("/paystack").route(web::post().to(accept))),
        ),
    )
    .await;
    let req = test::TestRequest::post().uri("/webhook/paystack").set_payload("{}").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}
