//! Access control middleware.
//!
//! Wraps a route with a required-role check. The middleware reads the `Authorization: Bearer`
//! header, validates the JWT against the [`TokenIssuer`] registered on the app, and compares the
//! claims' roles against the roles required by the route. Validated claims are stored in the
//! request extensions, so handlers taking a [`JwtClaims`] parameter do not decode the token twice.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorForbidden, ErrorInternalServerError, ErrorUnauthorized},
    http::header,
    web,
    Error,
    HttpMessage,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use kasuwa_engine::db_types::Role;
use log::*;

use crate::auth::{bearer_token, TokenIssuer};

pub struct AclMiddlewareFactory {
    required_roles: Vec<Role>,
}

impl AclMiddlewareFactory {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: required_roles.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AclMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { required_roles: self.required_roles.clone(), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    required_roles: Vec<Role>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required_roles = self.required_roles.clone();
        Box::pin(async move {
            let issuer = req.app_data::<web::Data<TokenIssuer>>().cloned().ok_or_else(|| {
                error!("🔐️ No token issuer is registered on the app");
                ErrorInternalServerError("No token issuer is registered on the app")
            })?;
            let header = req
                .headers()
                .get(header::AUTHORIZATION)
                .ok_or_else(|| ErrorUnauthorized("No access token was provided"))?;
            let token = bearer_token(header.to_str().unwrap_or_default())
                .map_err(|e| ErrorUnauthorized(e.to_string()))?;
            let claims = issuer.validate_token(token).map_err(|e| {
                debug!("🔐️ Rejecting invalid access token. {e}");
                ErrorUnauthorized("Invalid access token")
            })?;
            if required_roles.iter().all(|role| claims.roles.contains(role)) {
                req.extensions_mut().insert(claims);
                service.call(req).await
            } else {
                debug!("🔐️ User {} does not hold the roles required for {}", claims.sub, req.path());
                Err(ErrorForbidden("Insufficient permissions"))
            }
        })
    }
}
