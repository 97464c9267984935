use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, Method},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::error::AppError;
use crate::state::AppState;

pub const MISSING_TOKEN: &str = "Token não fornecido";
pub const INVALID_TOKEN: &str = "Token inválido";

/// Routes reachable without a token.
const PUBLIC_ROUTES: &[(&str, &str)] = &[
    ("POST", "/usuarios"),
    ("POST", "/token"),
    ("GET", "/health"),
];

fn is_public(method: &Method, path: &str) -> bool {
    PUBLIC_ROUTES
        .iter()
        .any(|(m, p)| method.as_str() == *m && path == *p)
}

/// Rejects requests to protected routes unless the `Authorization` header
/// holds a valid token. The header value is the token itself, no scheme
/// prefix. Verified claims are stored in the request extensions.
///
/// Rejections are answered here, before any handler or store call runs.
/// Paths that match no registered route pass through to the 404 fallback.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S> AuthMiddlewareService<S> {
    fn authenticate(req: &ServiceRequest) -> Result<(), AppError> {
        let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
            AppError::InternalServerError("Application state is not configured".into())
        })?;

        let token = match req.headers().get(header::AUTHORIZATION) {
            None => return Err(AppError::Unauthorized(MISSING_TOKEN.into())),
            Some(value) if value.is_empty() => {
                return Err(AppError::Unauthorized(MISSING_TOKEN.into()))
            }
            Some(value) => value
                .to_str()
                .map_err(|_| AppError::Unauthorized(INVALID_TOKEN.into()))?,
        };

        let claims = state
            .tokens
            .verify(token)
            .map_err(|_| AppError::Unauthorized(INVALID_TOKEN.into()))?;

        // Ownership checks need to know who is calling.
        if state.policy.enforce_task_ownership && claims.sub.is_none() {
            return Err(AppError::Unauthorized(INVALID_TOKEN.into()));
        }

        req.extensions_mut().insert(claims);
        Ok(())
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let routed = req.match_pattern().is_some();
        if routed && !is_public(req.method(), req.path()) {
            if let Err(app_err) = Self::authenticate(&req) {
                let response = app_err.error_response();
                return Box::pin(async move {
                    Ok(req.into_response(response).map_into_right_body())
                });
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
    }
}
