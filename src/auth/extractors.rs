use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::middleware::INVALID_TOKEN;
use crate::auth::token::Claims;
use crate::error::AppError;

/// The verified caller of a protected route.
///
/// Holds the user id embedded in the token, which is only present when task
/// ownership is enforced. In the default mode a token proves that *someone*
/// authenticated, so this is `Caller(None)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Option<i32>);

impl FromRequest for Caller {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) => ready(Ok(Caller(claims.sub))),
            // Only reachable if the route is not behind AuthMiddleware.
            None => ready(Err(AppError::Unauthorized(INVALID_TOKEN.into()).into())),
        }
    }
}
