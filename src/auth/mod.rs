pub mod extractors;
pub mod middleware;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use extractors::Caller;
pub use middleware::AuthMiddleware;
pub use token::{Claims, TokenError, TokenService};

/// Body of `POST /token`. Both fields must be present; their contents are
/// compared verbatim against the stored user.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(required)]
    pub email: Option<String>,
    #[validate(required)]
    pub senha: Option<String>,
}

/// Successful response of `POST /token`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
