use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Lifetime of an issued token, in seconds.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Claims encoded in every token.
///
/// `number` is a fresh random value per issuance. It says nothing about who
/// the token belongs to; only `sub` does, and it is present only when task
/// ownership is enforced.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub number: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<i32>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("no signing secret configured")]
    MissingSecret,
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 tokens with the process-wide secret.
///
/// The secret is optional: without one, issuing fails and every token is
/// rejected, but the service still starts.
#[derive(Clone)]
pub struct TokenService {
    secret: Option<String>,
    embed_subject: bool,
}

impl TokenService {
    pub fn new(secret: Option<String>, embed_subject: bool) -> Self {
        Self {
            secret,
            embed_subject,
        }
    }

    pub fn embeds_subject(&self) -> bool {
        self.embed_subject
    }

    fn secret(&self) -> Result<&[u8], TokenError> {
        self.secret
            .as_deref()
            .map(str::as_bytes)
            .ok_or(TokenError::MissingSecret)
    }

    /// Signs a new token that expires one hour from now. The user id is only
    /// embedded when the service was built with `embed_subject`.
    pub fn issue(&self, user_id: i32) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            number: rand::random::<f64>(),
            sub: self.embed_subject.then_some(user_id),
            iat: now.timestamp() as usize,
            exp: (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp() as usize,
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let key = EncodingKey::from_secret(self.secret()?);
        Ok(encode(&Header::default(), claims, &key)?)
    }

    /// Checks signature and expiry. No leeway: a token is rejected as soon as
    /// its `exp` has passed.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let key = DecodingKey::from_secret(self.secret()?);
        let mut validation = Validation::default();
        validation.leeway = 0;
        Ok(decode::<Claims>(token, &key, &validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    fn service() -> TokenService {
        TokenService::new(Some("test_secret".to_string()), false)
    }

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = service();
        let token = tokens.issue(1).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert!((0.0..1.0).contains(&claims.number));
        assert_eq!(claims.sub, None);
        assert_eq!((claims.exp - claims.iat) as i64, TOKEN_TTL_SECS);
    }

    #[test]
    fn test_tokens_carry_fresh_random_values() {
        let tokens = service();
        let a = tokens.verify(&tokens.issue(1).unwrap()).unwrap();
        let b = tokens.verify(&tokens.issue(1).unwrap()).unwrap();
        assert_ne!(a.number, b.number);
    }

    #[test]
    fn test_subject_is_embedded_when_enabled() {
        let tokens = TokenService::new(Some("test_secret".to_string()), true);
        let claims = tokens.verify(&tokens.issue(42).unwrap()).unwrap();
        assert_eq!(claims.sub, Some(42));
    }

    #[test]
    fn test_token_expiration() {
        let tokens = service();
        let now = Utc::now();
        let expired = Claims {
            number: 0.5,
            sub: None,
            iat: (now - Duration::hours(2)).timestamp() as usize,
            exp: (now - Duration::seconds(5)).timestamp() as usize,
        };
        let token = tokens.sign(&expired).unwrap();

        match tokens.verify(&token) {
            Err(TokenError::Jwt(e)) => assert!(matches!(e.kind(), ErrorKind::ExpiredSignature)),
            other => panic!("expected an expired token, got {:?}", other),
        }
    }

    #[test]
    fn test_still_valid_just_before_expiry() {
        let tokens = service();
        let now = Utc::now();
        let claims = Claims {
            number: 0.5,
            sub: None,
            iat: (now - Duration::minutes(59)).timestamp() as usize,
            exp: (now + Duration::minutes(1)).timestamp() as usize,
        };
        let token = tokens.sign(&claims).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), claims);
    }

    #[test]
    fn test_invalid_token_signature() {
        let other = TokenService::new(Some("a_completely_different_secret".to_string()), false);
        let token = other.issue(1).unwrap();

        match service().verify(&token) {
            Err(TokenError::Jwt(e)) => assert!(matches!(e.kind(), ErrorKind::InvalidSignature)),
            other => panic!("expected a signature mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            service().verify("not.a.token"),
            Err(TokenError::Jwt(_))
        ));
        assert!(service().verify("").is_err());
    }

    #[test]
    fn test_missing_secret() {
        let tokens = TokenService::new(None, false);
        assert!(matches!(tokens.issue(1), Err(TokenError::MissingSecret)));
        let token = service().issue(1).unwrap();
        assert!(matches!(
            tokens.verify(&token),
            Err(TokenError::MissingSecret)
        ));
    }
}
