use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Claims read from a caller's bearer token.
///
/// Only `sub` matters here: it is the user id looked up in the directory.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration time (unix seconds)
    pub exp: i64,
}

/// Validates an HS256 token and returns its claims.
///
/// `leeway_seconds` is the clock skew tolerated on `exp`.
pub fn validate_access_token(token: &str, secret: &str, leeway_seconds: u64) -> AppResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = leeway_seconds;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::Unauthorized {
            message: "Token has expired".to_string(),
        },
        jsonwebtoken::errors::ErrorKind::InvalidToken => AppError::Unauthorized {
            message: "Invalid token".to_string(),
        },
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AppError::Unauthorized {
            message: "Invalid token signature".to_string(),
        },
        _ => AppError::Unauthorized {
            message: format!("Token validation failed: {}", e),
        },
    })?;

    if claims.sub.trim().is_empty() {
        return Err(AppError::Unauthorized {
            message: "Token subject is empty".to_string(),
        });
    }

    Ok(claims)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Claims;
    use jsonwebtoken::{EncodingKey, Header, encode};

    /// Signs a token for `sub` that expires `ttl_seconds` from now (negative for expired).
    pub fn sign_token(sub: &str, secret: &str, ttl_seconds: i64) -> String {
        let now = jiff::Timestamp::now().as_second();
        let claims = Claims {
            sub: sub.to_string(),
            iat: now,
            exp: now + ttl_seconds,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }
}
