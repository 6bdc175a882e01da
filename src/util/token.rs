use crate::model::auth::{Role, SessionClaims};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

type Result<T> = std::result::Result<T, TokenError>;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Error signing the session token : {0}")]
    SigningError(jsonwebtoken::errors::Error),
    #[error("Error validating the session token : {0}")]
    ValidationError(jsonwebtoken::errors::Error),
}

/// Mints the signed session token carried by the session cookie. The token is
/// self-contained; there is no server-side session store to consult.
pub fn issue_session_token(
    username: &str,
    role: Role,
    secret: &str,
    max_age_seconds: i64,
) -> Result<String> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: username.to_string(),
        role,
        iat: now.timestamp() as usize,
        exp: (now + Duration::seconds(max_age_seconds)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::SigningError)
}

pub fn verify_session_token(secret: &str, token: &str) -> Result<SessionClaims> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(TokenError::ValidationError)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn token_round_trips_username_and_role() {
        let token = issue_session_token("staff", Role::Staff, SECRET, 3600).unwrap();
        let claims = verify_session_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, "staff");
        assert_eq!(claims.role, Role::Staff);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_session_token("admin", Role::Admin, "other-secret", 3600).unwrap();
        assert!(verify_session_token(SECRET, &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Well past the validator's default leeway.
        let token = issue_session_token("viewer", Role::Viewer, SECRET, -600).unwrap();
        assert!(verify_session_token(SECRET, &token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_session_token(SECRET, "not-a-token").is_err());
    }
}
