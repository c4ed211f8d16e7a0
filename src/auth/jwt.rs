use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

use crate::models::{Claims, TokenType};

/// Subject carried by every back-office token; the PIN gate has no user
/// accounts behind it.
pub const ADMIN_SUBJECT: &str = "admin";

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

fn issue(
    token_type: TokenType,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    let claims = Claims {
        sub: ADMIN_SUBJECT.to_string(),
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((token, claims))
}

pub fn generate_access_token(secret: &str, ttl: usize) -> Result<String, Error> {
    issue(TokenType::Access, secret, ttl).map(|(token, _)| token)
}

pub fn generate_refresh_token(secret: &str, ttl: usize) -> Result<(String, Claims), Error> {
    issue(TokenType::Refresh, secret, ttl)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn tokens_round_trip_with_their_type() {
        let access = generate_access_token(SECRET, 60).unwrap();
        let claims = verify_token(&access, SECRET).unwrap();
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.sub, ADMIN_SUBJECT);

        let (refresh, issued) = generate_refresh_token(SECRET, 60).unwrap();
        let claims = verify_token(&refresh, SECRET).unwrap();
        assert_eq!(claims.token_type, TokenType::Refresh);
        assert_eq!(claims.jti, issued.jti);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let access = generate_access_token(SECRET, 60).unwrap();
        assert!(verify_token(&access, "other").is_err());
    }
}
