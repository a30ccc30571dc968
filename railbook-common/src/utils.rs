use actix_web::HttpRequest;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

lazy_static! {
    static ref JWT_SECRET_KEY: String =
        std::env::var("JWT_SECRET_KEY").unwrap_or_else(|_| "railbook-dev-secret".to_string());
}

const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Caller identity as issued by the external identity provider.
/// `sub` is the opaque user id; the ledger never interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    User,
}

pub fn create_token(user_id: &str, role: Role) -> String {
    let exp = Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS);
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: exp.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET_KEY.as_bytes()),
    )
    .expect("can't create token")
}

pub fn decode_token(token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET_KEY.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// Extracts claims from the `Authorization: Bearer <token>` header.
/// A missing or malformed header yields `None`, never an error.
pub fn get_claims(req: HttpRequest) -> Option<Claims> {
    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .and_then(decode_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn token_round_trip_preserves_identity() {
        let token = create_token("alice", Role::User);
        let claims = decode_token(&token).expect("token should decode");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, "USER");
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(decode_token("not-a-jwt").is_none());
    }

    #[test]
    fn role_round_trip() {
        assert_eq!(Role::Admin.to_string(), "ADMIN");
        assert_eq!(Role::from_str("USER").unwrap(), Role::User);
    }
}
