use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use super::claims::Claims;
use crate::state::AppState;

/// Extracts and validates the bearer JWT, returning the user ID.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "missing Authorization header".into(),
            ))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or((StatusCode::UNAUTHORIZED, "invalid auth scheme".into()))?;

        let cfg = &state.config.jwt;
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&cfg.audience));
        validation.set_issuer(std::slice::from_ref(&cfg.issuer));
        let decoding = DecodingKey::from_secret(cfg.secret.as_bytes());

        let data = decode::<Claims>(token, &decoding, &validation)
            .map_err(|_| (StatusCode::UNAUTHORIZED, "invalid or expired token".into()))?;

        Ok(AuthUser(data.claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::{Duration, OffsetDateTime};

    fn sign(secret: &str, iss: &str, aud: &str, sub: Uuid) -> String {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub,
            iat: now.unix_timestamp() as usize,
            exp: (now + Duration::minutes(5)).unix_timestamp() as usize,
            iss: iss.into(),
            aud: aud.into(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn round_trips_provider_token() {
        let sub = Uuid::new_v4();
        let token = sign("test", "test", "test", sub);

        let mut validation = Validation::default();
        validation.set_audience(&["test"]);
        validation.set_issuer(&["test"]);
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test"),
            &validation,
        )
        .unwrap();
        assert_eq!(data.claims.sub, sub);
    }

    #[test]
    fn rejects_wrong_audience() {
        let token = sign("test", "test", "someone-else", Uuid::new_v4());

        let mut validation = Validation::default();
        validation.set_audience(&["test"]);
        validation.set_issuer(&["test"]);
        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test"),
            &validation,
        );
        assert!(result.is_err());
    }
}
