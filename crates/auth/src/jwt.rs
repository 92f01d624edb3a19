use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::{JwtClaims, TokenError, validate_claims};

/// Verifies a bearer token and yields its claims.
///
/// Object-safe so the HTTP layer can hold an `Arc<dyn JwtValidator>`.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// HMAC-SHA256 token issuer and validator sharing one secret.
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256Jwt {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn issue(&self, claims: &JwtClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

impl core::fmt::Debug for Hs256Jwt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Jwt").finish_non_exhaustive()
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        // Time checks run against the caller's clock below.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use eventsphere_core::UserId;

    use super::*;
    use crate::Role;

    #[test]
    fn issued_token_validates() {
        let jwt = Hs256Jwt::new("secret");
        let now = Utc::now();
        let claims = JwtClaims::new(UserId::new(), Role::Exhibitor, now, Duration::minutes(10));

        let token = jwt.issue(&claims).unwrap();
        assert_eq!(jwt.validate(&token, now).unwrap(), claims);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = Utc::now();
        let claims = JwtClaims::new(UserId::new(), Role::Admin, now, Duration::minutes(10));
        let token = Hs256Jwt::new("a").issue(&claims).unwrap();

        assert!(matches!(
            Hs256Jwt::new("b").validate(&token, now),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = Hs256Jwt::new("secret");
        let issued = Utc::now() - Duration::hours(2);
        let claims = JwtClaims::new(UserId::new(), Role::Attendee, issued, Duration::minutes(10));
        let token = jwt.issue(&claims).unwrap();

        assert_eq!(jwt.validate(&token, Utc::now()), Err(TokenError::Expired));
    }
}
