//! JWT authentication for signed-in accounts.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Role;
use crate::error::{DeskError, DeskResult};

/// JWT claims for authenticated accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account/profile ID).
    pub sub: String,
    /// Account email.
    pub email: String,
    /// Role at sign-in time. Informational; authorization reads the profile.
    pub role: Role,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at time (Unix timestamp).
    pub iat: i64,
    /// Issuer.
    pub iss: String,
}

impl Claims {
    /// The subject as a profile id.
    pub fn profile_id(&self) -> DeskResult<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| DeskError::Unauthorized("Token subject is not a valid id".to_string()))
    }
}

/// JWT token manager.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    /// Token validity duration in hours.
    token_duration_hours: i64,
}

impl JwtManager {
    /// Create a new JWT manager with the given secret.
    pub fn new(secret: &str, issuer: String, token_duration_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            token_duration_hours,
        }
    }

    /// Get token duration in hours.
    pub fn token_duration_hours(&self) -> i64 {
        self.token_duration_hours
    }

    /// Generate a JWT token for an account.
    pub fn generate_token(&self, user_id: Uuid, email: &str, role: Role) -> DeskResult<String> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.token_duration_hours);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DeskError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a JWT token.
    pub fn validate_token(&self, token: &str) -> DeskResult<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let token_data: TokenData<Claims> =
            decode(token, &self.decoding_key, &validation).map_err(|e| {
                tracing::debug!(error = %e, "JWT validation failed");
                DeskError::Unauthorized(format!("Invalid token: {}", e))
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret-key-12345", "facility-desk".to_string(), 12);
        let id = Uuid::new_v4();

        let token = manager
            .generate_token(id, "tech@example.com", Role::Technician)
            .unwrap();

        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.profile_id().unwrap(), id);
        assert_eq!(claims.email, "tech@example.com");
        assert_eq!(claims.role, Role::Technician);
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let issuer_a = JwtManager::new("shared-secret", "a".to_string(), 1);
        let issuer_b = JwtManager::new("shared-secret", "b".to_string(), 1);
        let token = issuer_a
            .generate_token(Uuid::new_v4(), "x@example.com", Role::Admin)
            .unwrap();
        assert!(issuer_b.validate_token(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = JwtManager::new("secret-one", "facility-desk".to_string(), 1);
        let verifier = JwtManager::new("secret-two", "facility-desk".to_string(), 1);
        let token = signer
            .generate_token(Uuid::new_v4(), "x@example.com", Role::Manager)
            .unwrap();
        assert!(verifier.validate_token(&token).is_err());
    }
}
