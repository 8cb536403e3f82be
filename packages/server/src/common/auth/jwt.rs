use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims issued by the session service
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,      // Subject (member_id as string)
    pub member_id: Uuid,  // Member UUID
    pub is_admin: bool,   // Admin role flag
    pub exp: i64,         // Expiration timestamp
    pub iat: i64,         // Issued at timestamp
    pub iss: String,      // Issuer
    pub jti: String,      // JWT ID
}

/// Verifies bearer tokens. Token issuance lives in the session service;
/// `create_token` exists for tooling and tests.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtService {
    pub fn new(secret: &str, issuer: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
        }
    }

    /// Create a token for a member, valid for 24 hours
    pub fn create_token(&self, member_id: Uuid, is_admin: bool) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::hours(24);

        let claims = Claims {
            sub: member_id.to_string(),
            member_id,
            is_admin,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify signature, expiry and issuer
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_verify_token() {
        let service = JwtService::new("test_secret_key", "agora-test".to_string());
        let member_id = Uuid::new_v4();

        let token = service.create_token(member_id, true).unwrap();

        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.member_id, member_id);
        assert!(claims.is_admin);
        assert_eq!(claims.iss, "agora-test");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let service1 = JwtService::new("secret1", "agora-test".to_string());
        let service2 = JwtService::new("secret2", "agora-test".to_string());

        let token = service1.create_token(Uuid::new_v4(), false).unwrap();
        assert!(service2.verify_token(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        let service1 = JwtService::new("secret", "someone-else".to_string());
        let service2 = JwtService::new("secret", "agora-test".to_string());

        let token = service1.create_token(Uuid::new_v4(), false).unwrap();
        assert!(service2.verify_token(&token).is_err());
    }
}
