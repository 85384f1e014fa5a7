//! Actor Identity Extraction
//!
//! Mutations must carry a signed identity token in the `X-IDTOKEN` header.
//! The token is verified with RS256 against the configured JSON Web Key Set
//! and its `user_id` and `email` claims become the request's actor.

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;

use crate::shared::error::PlatformError;

pub const ID_TOKEN_HEADER: &str = "x-idtoken";

/// Position of the verification key inside the key set.
const SIGNING_KEY_INDEX: usize = 0;

/// The authenticated caller of a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActorIdentity {
    pub user_id: String,
    pub email: String,
}

impl ActorIdentity {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    user_id: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity token is missing")]
    MissingToken,

    #[error("Identity token rejected: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Identity token has no user_id claim")]
    MissingSubject,

    #[error("Key set could not be parsed: {0}")]
    KeySet(String),

    #[error("Key set has no key at index {0}")]
    KeyNotFound(usize),

    #[error("Verification key is unusable: {0}")]
    KeyMaterial(String),
}

impl IdentityError {
    /// Token problems are the caller's fault; key set problems are ours.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::MissingToken | Self::InvalidToken(_) | Self::MissingSubject)
    }
}

impl From<IdentityError> for PlatformError {
    fn from(err: IdentityError) -> Self {
        if err.is_forbidden() {
            PlatformError::forbidden(err.to_string())
        } else {
            PlatformError::internal(err.to_string())
        }
    }
}

/// Verifies identity tokens against a JSON Web Key Set document.
#[derive(Debug, Clone)]
pub struct ActorIdentityExtractor {
    key_set: String,
    audience: Option<String>,
}

impl ActorIdentityExtractor {
    pub fn new(key_set: impl Into<String>) -> Self {
        Self {
            key_set: key_set.into(),
            audience: None,
        }
    }

    /// Require the token's `aud` claim to contain `audience`.
    pub fn with_audience(mut self, audience: Option<String>) -> Self {
        self.audience = audience.filter(|a| !a.trim().is_empty());
        self
    }

    /// Verify `raw_token` and return the actor it names.
    ///
    /// The key set is parsed on every call so a rotated key set takes effect
    /// without a restart.
    pub fn extract(&self, raw_token: &str) -> Result<ActorIdentity, IdentityError> {
        let token = raw_token.trim();
        if token.is_empty() {
            return Err(IdentityError::MissingToken);
        }

        let key = self.verification_key()?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.required_spec_claims.clear();
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        let claims = decode::<IdTokenClaims>(token, &key, &validation)?.claims;
        if claims.user_id.trim().is_empty() {
            return Err(IdentityError::MissingSubject);
        }

        debug!(user_id = %claims.user_id, "Identity token verified");
        Ok(ActorIdentity {
            user_id: claims.user_id,
            email: claims.email,
        })
    }

    fn verification_key(&self) -> Result<DecodingKey, IdentityError> {
        let key_set: JwkSet =
            serde_json::from_str(&self.key_set).map_err(|e| IdentityError::KeySet(e.to_string()))?;
        let jwk = key_set
            .keys
            .get(SIGNING_KEY_INDEX)
            .ok_or(IdentityError::KeyNotFound(SIGNING_KEY_INDEX))?;
        DecodingKey::from_jwk(jwk).map_err(|e| IdentityError::KeyMaterial(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SIGNING_KEY: &str = include_str!("../../tests/fixtures/id_token_key.pem");
    const FOREIGN_KEY: &str = include_str!("../../tests/fixtures/foreign_key.pem");
    const KEY_SET: &str = include_str!("../../tests/fixtures/jwks.json");
    const FOREIGN_KEY_SET: &str = include_str!("../../tests/fixtures/foreign_jwks.json");

    fn sign(pem: &str, claims: serde_json::Value) -> String {
        let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
        encode(&Header::new(Algorithm::RS256), &claims, &key).unwrap()
    }

    fn valid_claims() -> serde_json::Value {
        serde_json::json!({
            "user_id": "admin-1",
            "email": "admin@example.com",
            "exp": chrono::Utc::now().timestamp() + 3600,
        })
    }

    #[test]
    fn test_extracts_actor_from_valid_token() {
        let extractor = ActorIdentityExtractor::new(KEY_SET);
        let actor = extractor.extract(&sign(SIGNING_KEY, valid_claims())).unwrap();
        assert_eq!(actor, ActorIdentity::new("admin-1", "admin@example.com"));
    }

    #[test]
    fn test_token_without_expiry_is_accepted() {
        let extractor = ActorIdentityExtractor::new(KEY_SET);
        let token = sign(SIGNING_KEY, serde_json::json!({ "user_id": "u", "email": "e@x.io" }));
        assert!(extractor.extract(&token).is_ok());
    }

    #[test]
    fn test_missing_token_is_forbidden() {
        let err = ActorIdentityExtractor::new(KEY_SET).extract("  ").unwrap_err();
        assert!(matches!(err, IdentityError::MissingToken));
        assert!(err.is_forbidden());
    }

    #[test]
    fn test_wrong_signer_is_forbidden() {
        let err = ActorIdentityExtractor::new(KEY_SET)
            .extract(&sign(FOREIGN_KEY, valid_claims()))
            .unwrap_err();
        assert!(matches!(err, IdentityError::InvalidToken(_)));
        assert!(err.is_forbidden());
    }

    #[test]
    fn test_key_set_is_the_trust_anchor() {
        let extractor = ActorIdentityExtractor::new(FOREIGN_KEY_SET);
        assert!(extractor.extract(&sign(FOREIGN_KEY, valid_claims())).is_ok());
        assert!(extractor.extract(&sign(SIGNING_KEY, valid_claims())).unwrap_err().is_forbidden());
    }

    #[test]
    fn test_expired_and_garbage_tokens_are_forbidden() {
        let extractor = ActorIdentityExtractor::new(KEY_SET);
        let expired = serde_json::json!({
            "user_id": "u",
            "email": "e@x.io",
            "exp": chrono::Utc::now().timestamp() - 3600,
        });
        assert!(extractor.extract(&sign(SIGNING_KEY, expired)).unwrap_err().is_forbidden());
        assert!(extractor.extract("not.a.token").unwrap_err().is_forbidden());
    }

    #[test]
    fn test_missing_user_claim_is_forbidden() {
        let token = sign(SIGNING_KEY, serde_json::json!({ "email": "e@x.io" }));
        let err = ActorIdentityExtractor::new(KEY_SET).extract(&token).unwrap_err();
        assert!(err.is_forbidden());
    }

    #[test]
    fn test_key_set_problems_are_internal() {
        let token = sign(SIGNING_KEY, valid_claims());

        let err = ActorIdentityExtractor::new("not json").extract(&token).unwrap_err();
        assert!(matches!(err, IdentityError::KeySet(_)));
        assert!(!err.is_forbidden());

        let err = ActorIdentityExtractor::new(r#"{"keys":[]}"#).extract(&token).unwrap_err();
        assert!(matches!(err, IdentityError::KeyNotFound(0)));
        assert!(!err.is_forbidden());
    }

    #[test]
    fn test_audience_is_enforced_when_configured() {
        let extractor = ActorIdentityExtractor::new(KEY_SET).with_audience(Some("user-storage".to_string()));

        let mut claims = valid_claims();
        claims["aud"] = serde_json::json!("user-storage");
        assert!(extractor.extract(&sign(SIGNING_KEY, claims)).is_ok());

        let mut claims = valid_claims();
        claims["aud"] = serde_json::json!("someone-else");
        assert!(extractor.extract(&sign(SIGNING_KEY, claims)).unwrap_err().is_forbidden());
    }
}
