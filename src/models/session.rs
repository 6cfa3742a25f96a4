//! Session and access-token models

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Claims of an access token issued by the backend auth API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub aud: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

impl SessionClaims {
    /// Sign a token with the shared secret (HS256)
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Verify signature, expiry and audience of a token
    pub fn from_token(
        token: &str,
        secret: &str,
        audience: &str,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(token_data.claims)
    }
}

/// Identity of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: Option<String>,
}

/// An authenticated session: who is signed in, and the token the backend
/// needs to apply its row-level access policy on their behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: UserIdentity,
    access_token: String,
}

impl Session {
    pub fn new(user: UserIdentity, access_token: impl Into<String>) -> Self {
        Self {
            user,
            access_token: access_token.into(),
        }
    }

    pub fn from_claims(claims: SessionClaims, access_token: impl Into<String>) -> Self {
        Self::new(
            UserIdentity {
                id: claims.sub,
                email: claims.email,
            },
            access_token,
        )
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

/// User object returned by the auth API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Token grant returned by the auth API after a password sign-in
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub user: AuthUser,
}
