//! Password sign-in and sign-out against the auth API

use reqwest::Method;
use serde::Serialize;

use super::{BackendClient, GatewayError, GatewayResult};
use crate::models::session::{Session, TokenGrant};

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

impl BackendClient {
    /// Exchange email and password for an access token
    pub async fn password_grant(&self, email: &str, password: &str) -> GatewayResult<TokenGrant> {
        let request = self
            .auth(Method::POST, "token")
            .query(&[("grant_type", "password")])
            .json(&PasswordCredentials { email, password });

        self.send("sign_in", request)
            .await?
            .json::<TokenGrant>()
            .await
            .map_err(|e| GatewayError::from_reqwest("sign_in", e))
    }

    /// Revoke the session's refresh tokens
    pub async fn logout(&self, session: &Session) -> GatewayResult<()> {
        let request = self
            .auth(Method::POST, "logout")
            .bearer_auth(session.access_token());

        self.send("sign_out", request).await?;
        Ok(())
    }
}
