//! Service-account authentication for Google APIs.

use std::path::Path;

use base64::Engine;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use ring::signature::RsaKeyPair;
use serde::{Deserialize, Serialize};

use super::StoreError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields of a service-account JSON key that token exchange needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Serialize)]
struct JwtHeader {
    alg: &'static str,
    typ: &'static str,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

/// Response of the OAuth token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: u64,
}

impl ServiceAccount {
    pub fn from_json(input: &str) -> Result<Self, StoreError> {
        serde_json::from_str(input).map_err(|e| {
            StoreError::Credentials(format!("invalid service account key: {}", e))
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Credentials(format!("failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Build an RS256-signed JWT assertion valid for one hour from `now`.
    pub fn signed_assertion(&self, scope: &str, now: DateTime<Utc>) -> Result<String, StoreError> {
        let claims = JwtClaims {
            iss: &self.client_email,
            scope,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let header = JwtHeader {
            alg: "RS256",
            typ: "JWT",
        };

        let header_json = serde_json::to_string(&header)
            .map_err(|e| StoreError::Credentials(format!("failed to encode jwt header: {}", e)))?;
        let claims_json = serde_json::to_string(&claims)
            .map_err(|e| StoreError::Credentials(format!("failed to encode jwt claims: {}", e)))?;
        let signing_input = format!(
            "{}.{}",
            BASE64_URL_SAFE_NO_PAD.encode(header_json),
            BASE64_URL_SAFE_NO_PAD.encode(claims_json)
        );

        let key_pair = self.key_pair()?;
        let mut signature = vec![0; key_pair.public().modulus_len()];
        key_pair
            .sign(
                &ring::signature::RSA_PKCS1_SHA256,
                &ring::rand::SystemRandom::new(),
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| StoreError::Credentials("failed to sign jwt".into()))?;

        Ok(format!(
            "{}.{}",
            signing_input,
            BASE64_URL_SAFE_NO_PAD.encode(&signature)
        ))
    }

    /// Exchange a signed assertion for an access token.
    pub async fn fetch_access_token(
        &self,
        client: &reqwest::Client,
        scope: &str,
    ) -> Result<AccessToken, StoreError> {
        let assertion = self.signed_assertion(scope, Utc::now())?;
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];

        let response = client.post(&self.token_uri).form(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Token(format!("{}: {}", status, body)));
        }

        response
            .json::<AccessToken>()
            .await
            .map_err(|e| StoreError::Token(format!("invalid token response: {}", e)))
    }

    fn key_pair(&self) -> Result<RsaKeyPair, StoreError> {
        let mut reader = std::io::Cursor::new(self.private_key.as_bytes());
        let item = rustls_pemfile::read_one(&mut reader)
            .map_err(|e| StoreError::Credentials(format!("invalid PEM private key: {}", e)))?;
        match item {
            Some(rustls_pemfile::Item::Pkcs8Key(der)) => {
                RsaKeyPair::from_pkcs8(der.secret_pkcs8_der()).map_err(|_| {
                    StoreError::Credentials("failed to load rsa key pair from pkcs8 key".into())
                })
            }
            Some(rustls_pemfile::Item::Pkcs1Key(der)) => {
                RsaKeyPair::from_der(der.secret_pkcs1_der()).map_err(|_| {
                    StoreError::Credentials("failed to load rsa key pair from pkcs1 key".into())
                })
            }
            _ => Err(StoreError::Credentials("missing private key".into())),
        }
    }
}
