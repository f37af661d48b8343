pub mod jwks;
pub mod jwt;
pub mod middleware;

use std::sync::Arc;

use crate::config::AuthConfig;
use jwks::JwksCache;
use jwt::Claims;

/// Verifies bearer tokens. Stored in app data and used by the
/// `AuthenticatedUser` extractor and the WebSocket handshake.
#[derive(Clone)]
pub enum TokenVerifier {
    Secret(String),
    Jwks(Arc<JwksCache>),
}

impl TokenVerifier {
    pub fn from_config(auth: &AuthConfig) -> Self {
        match auth {
            AuthConfig::Secret(secret) => TokenVerifier::Secret(secret.clone()),
            AuthConfig::Supabase {
                project_ref,
                anon_key,
            } => TokenVerifier::Jwks(Arc::new(JwksCache::new(project_ref, anon_key))),
        }
    }

    pub async fn verify(&self, token: &str) -> Result<Claims, String> {
        match self {
            TokenVerifier::Secret(secret) => jwt::validate_token(token, secret),
            TokenVerifier::Jwks(cache) => cache.validate_token(token).await.map(|td| td.claims),
        }
    }
}
