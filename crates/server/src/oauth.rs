// OAuth authorization-code flow with PKCE, and the bearer token store

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Invalid code")]
    InvalidCode,

    #[error("Client ID or redirect URI mismatch")]
    ClientMismatch,

    #[error("PKCE verification failed")]
    PkceFailed,

    #[error("Failed to persist issued tokens: {0}")]
    Persist(#[from] std::io::Error),

    #[error("Failed to encode issued tokens: {0}")]
    Encode(#[from] serde_json::Error),
}

impl OAuthError {
    /// Rejections caused by the client's request rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            OAuthError::InvalidCode | OAuthError::ClientMismatch | OAuthError::PkceFailed
        )
    }
}

#[derive(Debug, Clone)]
struct PendingCode {
    client_id: String,
    redirect_uri: String,
    code_challenge: String,
}

#[derive(Debug, Default)]
struct Tokens {
    codes: HashMap<String, PendingCode>,
    issued: HashSet<String>,
}

/// Authorization codes, issued bearer tokens and the static operator token.
///
/// Codes live in memory only; issued tokens are written to a JSON array file
/// after every issue so they survive restarts.
pub struct AuthStore {
    static_token: String,
    issued_tokens_file: PathBuf,
    tokens: RwLock<Tokens>,
    // Serializes issuing so each file write sees every earlier token
    issuing: Mutex<()>,
}

impl AuthStore {
    /// Open the store, reading previously issued tokens if the file exists.
    pub fn load(static_token: impl Into<String>, issued_tokens_file: PathBuf) -> Result<Self> {
        let issued: HashSet<String> = if issued_tokens_file.exists() {
            let content = std::fs::read_to_string(&issued_tokens_file)
                .context("Failed to read issued tokens file")?;
            serde_json::from_str(&content).context("Failed to parse issued tokens file")?
        } else {
            HashSet::new()
        };

        tracing::info!(
            issued = issued.len(),
            file = %issued_tokens_file.display(),
            "Loaded issued tokens"
        );

        Ok(Self {
            static_token: static_token.into(),
            issued_tokens_file,
            tokens: RwLock::new(Tokens {
                codes: HashMap::new(),
                issued,
            }),
            issuing: Mutex::new(()),
        })
    }

    /// Record an authorization request and return its one-time code.
    pub async fn authorize(
        &self,
        client_id: &str,
        redirect_uri: &str,
        code_challenge: &str,
    ) -> String {
        let code = uuid::Uuid::new_v4().simple().to_string();
        let mut tokens = self.tokens.write().await;
        tokens.codes.insert(
            code.clone(),
            PendingCode {
                client_id: client_id.to_string(),
                redirect_uri: redirect_uri.to_string(),
                code_challenge: code_challenge.to_string(),
            },
        );
        code
    }

    /// Redeem a code for a new bearer token. A code is consumed even when
    /// the exchange fails.
    ///
    /// The token is written to the issued-tokens file before it is accepted
    /// on `/mcp`; if the write fails it is never accepted.
    pub async fn exchange(
        &self,
        code: &str,
        client_id: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<String, OAuthError> {
        let pending = self
            .tokens
            .write()
            .await
            .codes
            .remove(code)
            .ok_or(OAuthError::InvalidCode)?;

        if pending.client_id != client_id || pending.redirect_uri != redirect_uri {
            return Err(OAuthError::ClientMismatch);
        }
        if !verify_pkce(code_verifier, &pending.code_challenge) {
            return Err(OAuthError::PkceFailed);
        }

        let _issuing = self.issuing.lock().await;
        let token = uuid::Uuid::new_v4().simple().to_string();

        let mut snapshot: Vec<String> = self.tokens.read().await.issued.iter().cloned().collect();
        snapshot.push(token.clone());
        snapshot.sort();
        let encoded = serde_json::to_vec(&snapshot)?;
        tokio::fs::write(&self.issued_tokens_file, encoded).await?;

        self.tokens.write().await.issued.insert(token.clone());
        tracing::info!(client_id = %client_id, "Issued bearer token");
        Ok(token)
    }

    pub async fn is_authorized(&self, token: &str) -> bool {
        if !self.static_token.is_empty() && token == self.static_token {
            return true;
        }
        self.tokens.read().await.issued.contains(token)
    }
}

/// PKCE S256: `base64url_nopad(sha256(verifier)) == challenge`
pub fn verify_pkce(code_verifier: &str, code_challenge: &str) -> bool {
    let digest = Sha256::digest(code_verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest) == code_challenge
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 7636 appendix B
    const VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
    const CHALLENGE: &str = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

    #[test]
    fn test_verify_pkce() {
        assert!(verify_pkce(VERIFIER, CHALLENGE));
        assert!(!verify_pkce("wrong-verifier", CHALLENGE));
    }

    #[tokio::test]
    async fn test_exchange_issues_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("issued.json");
        let store = AuthStore::load("static", file.clone()).unwrap();

        let code = store.authorize("client", "https://host/cb", CHALLENGE).await;
        let token = store
            .exchange(&code, "client", "https://host/cb", VERIFIER)
            .await
            .unwrap();

        assert!(store.is_authorized(&token).await);
        let saved: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(saved, vec![token.clone()]);

        // Survives a restart
        let reopened = AuthStore::load("static", file).unwrap();
        assert!(reopened.is_authorized(&token).await);
    }

    #[tokio::test]
    async fn test_code_is_single_use() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuthStore::load("static", dir.path().join("issued.json")).unwrap();

        let code = store.authorize("client", "https://host/cb", CHALLENGE).await;
        store
            .exchange(&code, "client", "https://host/cb", VERIFIER)
            .await
            .unwrap();
        let err = store
            .exchange(&code, "client", "https://host/cb", VERIFIER)
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::InvalidCode));
    }

    #[tokio::test]
    async fn test_exchange_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuthStore::load("static", dir.path().join("issued.json")).unwrap();

        let code = store.authorize("client", "https://host/cb", CHALLENGE).await;
        let err = store
            .exchange(&code, "other", "https://host/cb", VERIFIER)
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::ClientMismatch));

        let code = store.authorize("client", "https://host/cb", CHALLENGE).await;
        let err = store
            .exchange(&code, "client", "https://host/cb", "not-the-verifier")
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::PkceFailed));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_failed_persist_issues_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing-dir").join("issued.json");
        let store = AuthStore::load("static", file.clone()).unwrap();

        let code = store.authorize("client", "https://host/cb", CHALLENGE).await;
        let err = store
            .exchange(&code, "client", "https://host/cb", VERIFIER)
            .await
            .unwrap_err();

        assert!(matches!(err, OAuthError::Persist(_)));
        assert!(!err.is_client_error());
        assert!(store.tokens.read().await.issued.is_empty());
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_concurrent_exchanges_all_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("issued.json");
        let store = std::sync::Arc::new(AuthStore::load("static", file.clone()).unwrap());

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let client = format!("client-{}", i);
                let code = store.authorize(&client, "https://host/cb", CHALLENGE).await;
                store
                    .exchange(&code, &client, "https://host/cb", VERIFIER)
                    .await
                    .unwrap()
            }));
        }
        let mut issued = Vec::new();
        for handle in handles {
            issued.push(handle.await.unwrap());
        }
        issued.sort();

        let saved: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(saved, issued);
    }

    #[tokio::test]
    async fn test_static_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuthStore::load("operator-token", dir.path().join("issued.json")).unwrap();
        assert!(store.is_authorized("operator-token").await);
        assert!(!store.is_authorized("guess").await);
        assert!(!store.is_authorized("").await);
    }
}
