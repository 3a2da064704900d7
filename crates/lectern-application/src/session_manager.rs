//! Session lifecycle management.
//!
//! The session manager establishes an authenticated identity before any data
//! access is attempted, and gates downstream components behind a readiness
//! signal. Authentication failures are never fatal: the manager still signals
//! readiness with no identity so the rest of the system can render an
//! unauthenticated state instead of hanging.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use lectern_core::identity::{Credential, Identity};
use lectern_core::platform::Platform;

/// Establishes and holds the session identity.
///
/// The identity is resolved once per session and is immutable thereafter;
/// there is no sign-out in this scope.
pub struct SessionManager {
    platform: Arc<dyn Platform>,
    identity: Mutex<Option<Identity>>,
    readiness: watch::Sender<bool>,
}

impl SessionManager {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        let (readiness, _) = watch::channel(false);
        Self {
            platform,
            identity: Mutex::new(None),
            readiness,
        }
    }

    /// Resolves the session identity and signals readiness.
    ///
    /// Sign-in order:
    /// 1. If an identity already exists, this is a no-op (idempotent).
    /// 2. With a credential: authenticate with it; if the credential is
    ///    rejected, downgrade to anonymous sign-in.
    /// 3. Without a credential: anonymous sign-in.
    ///
    /// Every failure is logged and downgrades to "no identity"; readiness is
    /// signaled `true` in all cases so that no consumer blocks indefinitely.
    pub async fn start(&self, credential: Option<Credential>) {
        let mut identity = self.identity.lock().await;
        if identity.is_none() {
            *identity = self.sign_in(credential).await;
        }
        self.readiness.send_replace(true);
    }

    async fn sign_in(&self, credential: Option<Credential>) -> Option<Identity> {
        let had_credential = credential.is_some();
        match self.platform.authenticate(credential.as_ref()).await {
            Ok(identity) => {
                tracing::info!("signed in as '{}'", identity.id);
                Some(identity)
            }
            Err(err) if had_credential && err.is_auth() => {
                tracing::warn!("credential rejected, falling back to anonymous: {}", err);
                match self.platform.authenticate(None).await {
                    Ok(identity) => {
                        tracing::info!("signed in anonymously as '{}'", identity.id);
                        Some(identity)
                    }
                    Err(err) => {
                        tracing::warn!("anonymous sign-in failed: {}", err);
                        None
                    }
                }
            }
            Err(err) => {
                tracing::warn!("sign-in failed: {}", err);
                None
            }
        }
    }

    /// Returns a readiness receiver. The value flips to `true` once
    /// authentication has resolved, successfully or not.
    pub fn readiness(&self) -> watch::Receiver<bool> {
        self.readiness.subscribe()
    }

    /// Returns the resolved identity, or `None` if sign-in failed.
    pub async fn identity(&self) -> Option<Identity> {
        self.identity.lock().await.clone()
    }
}
