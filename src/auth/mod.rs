//! Admin gate - server-side check of the single admin account
//!
//! Credentials never leave the server. A successful login hands out an
//! opaque bearer token which mutating requests must present until it
//! expires or is logged out.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::config::AdminConfig;

/// Credentials shorter than this are padded before comparison so the
/// timing does not depend on their length.
const CREDENTIAL_PAD: usize = 128;

/// Checks admin credentials and tracks live session tokens
#[derive(Debug)]
pub struct AdminGate {
    username: String,
    password: String,
    ttl: Duration,
    /// Token -> time of issue
    sessions: RwLock<HashMap<String, Instant>>,
}

impl AdminGate {
    pub fn new(config: &AdminConfig) -> Self {
        if config.password.is_empty() {
            tracing::warn!("No admin password configured, login is disabled");
        }
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
            ttl: Duration::from_secs(config.session_ttl_secs),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Whether any login can succeed
    pub fn enabled(&self) -> bool {
        !self.password.is_empty()
    }

    /// Returns a fresh session token when the credentials match
    pub fn login(&self, username: &str, password: &str) -> Option<String> {
        let user_ok = credentials_match(username.as_bytes(), self.username.as_bytes());
        let pass_ok = credentials_match(password.as_bytes(), self.password.as_bytes());
        if !(self.enabled() && user_ok && pass_ok) {
            tracing::warn!("Rejected admin login for {:?}", username);
            return None;
        }

        let token = Uuid::new_v4().simple().to_string();
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let before = sessions.len();
        sessions.retain(|_, issued| issued.elapsed() < self.ttl);
        if sessions.len() < before {
            tracing::debug!("Pruned {} expired session(s)", before - sessions.len());
        }
        sessions.insert(token.clone(), Instant::now());

        tracing::info!("Admin logged in");
        Some(token)
    }

    /// Forget a session token. Unknown tokens are ignored.
    pub fn logout(&self, token: &str) {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(token);
        if removed.is_some() {
            tracing::info!("Admin logged out");
        }
    }

    /// True for a token issued by `login` that has neither expired nor been
    /// logged out
    pub fn is_authorized(&self, token: &str) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .is_some_and(|issued| issued.elapsed() < self.ttl)
    }
}

/// Constant-time equality that also hides the length of either side
fn credentials_match(given: &[u8], expected: &[u8]) -> bool {
    let width = CREDENTIAL_PAD.max(given.len()).max(expected.len());
    let mut padded_given = vec![0u8; width];
    let mut padded_expected = vec![0u8; width];
    padded_given[..given.len()].copy_from_slice(given);
    padded_expected[..expected.len()].copy_from_slice(expected);

    let same_len = (given.len() as u64).ct_eq(&(expected.len() as u64));
    (padded_given.as_slice().ct_eq(padded_expected.as_slice()) & same_len).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(password: &str) -> AdminGate {
        AdminGate::new(&AdminConfig {
            password: password.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_login_and_logout() {
        let gate = gate("password");
        let token = gate.login("admin", "password").unwrap();
        assert!(gate.is_authorized(&token));

        gate.logout(&token);
        assert!(!gate.is_authorized(&token));
    }

    #[test]
    fn test_wrong_credentials_rejected() {
        let gate = gate("password");
        assert!(gate.login("admin", "Password").is_none());
        assert!(gate.login("root", "password").is_none());
        assert!(!gate.is_authorized("made-up-token"));
    }

    #[test]
    fn test_empty_password_disables_login() {
        let gate = gate("");
        assert!(!gate.enabled());
        assert!(gate.login("admin", "").is_none());
    }

    #[test]
    fn test_tokens_are_distinct() {
        let gate = gate("password");
        let a = gate.login("admin", "password").unwrap();
        let b = gate.login("admin", "password").unwrap();
        assert_ne!(a, b);
        gate.logout(&a);
        assert!(gate.is_authorized(&b));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let gate = AdminGate::new(&AdminConfig {
            password: "password".to_string(),
            session_ttl_secs: 0,
            ..Default::default()
        });
        let token = gate.login("admin", "password").unwrap();
        assert!(!gate.is_authorized(&token));
    }

    #[test]
    fn test_login_prunes_expired_sessions() {
        let gate = AdminGate::new(&AdminConfig {
            password: "password".to_string(),
            session_ttl_secs: 0,
            ..Default::default()
        });
        for _ in 0..5 {
            gate.login("admin", "password").unwrap();
        }
        assert_eq!(gate.sessions.read().unwrap().len(), 1);
    }

    #[test]
    fn test_credentials_match() {
        assert!(credentials_match(b"password", b"password"));
        assert!(!credentials_match(b"password", b"passwor"));
        assert!(!credentials_match(b"", b"password"));
        assert!(!credentials_match(b"password\0", b"password"));

        let long = vec![b'x'; 300];
        let mut other = long.clone();
        other[299] = b'y';
        assert!(credentials_match(&long, &long.clone()));
        assert!(!credentials_match(&long, &other));
    }
}
