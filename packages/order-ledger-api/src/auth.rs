//! Admin credentials and signed session cookies.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Name of the admin session cookie.
pub const SESSION_COOKIE: &str = "pedidos_session";

const SESSION_SUBJECT: &str = "admin";

/// Secrets guarding the admin views.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Path segment required by `/empresa/{secret}`
    pub url_secret: String,
    /// Login password; `None` disables password login
    pub password: Option<String>,
    /// HMAC key for session cookies
    pub session_key: Vec<u8>,
    /// Session lifetime
    pub session_max_age: Duration,
    /// Adds `Secure` to the session cookie
    pub secure_cookies: bool,
}

impl AdminConfig {
    pub fn url_secret_matches(&self, provided: &str) -> bool {
        constant_time_eq(provided.as_bytes(), self.url_secret.as_bytes())
    }

    pub fn password_matches(&self, provided: &str) -> bool {
        match &self.password {
            Some(expected) if !expected.is_empty() => {
                constant_time_eq(provided.as_bytes(), expected.as_bytes())
            }
            _ => false,
        }
    }

    pub fn signer(&self) -> SessionSigner {
        SessionSigner {
            key: self.session_key.clone(),
            max_age_secs: self.session_max_age.as_secs(),
            secure: self.secure_cookies,
        }
    }
}

/// Random 32-character hex token, used when no URL secret is configured.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Random 32-byte session key.
pub fn generate_key() -> Vec<u8> {
    let mut key = vec![0u8; 32];
    rand::thread_rng().fill_bytes(&mut key);
    key
}

/// Compares two secrets without leaking where they differ or their lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let hash_a = Sha256::digest(a);
    let hash_b = Sha256::digest(b);
    hash_a.ct_eq(&hash_b).into()
}

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Issues and verifies `admin.<expires>.<hmac>` session tokens.
#[derive(Debug, Clone)]
pub struct SessionSigner {
    key: Vec<u8>,
    max_age_secs: u64,
    secure: bool,
}

impl SessionSigner {
    fn mac(&self, payload: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(payload.as_bytes());
        mac
    }

    /// Token valid until `now + max_age`.
    pub fn issue(&self, now: u64) -> String {
        let payload = format!("{}.{}", SESSION_SUBJECT, now + self.max_age_secs);
        let signature = hex::encode(self.mac(&payload).finalize().into_bytes());
        format!("{}.{}", payload, signature)
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str, now: u64) -> bool {
        let Some((payload, signature)) = token.rsplit_once('.') else {
            return false;
        };
        let Some((subject, expires)) = payload.split_once('.') else {
            return false;
        };
        if subject != SESSION_SUBJECT {
            return false;
        }
        let Ok(expires) = expires.parse::<u64>() else {
            return false;
        };
        let Ok(signature) = hex::decode(signature) else {
            return false;
        };
        if self.mac(payload).verify_slice(&signature).is_err() {
            return false;
        }
        now < expires
    }

    pub fn set_cookie_header(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE, token, self.max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn clear_cookie_header(&self) -> String {
        format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
            SESSION_COOKIE
        )
    }
}
