use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};
use crate::session::{Session, SessionStore};

type HmacSha256 = Hmac<Sha256>;

/// Keeps the whole session in the cookie as `base64url(json).hex(hmac)`.
#[derive(Clone)]
pub struct SignedCookieStore {
    key: Vec<u8>,
}

impl SignedCookieStore {
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
        }
    }

    fn sign(&self, payload: &str) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| Error::Session(e.to_string()))?;
        mac.update(payload.as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn decode(&self, token: &str) -> Option<Session> {
        let (payload, signature) = token.split_once('.')?;
        let given = hex::decode(signature).ok()?;
        let expected = self.sign(payload).ok()?;
        if !bool::from(expected.ct_eq(&given)) {
            return None;
        }
        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

impl SessionStore for SignedCookieStore {
    fn load(&self, token: Option<&str>) -> Session {
        let Some(token) = token else {
            return Session::default();
        };
        self.decode(token).unwrap_or_else(|| {
            tracing::debug!("discarding session cookie with a bad signature");
            Session::default()
        })
    }

    fn save(&self, _token: Option<&str>, session: &Session) -> Result<String> {
        let json = serde_json::to_vec(session).map_err(|e| Error::Session(e.to_string()))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = hex::encode(self.sign(&payload)?);
        Ok(format!("{}.{}", payload, signature))
    }

    fn destroy(&self, _token: &str) {}
}
