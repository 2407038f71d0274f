//! Time-based one-time passwords (RFC 6238, HMAC-SHA1)
//!
//! Secrets are stored as unpadded RFC 4648 base32, the form authenticator
//! apps accept. Codes are 6 digits over a 30 second step, and verification
//! accepts one step of clock drift either way.

use chrono::Utc;
use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;
use url::Url;

use crate::error::AppError;

type HmacSha1 = Hmac<Sha1>;

pub const TOTP_DIGITS: u32 = 6;
pub const TOTP_STEP_SECS: u64 = 30;
const SECRET_LEN: usize = 20;
const DRIFT_STEPS: i64 = 1;

/// New random 160-bit secret, base32-encoded
pub fn generate_totp_secret() -> String {
    let mut secret = [0u8; SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut secret);
    BASE32_NOPAD.encode(&secret)
}

/// `otpauth://` URI an authenticator app can enrol from (usually shown as a
/// QR code)
pub fn provisioning_uri(secret: &str, account: &str, issuer: &str) -> Result<String, AppError> {
    let invalid = || AppError::Internal(anyhow::anyhow!("Invalid TOTP provisioning URI"));

    let mut uri = Url::parse("otpauth://totp/").map_err(|_| invalid())?;
    uri.path_segments_mut()
        .map_err(|()| invalid())?
        .clear()
        .push(&format!("{issuer}:{account}"));
    uri.query_pairs_mut()
        .append_pair("secret", secret)
        .append_pair("issuer", issuer)
        .append_pair("algorithm", "SHA1")
        .append_pair("digits", &TOTP_DIGITS.to_string())
        .append_pair("period", &TOTP_STEP_SECS.to_string());

    Ok(uri.into())
}

fn hotp(key: &[u8], counter: u64) -> Result<u32, AppError> {
    let mut mac = HmacSha1::new_from_slice(key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid TOTP key: {e}")))?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    // dynamic truncation
    let offset = usize::from(digest[digest.len() - 1] & 0x0f);
    let binary = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    Ok(binary % 10u32.pow(TOTP_DIGITS))
}

/// Case and padding are ignored, as authenticator apps do
fn decode_secret(secret: &str) -> Result<Vec<u8>, AppError> {
    let normalized: String = secret
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    BASE32_NOPAD
        .decode(normalized.as_bytes())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Corrupt TOTP secret: {e}")))
}

/// Code for the step containing `unix_secs`
pub fn totp_code_at(secret: &str, unix_secs: u64) -> Result<String, AppError> {
    let key = decode_secret(secret)?;
    let code = hotp(&key, unix_secs / TOTP_STEP_SECS)?;
    Ok(format!("{code:0width$}", width = TOTP_DIGITS as usize))
}

/// Verify `code` against the steps around `unix_secs`
pub fn verify_totp_at(secret: &str, code: &str, unix_secs: u64) -> Result<bool, AppError> {
    let code = code.trim();
    if code.len() != TOTP_DIGITS as usize || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(false);
    }

    let key = decode_secret(secret)?;
    let current = (unix_secs / TOTP_STEP_SECS) as i64;
    for step in (current - DRIFT_STEPS)..=(current + DRIFT_STEPS) {
        if step < 0 {
            continue;
        }
        let expected = hotp(&key, step as u64)?;
        if format!("{expected:0width$}", width = TOTP_DIGITS as usize) == code {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Verify `code` against the current time
pub fn verify_totp(secret: &str, code: &str) -> Result<bool, AppError> {
    verify_totp_at(secret, code, Utc::now().timestamp().max(0) as u64)
}
