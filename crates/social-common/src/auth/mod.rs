//! Credential utilities: password hashing, TOTP and one-time codes

mod codes;
mod password;
mod totp;

pub use codes::generate_numeric_code;
pub use password::{hash_password, validate_password_strength, verify_password, PasswordService};
pub use totp::{
    generate_totp_secret, provisioning_uri, totp_code_at, verify_totp, verify_totp_at, TOTP_DIGITS,
    TOTP_STEP_SECS,
};
