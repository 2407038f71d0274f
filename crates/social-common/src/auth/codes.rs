//! One-time numeric codes sent by mail

use rand::Rng;

/// Random numeric code of `len` digits, leading zeros allowed
pub fn generate_numeric_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
