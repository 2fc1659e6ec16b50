use bcrypt::verify;
use log::warn;

pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    verify(password, hashed_password).unwrap_or_else(|e| {
        warn!("Could not verify password against configured hash: {}", e);
        false
    })
}
