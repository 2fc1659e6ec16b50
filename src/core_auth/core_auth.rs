use crate::config::AuthConfig;
use crate::constants::ANONYMOUS_USER;
use crate::core_auth::helper::verify_password;

/// The credentials a session may log in with, taken from `[auth]`.
#[derive(Debug, Clone)]
pub struct Credentials<'a> {
    config: &'a AuthConfig,
}

impl<'a> Credentials<'a> {
    pub fn new(config: &'a AuthConfig) -> Self {
        Self { config }
    }

    fn is_anonymous(&self, username: &str) -> bool {
        self.config.anonymous && username.eq_ignore_ascii_case(ANONYMOUS_USER)
    }

    /// User names compare case-insensitively.
    pub fn accepts_user(&self, username: &str) -> bool {
        username.eq_ignore_ascii_case(&self.config.username) || self.is_anonymous(username)
    }

    /// Anonymous users may log in with any password.
    pub fn accepts_password(&self, username: &str, password: &str) -> bool {
        if self.is_anonymous(username) {
            return true;
        }
        if !username.eq_ignore_ascii_case(&self.config.username) {
            return false;
        }
        match (&self.config.password_hash, &self.config.password) {
            (Some(hash), _) => verify_password(password, hash),
            (None, Some(plain)) => plain == password,
            (None, None) => false,
        }
    }
}
