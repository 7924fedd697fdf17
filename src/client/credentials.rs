use std::{env, fmt, sync::Arc};

/// Environment variable holding the username
pub const USER_VAR: &str = "FTP_USER";
/// Environment variable holding the password
pub const PASSWORD_VAR: &str = "FTP_PASS";

/// Username and password for the remote server.
/// The password is never printed, not even by `Debug`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new<U: Into<String>, P: Into<String>>(user: U, password: P) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Reads [`USER_VAR`] and [`PASSWORD_VAR`]. Unset variables give empty strings.
    pub fn from_env() -> Self {
        Self {
            user: env::var(USER_VAR).unwrap_or_default(),
            password: env::var(PASSWORD_VAR).unwrap_or_default(),
        }
    }

    /// Returns `true` if neither the user nor the password is empty
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"****")
            .finish()
    }
}

/// Resolves credentials each time a connection is opened
pub type CredentialProvider = Arc<dyn Fn() -> Credentials + Send + Sync>;

/// Provider reading the environment, see [`Credentials::from_env`]
pub fn env_provider() -> CredentialProvider {
    Arc::new(Credentials::from_env)
}
