/// Username and password for CI sources behind basic authentication.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// Builds credentials only when a non-empty username is configured.
    pub fn from_parts(username: Option<&str>, password: Option<&str>) -> Option<Self> {
        let username = username.filter(|u| !u.is_empty())?;
        Some(Self::new(username, password.map(str::to_owned)))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
