//! Role-tagged login gate.
//!
//! This is advisory client-side gating only: the catalog and the comparison
//! both run in the browser, passwords are compared in plaintext, and the
//! session blob echoes the password back. It provides no security boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AccessDenied, AuthError, LoginError, StoreError};
use crate::store::KeyValueStore;

/// Session-store key holding the logged-in user
pub const SESSION_KEY: &str = "user";

/// Creator identity stamped on records made without a session
pub const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Staff,
    Admin,
    Owner,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }

    /// Page a user of this role is sent to after logging in
    pub fn landing_page(self) -> Page {
        match self {
            Role::Staff => Page::Booking,
            // owners use the admin page in its owner view
            Role::Admin | Role::Owner => Page::Admin,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

/// Pages the gate redirects between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Login,
    Booking,
    Admin,
}

impl Page {
    pub fn path(self) -> &'static str {
        match self {
            Page::Login => "login.html",
            Page::Booking => "booking.html",
            Page::Admin => "admin.html",
        }
    }
}

impl AccessDenied {
    /// Denied visitors always go back to the login page
    pub fn redirect(self) -> Page {
        Page::Login
    }
}

/// One credential in the static catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role,
        }
    }
}

/// Immutable credential catalog, built once from config
#[derive(Debug, Clone, Default)]
pub struct UserCatalog {
    users: Vec<User>,
}

impl UserCatalog {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Exact match on username, password and role together
    pub fn authenticate(&self, username: &str, password: &str, role: Role) -> Result<&User, AuthError> {
        self.users
            .iter()
            .find(|u| u.username == username && u.password == password && u.role == role)
            .ok_or(AuthError::InvalidCredentials)
    }
}

/// Current visitor state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(User),
}

impl Session {
    pub fn user(&self) -> Option<&User> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(user) => Some(user),
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    /// Username to stamp on created records
    pub fn creator(&self) -> &str {
        match self {
            Session::Authenticated(user) if !user.username.is_empty() => &user.username,
            _ => ANONYMOUS,
        }
    }

    /// Fails closed: anonymous visitors are always denied, and a required
    /// role must match exactly.
    pub fn check_access(&self, required: Option<Role>) -> Result<(), AccessDenied> {
        let user = self.user().ok_or(AccessDenied::NotLoggedIn)?;
        match required {
            Some(role) if user.role != role => Err(AccessDenied::WrongRole),
            _ => Ok(()),
        }
    }

    /// Like [`Session::check_access`] but any of several roles is accepted
    pub fn check_any_role(&self, allowed: &[Role]) -> Result<(), AccessDenied> {
        let user = self.user().ok_or(AccessDenied::NotLoggedIn)?;
        if allowed.contains(&user.role) {
            Ok(())
        } else {
            Err(AccessDenied::WrongRole)
        }
    }

    /// Navbar role tag, e.g. `Role: ADMIN (admin1)`. Empty when anonymous.
    pub fn nav_label(&self) -> String {
        match self.user() {
            None => String::new(),
            Some(user) if user.username.is_empty() => {
                format!("Role: {}", user.role.as_str().to_uppercase())
            }
            Some(user) => format!(
                "Role: {} ({})",
                user.role.as_str().to_uppercase(),
                user.username
            ),
        }
    }
}

/// Login state machine backed by the browser's session store
#[derive(Debug, Clone)]
pub struct SessionGate<S> {
    catalog: UserCatalog,
    backend: S,
}

impl<S: KeyValueStore> SessionGate<S> {
    pub fn new(catalog: UserCatalog, backend: S) -> Self {
        Self { catalog, backend }
    }

    pub fn catalog(&self) -> &UserCatalog {
        &self.catalog
    }

    /// Current session. Missing or corrupt blobs read as anonymous.
    pub fn current(&self) -> Session {
        let Some(raw) = self.backend.get(SESSION_KEY) else {
            return Session::Anonymous;
        };
        match serde_json::from_str::<Option<User>>(&raw) {
            Ok(Some(user)) => Session::Authenticated(user),
            Ok(None) => Session::Anonymous,
            Err(err) => {
                tracing::warn!(%err, "session blob is corrupt, treating as logged out");
                Session::Anonymous
            }
        }
    }

    /// Anonymous -> Authenticated. Username and password are trimmed; the
    /// role is taken verbatim. Returns the page to redirect to.
    pub fn login(&mut self, username: &str, password: &str, role: &str) -> Result<Page, LoginError> {
        let role: Role = role.parse().map_err(|_| AuthError::InvalidCredentials)?;
        let user = match self.catalog.authenticate(username.trim(), password.trim(), role) {
            Ok(user) => user.clone(),
            Err(err) => {
                tracing::info!(username = username.trim(), role = role.as_str(), "login rejected");
                return Err(err.into());
            }
        };

        let raw = serde_json::to_string(&user).map_err(StoreError::from)?;
        self.backend.set(SESSION_KEY, &raw)?;
        tracing::info!(username = %user.username, role = user.role.as_str(), "logged in");
        Ok(user.role.landing_page())
    }

    /// -> Anonymous. Returns the page to redirect to.
    pub fn logout(&mut self) -> Result<Page, StoreError> {
        self.backend.remove(SESSION_KEY)?;
        tracing::info!("logged out");
        Ok(Page::Login)
    }

    /// Page access check against the stored session
    pub fn guard(&self, required: Option<Role>) -> Result<Session, AccessDenied> {
        let session = self.current();
        session.check_access(required)?;
        Ok(session)
    }
}
