use thiserror::Error;

/// Failure writing a table or session blob to the backing store.
///
/// Reads never produce this: missing or corrupt content degrades to an
/// empty table (or an anonymous session) instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend rejected write to '{key}': {message}")]
    Backend { key: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Backend { .. } => "storage",
            StoreError::Serialization(_) => "serialization",
        }
    }
}

/// Rejected form submission. Field-level detail is intentionally not
/// surfaced for missing input; a single generic notice is shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// Booking form is missing name, email, room, date, start time or duration
    #[error("Fill all required fields")]
    MissingBookingFields,

    /// Contact form is missing name, email or message
    #[error("Please fill required fields")]
    MissingContactFields,

    #[error("Invalid start time: {0}")]
    InvalidStartTime(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
}

impl FormError {
    pub fn code(&self) -> &'static str {
        match self {
            FormError::MissingBookingFields | FormError::MissingContactFields => "missing_fields",
            FormError::InvalidStartTime(_) => "invalid_time",
            FormError::InvalidDuration(_) => "invalid_duration",
        }
    }
}

/// Failure to submit a form, either at validation or at the store.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SubmitError {
    pub fn code(&self) -> &'static str {
        match self {
            SubmitError::Form(e) => e.code(),
            SubmitError::Store(e) => e.code(),
        }
    }
}

/// Credential mismatch. Wrong username, password and role are not
/// distinguished.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials | AuthError::UnknownRole(_) => "invalid_credentials",
        }
    }
}

/// Failure to log in: either a credential mismatch or the session could
/// not be persisted.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LoginError {
    pub fn code(&self) -> &'static str {
        match self {
            LoginError::Auth(e) => e.code(),
            LoginError::Store(e) => e.code(),
        }
    }
}

/// Page access refused by the session gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("Access denied. Please login.")]
    NotLoggedIn,

    #[error("You do not have permission to view this page.")]
    WrongRole,
}

impl AccessDenied {
    pub fn code(&self) -> &'static str {
        match self {
            AccessDenied::NotLoggedIn => "not_logged_in",
            AccessDenied::WrongRole => "forbidden",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Config has no {0}")]
    Empty(&'static str),

    #[error("Durations must be positive whole hours")]
    ZeroDuration,
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        "config"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("Month out of range: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl CalendarError {
    pub fn code(&self) -> &'static str {
        match self {
            CalendarError::InvalidMonth { .. } => "invalid_month",
            CalendarError::InvalidDate(_) => "invalid_date",
        }
    }
}
