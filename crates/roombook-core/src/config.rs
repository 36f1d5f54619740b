use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::session::{Role, User, UserCatalog};
use crate::time::TimeOfDay;

/// Static site configuration, loaded once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    /// Bookable rooms, in display order
    pub rooms: Vec<String>,
    /// Start times of the hourly slots shown for a day
    pub slot_times: Vec<TimeOfDay>,
    /// Durations (whole hours) offered by the booking form
    pub durations: Vec<u32>,
    /// The credential catalog
    pub users: Vec<User>,
    /// Offered as admin in-charge when the catalog has no admin users
    pub fallback_admin: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            rooms: vec!["Room A".into(), "Room B".into(), "Room C".into()],
            slot_times: default_slot_times(),
            durations: vec![1, 2, 3, 4],
            users: vec![
                User::new("staff1", "staff123", Role::Staff),
                User::new("admin1", "admin123", Role::Admin),
                User::new("owner", "owner123", Role::Owner),
            ],
            fallback_admin: "admin1".into(),
        }
    }
}

/// 09:00 through 17:00, one per hour
fn default_slot_times() -> Vec<TimeOfDay> {
    (9..=17).filter_map(|hour| TimeOfDay::new(hour, 0)).collect()
}

impl SiteConfig {
    /// Parse and validate a JSON config. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rooms.is_empty() {
            return Err(ConfigError::Empty("rooms"));
        }
        if self.slot_times.is_empty() {
            return Err(ConfigError::Empty("slot times"));
        }
        if self.durations.is_empty() {
            return Err(ConfigError::Empty("durations"));
        }
        if self.durations.contains(&0) {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(())
    }

    /// Build the immutable credential catalog from the configured users
    pub fn user_catalog(&self) -> UserCatalog {
        UserCatalog::new(self.users.clone())
    }

    /// Room preselected when nothing else picks one
    pub fn default_room(&self) -> &str {
        self.rooms.first().map(String::as_str).unwrap_or("Room A")
    }

    /// Usernames offered in the "Admin In-charge" selector
    pub fn admin_options(&self) -> Vec<String> {
        let admins: Vec<String> = self
            .users
            .iter()
            .filter(|u| u.role == Role::Admin)
            .map(|u| u.username.clone())
            .collect();
        if admins.is_empty() {
            vec![self.fallback_admin.clone()]
        } else {
            admins
        }
    }
}
