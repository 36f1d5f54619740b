use serde::{Deserialize, Serialize};

use crate::booking::Booking;
use crate::session::Role;

/// Roles allowed onto the admin page
pub const ADMIN_PAGE_ROLES: [Role; 2] = [Role::Admin, Role::Owner];

/// Criteria for the admin booking view. Unset or blank criteria match
/// everything; set criteria are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingFilter {
    pub room: Option<String>,
    pub date: Option<String>,
    pub assigned_admin: Option<String>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        criterion(&self.room).map_or(true, |room| booking.room == room)
            && criterion(&self.date).map_or(true, |date| booking.date == date)
            && criterion(&self.assigned_admin)
                .map_or(true, |admin| booking.assigned_admin.as_deref() == Some(admin))
    }

    /// Matching bookings, in stored order
    pub fn apply<'a>(&self, bookings: &'a [Booking]) -> Vec<&'a Booking> {
        bookings.iter().filter(|b| self.matches(b)).collect()
    }
}

fn criterion(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(room: &str, date: &str, admin: Option<&str>) -> Booking {
        Booking {
            room: room.into(),
            date: date.into(),
            assigned_admin: admin.map(String::from),
            ..Booking::default()
        }
    }

    fn sample() -> Vec<Booking> {
        vec![
            booking("Room A", "2024-06-01", Some("admin1")),
            booking("Room B", "2024-06-01", None),
            booking("Room A", "2024-06-02", Some("admin2")),
        ]
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let bookings = sample();
        assert_eq!(BookingFilter::default().apply(&bookings).len(), 3);

        let blank = BookingFilter {
            room: Some("  ".into()),
            ..BookingFilter::default()
        };
        assert_eq!(blank.apply(&bookings).len(), 3);
    }

    #[test]
    fn test_criteria_are_anded() {
        let bookings = sample();
        let filter = BookingFilter {
            room: Some("Room A".into()),
            date: Some("2024-06-01".into()),
            assigned_admin: None,
        };
        let found = filter.apply(&bookings);
        assert_eq!(found, vec![&bookings[0]]);

        let filter = BookingFilter {
            assigned_admin: Some("admin2".into()),
            ..BookingFilter::default()
        };
        assert_eq!(filter.apply(&bookings), vec![&bookings[2]]);
    }

    #[test]
    fn test_deserialize_from_ui() {
        let filter: BookingFilter = serde_json::from_str(r#"{"room": "Room B"}"#).unwrap();
        assert_eq!(filter.room.as_deref(), Some("Room B"));
        assert_eq!(filter.date, None);
    }
}
