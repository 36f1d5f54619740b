use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::availability::SlotAvailability;
use crate::booking::{Booking, DATE_FORMAT};
use crate::clock::{iso_timestamp, Clock};
use crate::error::{FormError, SubmitError};
use crate::session::Session;
use crate::store::{KeyValueStore, RecordStore};
use crate::time::{end_time, end_time_label, parse_duration, TimeOfDay};

pub const BOOKING_CONFIRMED: &str = "Booking confirmed ✅";

/// Raw booking form input, as read from the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub room: String,
    pub date: String,
    pub time: String,
    pub duration: String,
    /// Read-only display field, recomputed from time and duration
    pub end_time: String,
    pub description: String,
    pub assigned_admin: String,
}

impl BookingForm {
    /// Form pre-filled from a clicked slot. Taken or past slots give None.
    pub fn for_slot(date: NaiveDate, slot: &SlotAvailability, room: &str, duration: &str) -> Option<Self> {
        if !slot.is_selectable() {
            return None;
        }
        let mut form = BookingForm {
            room: room.to_string(),
            date: date.format(DATE_FORMAT).to_string(),
            time: slot.time.to_string(),
            ..BookingForm::default()
        };
        form.set_duration(duration);
        Some(form)
    }

    /// Change the duration and refresh the displayed end time
    pub fn set_duration(&mut self, duration: &str) {
        self.duration = duration.to_string();
        self.end_time = end_time_label(&self.time, &self.duration);
    }

    pub fn reset(&mut self) {
        *self = BookingForm::default();
    }

    /// Check required fields and build the record to store.
    ///
    /// Name, email, room, date, start time and duration are required;
    /// phone, description and assigned admin are optional.
    pub fn validate(&self, session: &Session, clock: &dyn Clock) -> Result<Booking, FormError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let required = [
            name,
            email,
            self.room.as_str(),
            self.date.as_str(),
            self.time.as_str(),
            self.duration.as_str(),
        ];
        if required.iter().any(|field| field.is_empty()) {
            return Err(FormError::MissingBookingFields);
        }

        let start = TimeOfDay::parse(&self.time)
            .ok_or_else(|| FormError::InvalidStartTime(self.time.clone()))?;
        let duration = parse_duration(&self.duration)
            .ok_or_else(|| FormError::InvalidDuration(self.duration.clone()))?;
        let assigned_admin = Some(self.assigned_admin.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        Ok(Booking {
            name: name.to_string(),
            email: email.to_string(),
            phone: self.phone.trim().to_string(),
            room: self.room.clone(),
            date: self.date.clone(),
            time: start.to_string(),
            duration,
            end_time: end_time(start, duration).to_string(),
            description: self.description.trim().to_string(),
            booked_by: session.creator().to_string(),
            assigned_admin,
            created_at: iso_timestamp(clock.timestamp()),
        })
    }
}

/// Validate, append to the bookings table, and clear the form.
///
/// Overlap with existing bookings is not checked here; availability is
/// advisory and only surfaced when slots are rendered.
pub fn submit_booking<S: KeyValueStore>(
    store: &mut RecordStore<S>,
    form: &mut BookingForm,
    session: &Session,
    clock: &dyn Clock,
) -> Result<Booking, SubmitError> {
    let booking = form.validate(session, clock)?;
    let total = store.append(booking.clone())?;
    tracing::info!(
        room = %booking.room,
        date = %booking.date,
        time = %booking.time,
        booked_by = %booking.booked_by,
        total,
        "booking saved"
    );
    form.reset();
    Ok(booking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::SlotStatus;
    use crate::clock::FixedClock;
    use crate::session::{Role, User};
    use crate::store::MemoryStore;

    fn filled() -> BookingForm {
        BookingForm {
            name: " Ada ".into(),
            email: "ada@example.com".into(),
            phone: "".into(),
            room: "Room A".into(),
            date: "2024-06-01".into(),
            time: "23:00".into(),
            duration: "2".into(),
            ..BookingForm::default()
        }
    }

    fn clock() -> FixedClock {
        FixedClock::at("2024-05-30T08:00").unwrap()
    }

    #[test]
    fn test_submit_derives_end_time_and_stamps() {
        let mut store = RecordStore::new(MemoryStore::new());
        let mut form = filled();
        let session = Session::Authenticated(User::new("staff1", "staff123", Role::Staff));

        let booking = submit_booking(&mut store, &mut form, &session, &clock()).unwrap();
        assert_eq!(booking.name, "Ada");
        assert_eq!(booking.end_time, "01:00");
        assert_eq!(booking.duration, 2);
        assert_eq!(booking.booked_by, "staff1");
        assert_eq!(booking.assigned_admin, None);
        assert_eq!(booking.created_at, "2024-05-30T08:00:00.000Z");

        assert_eq!(form, BookingForm::default());
        assert_eq!(store.read_table::<Booking>(), vec![booking]);
    }

    #[test]
    fn test_anonymous_creator() {
        let mut store = RecordStore::new(MemoryStore::new());
        let booking = submit_booking(&mut store, &mut filled(), &Session::Anonymous, &clock()).unwrap();
        assert_eq!(booking.booked_by, "anonymous");
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let mut store = RecordStore::new(MemoryStore::new());
        let blanks: [fn(&mut BookingForm); 6] = [
            |f| f.name = "   ".into(),
            |f| f.email.clear(),
            |f| f.room.clear(),
            |f| f.date.clear(),
            |f| f.time.clear(),
            |f| f.duration.clear(),
        ];
        for blank in blanks {
            let mut form = filled();
            blank(&mut form);
            let before = form.clone();
            let err = submit_booking(&mut store, &mut form, &Session::Anonymous, &clock()).unwrap_err();
            assert!(matches!(err, SubmitError::Form(FormError::MissingBookingFields)));
            assert_eq!(form, before, "rejected form must not be cleared");
        }
        assert!(store.read_table::<Booking>().is_empty());
    }

    #[test]
    fn test_optional_fields() {
        let mut form = filled();
        form.description = "  quarterly review ".into();
        form.assigned_admin = "admin1".into();
        let booking = form.validate(&Session::Anonymous, &clock()).unwrap();
        assert_eq!(booking.description, "quarterly review");
        assert_eq!(booking.assigned_admin.as_deref(), Some("admin1"));
    }

    #[test]
    fn test_malformed_time_and_duration() {
        let mut form = filled();
        form.time = "late".into();
        assert_eq!(
            form.validate(&Session::Anonymous, &clock()),
            Err(FormError::InvalidStartTime("late".into()))
        );

        let mut form = filled();
        form.duration = "0".into();
        assert_eq!(
            form.validate(&Session::Anonymous, &clock()),
            Err(FormError::InvalidDuration("0".into()))
        );
    }

    #[test]
    fn test_overlapping_bookings_both_saved() {
        let mut store = RecordStore::new(MemoryStore::new());
        submit_booking(&mut store, &mut filled(), &Session::Anonymous, &clock()).unwrap();
        submit_booking(&mut store, &mut filled(), &Session::Anonymous, &clock()).unwrap();
        assert_eq!(store.read_table::<Booking>().len(), 2);
    }

    #[test]
    fn test_for_slot_prefill() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let free = SlotAvailability {
            time: TimeOfDay::new(16, 0).unwrap(),
            status: SlotStatus::Free,
        };
        let form = BookingForm::for_slot(date, &free, "Room B", "3").unwrap();
        assert_eq!(form.date, "2024-06-01");
        assert_eq!(form.time, "16:00");
        assert_eq!(form.room, "Room B");
        assert_eq!(form.end_time, "19:00");

        let no_duration = BookingForm::for_slot(date, &free, "Room B", "").unwrap();
        assert_eq!(no_duration.end_time, "");

        let taken = SlotAvailability { status: SlotStatus::Taken, ..free };
        assert!(BookingForm::for_slot(date, &taken, "Room B", "1").is_none());
    }

    #[test]
    fn test_set_duration_refreshes_end_time() {
        let mut form = filled();
        form.set_duration("4");
        assert_eq!(form.end_time, "03:00");
        form.set_duration("");
        assert_eq!(form.end_time, "");
    }
}
