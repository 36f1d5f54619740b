pub mod admin;
pub mod availability;
pub mod booking;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod contact;
pub mod error;
pub mod form;
pub mod session;
pub mod store;
pub mod time;

pub use admin::{BookingFilter, ADMIN_PAGE_ROLES};
pub use availability::{
    slots_heading, AvailabilityCalculator, DayAvailability, SlotAvailability, SlotStatus,
};
pub use booking::Booking;
pub use calendar::{month_options, parse_date, year_options, CalendarDay, MonthGrid};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::SiteConfig;
pub use contact::{submit_contact, Contact, ContactForm, MESSAGE_SUBMITTED};
pub use error::{
    AccessDenied, AuthError, CalendarError, ConfigError, FormError, LoginError, StoreError,
    SubmitError,
};
pub use form::{submit_booking, BookingForm, BOOKING_CONFIRMED};
pub use session::{Page, Role, Session, SessionGate, User, UserCatalog, ANONYMOUS};
pub use store::{KeyValueStore, MemoryStore, Record, RecordStore, Table};
pub use time::{end_time, end_time_label, TimeOfDay};
