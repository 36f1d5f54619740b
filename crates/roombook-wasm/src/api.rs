use roombook_core::{
    month_options, parse_date, slots_heading, submit_booking, submit_contact,
    year_options, AccessDenied, AvailabilityCalculator, Booking, BookingFilter, BookingForm,
    Clock, Contact, ContactForm, DayAvailability, KeyValueStore, MonthGrid, Page, RecordStore,
    Role, SessionGate, SiteConfig, SlotAvailability, SlotStatus, SystemClock, Table, TimeOfDay,
    ADMIN_PAGE_ROLES, BOOKING_CONFIRMED, MESSAGE_SUBMITTED,
};
use serde::Serialize;
use serde_json::json;
use wasm_bindgen::prelude::*;

use crate::storage::BrowserStorage;

pub const NO_FREE_SLOTS: &str = "No free slots available for this day.";
pub const NO_BOOKINGS: &str = "No bookings yet.";

type Backend = Box<dyn KeyValueStore>;

/// Booking widget exposed to JavaScript.
///
/// Methods called from page scripts return JSON strings; failures come
/// back as `{"error": code, "message": text}` where `message` is the
/// notice to show the user.
#[wasm_bindgen]
pub struct BookingWidget {
    config: SiteConfig,
    records: RecordStore<Backend>,
    gate: SessionGate<Backend>,
    clock: Box<dyn Clock>,
}

/// Structured error object for JavaScript
#[derive(Serialize)]
pub struct JsRoomBookError {
    code: String,
    message: String,
}

impl JsRoomBookError {
    fn new(code: &str, message: impl ToString) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    fn into_js(self) -> JsValue {
        serde_wasm_bindgen::to_value(&self).unwrap_or(JsValue::NULL)
    }
}

fn error_json(code: &str, message: impl ToString) -> String {
    json!({ "error": code, "message": message.to_string() }).to_string()
}

fn denied_json(denied: AccessDenied) -> String {
    json!({
        "allowed": false,
        "error": denied.code(),
        "message": denied.to_string(),
        "redirect": denied.redirect().path(),
    })
    .to_string()
}

fn console_log(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&message.into());
    #[cfg(not(target_arch = "wasm32"))]
    tracing::info!("{message}");
}

fn console_error(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&message.into());
    #[cfg(not(target_arch = "wasm32"))]
    tracing::error!("{message}");
}

/// One rendered time slot
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotData {
    pub time: String,
    pub status: SlotStatus,
    pub selectable: bool,
}

impl From<&SlotAvailability> for SlotData {
    fn from(slot: &SlotAvailability) -> Self {
        SlotData {
            time: slot.time.to_string(),
            status: slot.status,
            selectable: slot.is_selectable(),
        }
    }
}

/// One entry of the booking list
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListItem<'a> {
    pub summary: String,
    pub booking: &'a Booking,
}

#[wasm_bindgen]
impl BookingWidget {
    /// Widget with the default site config, backed by the browser's
    /// localStorage (records) and sessionStorage (login)
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<BookingWidget, JsValue> {
        Self::open(SiteConfig::default())
    }

    /// Widget with a JSON site config; unspecified keys keep their defaults
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config_json: &str) -> Result<BookingWidget, JsValue> {
        let config = SiteConfig::from_json(config_json)
            .map_err(|e| JsRoomBookError::new(e.code(), e).into_js())?;
        Self::open(config)
    }

    // ---- Session gate ----

    /// Returns `{"redirect": page}` or an error object
    pub fn login(&mut self, username: &str, password: &str, role: &str) -> String {
        match self.gate.login(username, password, role) {
            Ok(page) => json!({ "redirect": page.path() }).to_string(),
            Err(e) => error_json(e.code(), e),
        }
    }

    /// Returns the page to redirect to
    pub fn logout(&mut self) -> String {
        if let Err(e) = self.gate.logout() {
            console_error(&format!("logout: {e}"));
        }
        Page::Login.path().to_string()
    }

    /// The stored user record, or null when logged out
    #[wasm_bindgen(js_name = currentUser)]
    pub fn current_user(&self) -> JsValue {
        match self.gate.current().user() {
            Some(user) => serde_wasm_bindgen::to_value(user).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    #[wasm_bindgen(js_name = isLoggedIn)]
    pub fn is_logged_in(&self) -> bool {
        self.gate.current().is_authenticated()
    }

    /// Navbar role tag; empty when logged out (hide the logout button then)
    #[wasm_bindgen(js_name = navLabel)]
    pub fn nav_label(&self) -> String {
        self.gate.current().nav_label()
    }

    /// Page guard. `requiredRole` may be omitted to accept any logged-in user.
    /// An unrecognised role name denies access.
    #[wasm_bindgen(js_name = checkAccess)]
    pub fn check_access(&self, required_role: Option<String>) -> String {
        let required = match required_role.as_deref().map(str::parse::<Role>) {
            None => None,
            Some(Ok(role)) => Some(role),
            Some(Err(_)) => {
                let denied = if self.gate.current().is_authenticated() {
                    AccessDenied::WrongRole
                } else {
                    AccessDenied::NotLoggedIn
                };
                return denied_json(denied);
            }
        };
        match self.gate.guard(required) {
            Ok(_) => json!({ "allowed": true }).to_string(),
            Err(denied) => denied_json(denied),
        }
    }

    /// Guard for the admin page, which admins and owners share
    #[wasm_bindgen(js_name = checkAdminAccess)]
    pub fn check_admin_access(&self) -> String {
        match self.gate.current().check_any_role(&ADMIN_PAGE_ROLES) {
            Ok(()) => json!({ "allowed": true }).to_string(),
            Err(denied) => denied_json(denied),
        }
    }

    // ---- Selectors ----

    pub fn rooms(&self) -> String {
        serde_json::to_string(&self.config.rooms).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn durations(&self) -> String {
        serde_json::to_string(&self.config.durations).unwrap_or_else(|_| "[]".to_string())
    }

    /// Usernames for the "Admin In-charge" select
    #[wasm_bindgen(js_name = adminOptions)]
    pub fn admin_options(&self) -> String {
        serde_json::to_string(&self.config.admin_options()).unwrap_or_else(|_| "[]".to_string())
    }

    /// `[{"value": 1, "label": "January"}, ...]`
    #[wasm_bindgen(js_name = monthOptions)]
    pub fn month_options(&self) -> String {
        let options: Vec<_> = month_options()
            .into_iter()
            .map(|(value, label)| json!({ "value": value, "label": label }))
            .collect();
        serde_json::Value::from(options).to_string()
    }

    #[wasm_bindgen(js_name = yearOptions)]
    pub fn year_options(&self) -> String {
        let today = self.clock.now().date();
        serde_json::to_string(&year_options(today)).unwrap_or_else(|_| "[]".to_string())
    }

    // ---- Calendar and availability ----

    /// Month grid for a 1-based month
    pub fn calendar(&self, year: i32, month: u32) -> String {
        let today = self.clock.now().date();
        match MonthGrid::build(year, month, today) {
            Ok(grid) => json!({ "title": grid.title(), "grid": grid }).to_string(),
            Err(e) => error_json(e.code(), e),
        }
    }

    /// Slot panel for a day. When no slot is selectable the slot list is
    /// replaced by the "no free slots" notice.
    pub fn slots(&self, date: &str, room: &str) -> String {
        let date = match parse_date(date) {
            Ok(date) => date,
            Err(e) => return error_json(e.code(), e),
        };
        let bookings = self.records.read_table::<Booking>();
        let calculator = AvailabilityCalculator::new(&self.config.slot_times);
        let heading = slots_heading(date, room);

        match calculator.day(date, room, &bookings, self.clock.now()) {
            DayAvailability::Open(slots) => {
                let slots: Vec<SlotData> = slots.iter().map(SlotData::from).collect();
                json!({ "heading": heading, "noFreeSlots": false, "slots": slots }).to_string()
            }
            DayAvailability::NoFreeSlots => json!({
                "heading": heading,
                "noFreeSlots": true,
                "message": NO_FREE_SLOTS,
            })
            .to_string(),
        }
    }

    /// Pre-filled booking form for a clicked slot
    #[wasm_bindgen(js_name = selectSlot)]
    pub fn select_slot(&self, date: &str, time: &str, room: &str, duration: &str) -> String {
        let (Ok(day), Some(start)) = (parse_date(date), TimeOfDay::parse(time)) else {
            return error_json("slot_unavailable", "This slot is not available");
        };
        let bookings = self.records.read_table::<Booking>();
        let calculator = AvailabilityCalculator::new(&self.config.slot_times);
        let slot = calculator
            .classify(day, room, &bookings, self.clock.now())
            .into_iter()
            .find(|s| s.time == start);

        match slot.and_then(|s| BookingForm::for_slot(day, &s, room, duration)) {
            Some(form) => serde_json::to_string(&form)
                .unwrap_or_else(|e| error_json("serialization", e)),
            None => error_json("slot_unavailable", "This slot is not available"),
        }
    }

    /// End time for the read-only field; empty if either input is missing
    #[wasm_bindgen(js_name = endTime)]
    pub fn end_time(&self, start: &str, duration: &str) -> String {
        roombook_core::end_time_label(start, duration)
    }

    // ---- Bookings ----

    /// Validate and save a booking form (JSON). On success returns the
    /// stored record, the confirmation notice and the cleared form.
    #[wasm_bindgen(js_name = submitBooking)]
    pub fn submit_booking(&mut self, form_json: &str) -> String {
        let mut form: BookingForm = match serde_json::from_str(form_json) {
            Ok(form) => form,
            Err(e) => return error_json("invalid_form", e),
        };
        let session = self.gate.current();
        match submit_booking(&mut self.records, &mut form, &session, self.clock.as_ref()) {
            Ok(booking) => {
                console_log(&format!("booking saved for {} on {}", booking.room, booking.date));
                json!({ "booking": booking, "message": BOOKING_CONFIRMED, "form": form }).to_string()
            }
            Err(e) => error_json(e.code(), e),
        }
    }

    /// Bookings in insertion order, with their one-line summaries
    #[wasm_bindgen(js_name = listBookings)]
    pub fn list_bookings(&self) -> String {
        let bookings = self.records.read_table::<Booking>();
        if bookings.is_empty() {
            return json!({ "items": [], "showClear": false, "message": NO_BOOKINGS }).to_string();
        }
        let items: Vec<BookingListItem> = bookings
            .iter()
            .map(|booking| BookingListItem {
                summary: booking.summary(),
                booking,
            })
            .collect();
        json!({ "items": items, "showClear": true }).to_string()
    }

    /// Remove every booking. The confirmation prompt is the page's job.
    #[wasm_bindgen(js_name = clearBookings)]
    pub fn clear_bookings(&mut self) -> bool {
        match self.records.clear(Table::Bookings) {
            Ok(()) => true,
            Err(e) => {
                console_error(&format!("clear bookings: {e}"));
                false
            }
        }
    }

    /// Admin view: bookings matching a JSON filter. Admins and owners only.
    #[wasm_bindgen(js_name = filterBookings)]
    pub fn filter_bookings(&self, filter_json: &str) -> String {
        if let Err(denied) = self.gate.current().check_any_role(&ADMIN_PAGE_ROLES) {
            return denied_json(denied);
        }
        let filter: BookingFilter = match serde_json::from_str(filter_json) {
            Ok(filter) => filter,
            Err(e) => return error_json("invalid_filter", e),
        };
        let bookings = self.records.read_table::<Booking>();
        let found = filter.apply(&bookings);
        json!({ "count": found.len(), "items": found }).to_string()
    }

    // ---- Contact ----

    #[wasm_bindgen(js_name = submitContact)]
    pub fn submit_contact(&mut self, form_json: &str) -> String {
        let mut form: ContactForm = match serde_json::from_str(form_json) {
            Ok(form) => form,
            Err(e) => return error_json("invalid_form", e),
        };
        match submit_contact(&mut self.records, &mut form, self.clock.as_ref()) {
            Ok(contact) => json!({ "contact": contact, "message": MESSAGE_SUBMITTED }).to_string(),
            Err(e) => error_json(e.code(), e),
        }
    }

    /// Contact messages for the admin page. Admins and owners only.
    #[wasm_bindgen(js_name = listContacts)]
    pub fn list_contacts(&self) -> String {
        if let Err(denied) = self.gate.current().check_any_role(&ADMIN_PAGE_ROLES) {
            return denied_json(denied);
        }
        let contacts = self.records.read_table::<Contact>();
        json!({ "count": contacts.len(), "items": contacts }).to_string()
    }
}

impl BookingWidget {
    /// Assemble a widget from explicit parts. Page scripts go through the
    /// exported constructors; tests inject in-memory stores and a fixed clock.
    pub fn with_backends(
        config: SiteConfig,
        records: Backend,
        session: Backend,
        clock: Box<dyn Clock>,
    ) -> Self {
        let gate = SessionGate::new(config.user_catalog(), session);
        Self {
            config,
            records: RecordStore::new(records),
            gate,
            clock,
        }
    }

    fn open(config: SiteConfig) -> Result<Self, JsValue> {
        let records = BrowserStorage::local()?;
        let session = BrowserStorage::session()?;
        Ok(Self::with_backends(
            config,
            Box::new(records),
            Box::new(session),
            Box::new(SystemClock),
        ))
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roombook_core::{FixedClock, MemoryStore};
    use serde_json::Value;

    fn widget_at(now: &str) -> BookingWidget {
        BookingWidget::with_backends(
            SiteConfig::default(),
            Box::new(MemoryStore::new()),
            Box::new(MemoryStore::new()),
            Box::new(FixedClock::at(now).unwrap()),
        )
    }

    fn widget() -> BookingWidget {
        widget_at("2024-05-30T08:00")
    }

    fn parse(raw: &str) -> Value {
        serde_json::from_str(raw).unwrap()
    }

    fn booking_form(time: &str, duration: &str) -> String {
        json!({
            "name": "Ada",
            "email": "ada@example.com",
            "phone": "555-0100",
            "room": "Room A",
            "date": "2024-06-01",
            "time": time,
            "duration": duration,
            "assignedAdmin": "admin1",
        })
        .to_string()
    }

    #[test]
    fn test_booking_flow_marks_slots_taken() {
        let mut widget = widget();
        widget.login("staff1", "staff123", "staff");

        let result = parse(&widget.submit_booking(&booking_form("10:00", "2")));
        assert_eq!(result["message"], BOOKING_CONFIRMED);
        assert_eq!(result["booking"]["endTime"], "12:00");
        assert_eq!(result["booking"]["bookedBy"], "staff1");
        assert_eq!(result["form"]["name"], "");

        let slots = parse(&widget.slots("2024-06-01", "Room A"));
        assert_eq!(slots["heading"], "Available slots for 01/06/2024 in Room A");
        let statuses: Vec<(String, String)> = slots["slots"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| (s["time"].as_str().unwrap().to_string(), s["status"].as_str().unwrap().to_string()))
            .collect();
        assert_eq!(statuses[0], ("09:00".to_string(), "free".to_string()));
        assert_eq!(statuses[1], ("10:00".to_string(), "taken".to_string()));
        assert_eq!(statuses[2], ("11:00".to_string(), "taken".to_string()));
        assert_eq!(statuses[3], ("12:00".to_string(), "free".to_string()));

        let other_room = parse(&widget.slots("2024-06-01", "Room B"));
        assert!(other_room["slots"].as_array().unwrap().iter().all(|s| s["selectable"] == true));
    }

    #[test]
    fn test_submit_missing_fields() {
        let mut widget = widget();
        let result = parse(&widget.submit_booking(r#"{"name": "Ada"}"#));
        assert_eq!(result["error"], "missing_fields");
        assert_eq!(result["message"], "Fill all required fields");
        assert_eq!(parse(&widget.list_bookings())["items"], json!([]));
    }

    #[test]
    fn test_submit_rejects_non_json() {
        let mut widget = widget();
        let result = parse(&widget.submit_booking("name=Ada"));
        assert_eq!(result["error"], "invalid_form");
    }

    #[test]
    fn test_anonymous_booking_and_list() {
        let mut widget = widget();
        let empty = parse(&widget.list_bookings());
        assert_eq!(empty["message"], NO_BOOKINGS);
        assert_eq!(empty["showClear"], false);

        widget.submit_booking(&booking_form("09:00", "1"));
        widget.submit_booking(&booking_form("13:00", "3"));
        let list = parse(&widget.list_bookings());
        let items = list["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["booking"]["bookedBy"], "anonymous");
        assert_eq!(
            items[1]["summary"],
            "Ada booked Room A on 2024-06-01 13:00–16:00 (3h) — Admin: admin1"
        );
        assert_eq!(list["showClear"], true);

        assert!(widget.clear_bookings());
        assert_eq!(parse(&widget.list_bookings())["items"], json!([]));
    }

    #[test]
    fn test_fully_booked_day() {
        let mut widget = widget();
        widget.submit_booking(&booking_form("09:00", "9"));
        let slots = parse(&widget.slots("2024-06-01", "Room A"));
        assert_eq!(slots["noFreeSlots"], true);
        assert_eq!(slots["message"], NO_FREE_SLOTS);
        assert!(slots.get("slots").is_none());
    }

    #[test]
    fn test_past_slots_today() {
        let widget = widget_at("2024-06-01T12:30");
        let slots = parse(&widget.slots("2024-06-01", "Room A"));
        let slots = slots["slots"].as_array().unwrap();
        assert_eq!(slots[3]["time"], "12:00");
        assert_eq!(slots[3]["status"], "past");
        assert_eq!(slots[4]["status"], "free");
    }

    #[test]
    fn test_slots_bad_date() {
        let widget = widget();
        assert_eq!(parse(&widget.slots("tomorrow", "Room A"))["error"], "invalid_date");
    }

    #[test]
    fn test_select_slot() {
        let mut widget = widget();
        let form = parse(&widget.select_slot("2024-06-01", "16:00", "Room A", "2"));
        assert_eq!(form["time"], "16:00");
        assert_eq!(form["endTime"], "18:00");
        assert_eq!(form["room"], "Room A");

        widget.submit_booking(&booking_form("16:00", "1"));
        let taken = parse(&widget.select_slot("2024-06-01", "16:00", "Room A", "2"));
        assert_eq!(taken["error"], "slot_unavailable");
        let off_catalog = parse(&widget.select_slot("2024-06-01", "18:00", "Room A", "2"));
        assert_eq!(off_catalog["error"], "slot_unavailable");
    }

    #[test]
    fn test_end_time() {
        let widget = widget();
        assert_eq!(widget.end_time("23:00", "2"), "01:00");
        assert_eq!(widget.end_time("", "2"), "");
    }

    #[test]
    fn test_login_and_access() {
        let mut widget = widget();
        let denied = parse(&widget.check_access(None));
        assert_eq!(denied["allowed"], false);
        assert_eq!(denied["message"], "Access denied. Please login.");
        assert_eq!(denied["redirect"], "login.html");

        let bad = parse(&widget.login("staff1", "staff123", "admin"));
        assert_eq!(bad["message"], "Invalid credentials");
        assert!(!widget.is_logged_in());

        let ok = parse(&widget.login("staff1", "staff123", "staff"));
        assert_eq!(ok["redirect"], "booking.html");
        assert_eq!(widget.nav_label(), "Role: STAFF (staff1)");
        assert_eq!(parse(&widget.check_access(Some("staff".into())))["allowed"], true);

        let wrong = parse(&widget.check_access(Some("admin".into())));
        assert_eq!(wrong["message"], "You do not have permission to view this page.");
        assert_eq!(parse(&widget.check_access(Some("root".into())))["error"], "forbidden");
        assert_eq!(parse(&widget.check_admin_access())["allowed"], false);

        assert_eq!(widget.logout(), "login.html");
        assert_eq!(widget.nav_label(), "");
    }

    #[test]
    fn test_admin_filter_requires_admin_or_owner() {
        let mut widget = widget();
        widget.submit_booking(&booking_form("09:00", "1"));
        assert_eq!(parse(&widget.filter_bookings("{}"))["error"], "not_logged_in");

        widget.login("owner", "owner123", "owner");
        let all = parse(&widget.filter_bookings("{}"));
        assert_eq!(all["count"], 1);
        let none = parse(&widget.filter_bookings(r#"{"room": "Room C"}"#));
        assert_eq!(none["count"], 0);
        assert_eq!(parse(&widget.filter_bookings("["))["error"], "invalid_filter");
    }

    #[test]
    fn test_contact_submission() {
        let mut widget = widget();
        let missing = parse(&widget.submit_contact(r#"{"name": "Grace", "email": "g@example.com"}"#));
        assert_eq!(missing["message"], "Please fill required fields");

        let ok = parse(&widget.submit_contact(
            r#"{"name": "Grace", "email": "g@example.com", "message": "Hi"}"#,
        ));
        assert_eq!(ok["message"], MESSAGE_SUBMITTED);
        assert_eq!(ok["contact"]["createdAt"], "2024-05-30T08:00:00.000Z");

        widget.login("admin1", "admin123", "admin");
        assert_eq!(parse(&widget.list_contacts())["count"], 1);
    }

    #[test]
    fn test_selectors() {
        let widget = widget();
        assert_eq!(parse(&widget.rooms()), json!(["Room A", "Room B", "Room C"]));
        assert_eq!(parse(&widget.durations()), json!([1, 2, 3, 4]));
        assert_eq!(parse(&widget.admin_options()), json!(["admin1"]));
        assert_eq!(parse(&widget.year_options()), json!([2023, 2024, 2025, 2026]));
        assert_eq!(parse(&widget.month_options())[5]["label"], "June");
    }

    #[test]
    fn test_calendar() {
        let widget = widget();
        let cal = parse(&widget.calendar(2024, 5));
        assert_eq!(cal["title"], "May 2024");
        assert_eq!(cal["grid"]["leadingBlanks"], 3);
        assert_eq!(cal["grid"]["days"][28]["past"], true);
        assert_eq!(cal["grid"]["days"][29]["today"], true);
        assert_eq!(parse(&widget.calendar(2024, 13))["error"], "invalid_month");
    }
}
