use roombook_core::{
    slots_heading, submit_booking, AvailabilityCalculator, Booking, BookingForm, Clock, DayAvailability,
    FixedClock, MemoryStore, RecordStore, Session, SessionGate, SiteConfig,
};

fn main() {
    let config = SiteConfig::default();
    let clock = FixedClock::at("2024-06-01T10:30").unwrap();
    let mut store = RecordStore::new(MemoryStore::new());

    // Example 1: log in as staff and make two bookings
    println!("=== Example 1: Booking as staff1 ===");
    let mut gate = SessionGate::new(config.user_catalog(), MemoryStore::new());
    let page = gate.login("staff1", "staff123", "staff").unwrap();
    println!("Logged in, redirect to {}", page.path());
    let session = gate.current();

    for (time, duration) in [("13:00", "2"), ("16:00", "1")] {
        let mut form = BookingForm {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            room: "Room A".into(),
            date: "2024-06-01".into(),
            time: time.into(),
            duration: duration.into(),
            ..BookingForm::default()
        };
        let booking = submit_booking(&mut store, &mut form, &session, &clock).unwrap();
        println!("  - {}", booking.summary());
    }

    // Example 2: availability for today, mid-morning
    println!("\n=== Example 2: Availability for Room A ===");
    let date = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let bookings = store.read_table::<Booking>();
    let calculator = AvailabilityCalculator::new(&config.slot_times);
    println!("{}", slots_heading(date, "Room A"));
    match calculator.day(date, "Room A", &bookings, clock.now()) {
        DayAvailability::Open(slots) => {
            for slot in slots {
                println!("  {} {:?}", slot.time, slot.status);
            }
        }
        DayAvailability::NoFreeSlots => println!("  No free slots available for this day."),
    }

    // Example 3: anonymous visitors are turned away from the booking page
    println!("\n=== Example 3: Access check ===");
    match Session::Anonymous.check_access(None) {
        Ok(()) => println!("  allowed"),
        Err(denied) => println!("  {} -> {}", denied, denied.redirect().path()),
    }
}
