use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use practitioner_cell::models::ScheduleSlot;
use practitioner_cell::services::availability::build_index;

fn slot(year: i32, month: u32, day: u32, hour: u32, min: u32) -> ScheduleSlot {
    let start = Utc.with_ymd_and_hms(year, month, day, hour, min, 0).unwrap();
    ScheduleSlot {
        id: Uuid::new_v4(),
        initial_hour: start,
        final_hour: start + chrono::Duration::minutes(30),
        practitioner: None,
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn groups_slots_by_date_with_sorted_hours() {
    // 2025-03-07 is a Friday; 10th and 11th are Monday and Tuesday.
    let now = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
    let slots = vec![
        slot(2025, 3, 10, 14, 0),
        slot(2025, 3, 10, 9, 0),
        slot(2025, 3, 11, 10, 0),
    ];

    let index = build_index(&slots, now);

    assert_eq!(index.dates(), vec![date(2025, 3, 10), date(2025, 3, 11)]);
    assert_eq!(index.hours_for(date(2025, 3, 10)), ["09:00", "14:00"]);
    assert_eq!(index.hours_for(date(2025, 3, 11)), ["10:00"]);
}

#[test]
fn excludes_weekends_and_non_future_dates() {
    let now = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
    let slots = vec![
        slot(2025, 3, 8, 10, 0),  // Saturday
        slot(2025, 3, 9, 10, 0),  // Sunday
        slot(2025, 3, 7, 18, 0),  // today, even though later than now
        slot(2025, 3, 4, 10, 0),  // past Tuesday
    ];

    let index = build_index(&slots, now);

    assert!(index.is_empty());
}

#[test]
fn slot_ids_resolve_back_from_date_and_hour() {
    let now = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
    let monday = slot(2025, 3, 10, 14, 0);
    let expected = monday.id;

    let index = build_index(&[monday], now);

    assert_eq!(index.slot_id_for(date(2025, 3, 10), "14:00"), Some(expected));
    assert_eq!(index.slot_id_for(date(2025, 3, 10), "15:00"), None);
}

#[test]
fn colliding_slots_keep_last_seen_id_without_duplicate_hours() {
    let now = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
    let first = slot(2025, 3, 10, 14, 0);
    let second = slot(2025, 3, 10, 14, 0);
    let winner = second.id;

    let index = build_index(&[first, second], now);

    assert_eq!(index.hours_for(date(2025, 3, 10)), ["14:00"]);
    assert_eq!(index.slot_id_for(date(2025, 3, 10), "14:00"), Some(winner));
}

#[test]
fn empty_input_builds_empty_index() {
    let now = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
    let index = build_index(&[], now);

    assert!(index.is_empty());
    assert!(index.dates().is_empty());
    assert!(index.hours_for(date(2025, 3, 10)).is_empty());
}
