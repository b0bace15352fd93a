// tests/extract_fixture.rs
use std::fs;

use chrono::Weekday;
use urnik_scrape::engine::{extract, ClassEntry, Resolution};

fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {path}: {e}"))
}

/// (slot, subject, teacher, room, skupina)
fn summary(c: &ClassEntry) -> (u8, &str, &str, &str, Option<u8>) {
    (
        c.time_slot,
        c.subject.as_str(),
        c.teacher.as_deref().unwrap_or(""),
        c.room.as_deref().unwrap_or(""),
        c.sub_group_number,
    )
}

#[test]
fn week_41_matches_the_published_timetable() {
    let sched = extract(&fixture("rai2_week41.htm"), "6.10.2025");

    assert_eq!(sched.class_name, "RAI 2.l");
    assert_eq!(sched.week_label, "6.10.2025");

    let labels: Vec<&str> = sched.days.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Ponedeljek 6.10.", "Torek 7.10.", "Sreda 8.10.", "Četrtek 9.10.", "Petek 10.10."]);

    let by_day: Vec<Vec<_>> = sched.days.iter().map(|d| d.classes.iter().map(summary).collect()).collect();

    assert_eq!(by_day[0], vec![
        (8, "EPP sv", "Balantič", "504", None),
        (12, "NRP", "Dečman", "352", None),
    ]);
    assert_eq!(by_day[1], vec![
        (2, "RSR lv", "Uhan", "253", Some(2)),
        (2, "NRP lv", "Dečman", "500", Some(1)),
        (6, "EPP", "Balantič", "504", None),
    ]);
    assert_eq!(by_day[2], vec![
        (2, "ZBP2 lv", "Kralj B.", "274", Some(1)),
        (7, "ZBP2", "Kralj B.", "504", None),
        (12, "NRO", "Vehovec B.", "504", None),
    ]);
    assert_eq!(by_day[3], vec![
        (7, "ZBP2 lv", "Kralj B.", "274", Some(2)),
        (7, "RSR lv", "Uhan", "253", Some(3)),
        (12, "NRO lv", "Vehovec B.", "504", None),
    ]);
    assert_eq!(by_day[4], vec![
        (2, "RSR lv", "Uhan", "253", Some(1)),
        (2, "NRP lv", "Dečman", "503", Some(2)),
    ]);

    assert_eq!(sched.class_count(), 13);
}

#[test]
fn week_41_details() {
    let sched = extract(&fixture("rai2_week41.htm"), "");

    let mon = sched.day(Weekday::Mon).unwrap();
    assert_eq!(mon.classes[1].duration_slots, 2.0);
    assert_eq!(mon.classes[1].background_color.as_deref(), Some("#CCFFCC"));
    assert_eq!(mon.classes[0].day_label, "Ponedeljek 6.10.");

    let tue = sched.day(Weekday::Tue).unwrap();
    assert_eq!(tue.classes[0].sub_group_label.as_deref(), Some("Skupina 2"));
    assert!(tue.classes.iter().all(|c| c.special_note.is_none()));

    // Only Thursday's second group had to be guessed
    let guessed: Vec<(&str, Resolution)> = sched.guessed().map(|c| (c.subject.as_str(), c.resolution)).collect();
    assert_eq!(guessed, vec![("RSR lv", Resolution::ColspanLookup)]);
}

#[test]
fn notes_repeats_and_blank_cells() {
    let sched = extract(&fixture("before_school_year.htm"), "1.9.2025");
    assert_eq!(sched.class_name, "RAI 1.l");

    let labels: Vec<&str> = sched.days.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Ponedeljek 1.9.", "Torek 2.9.", "Sreda 3.9."]);

    let mon = &sched.days[0];
    assert_eq!(mon.note.as_deref(), Some("Pred začetkom šol.leta"));
    assert!(mon.classes.is_empty());

    let tue: Vec<_> = sched.days[1].classes.iter().map(summary).collect();
    assert_eq!(tue, vec![(1, "RSR", "Uhan", "253", None)]);

    let wed: Vec<_> = sched.days[2].classes.iter().map(summary).collect();
    assert_eq!(wed, vec![(3, "ZBP2", "Kralj B.", "504", None)]);
    assert_eq!(sched.days[2].classes[0].duration_slots, 2.0);
}

#[test]
fn fixture_extraction_is_deterministic() {
    let page = fixture("rai2_week41.htm");
    assert_eq!(extract(&page, "w"), extract(&page, "w"));
}
