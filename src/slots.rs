// src/slots.rs
// Fixed lesson times for the 16 daily slots.

use chrono::NaiveTime;

pub const SLOT_COUNT: u8 = 16;

/// (start h, start m, end h, end m) per slot, slot 1 first.
const SLOT_TIMES: [(u32, u32, u32, u32); SLOT_COUNT as usize] = [
    (7, 15, 8, 0),
    (8, 5, 8, 50),
    (8, 55, 9, 40),
    (9, 45, 10, 30),
    (10, 35, 11, 20),
    (11, 25, 12, 10),
    (12, 15, 13, 0),
    (13, 5, 13, 50),
    (13, 55, 14, 40),
    (14, 45, 15, 30),
    (15, 35, 16, 20),
    (16, 25, 17, 10),
    (17, 15, 18, 0),
    (18, 5, 18, 50),
    (18, 55, 19, 40),
    (19, 45, 20, 30),
];

/// Start and end of a single slot.
pub fn slot_times(slot: u8) -> Option<(NaiveTime, NaiveTime)> {
    let (sh, sm, eh, em) = *SLOT_TIMES.get(usize::from(slot).checked_sub(1)?)?;
    Some((NaiveTime::from_hms_opt(sh, sm, 0)?, NaiveTime::from_hms_opt(eh, em, 0)?))
}

/// Last slot covered. Fractional durations round up; never below `slot`.
pub fn end_slot(slot: u8, duration: f32) -> u8 {
    let covered = if duration.is_finite() { duration.ceil().max(1.0) as u8 } else { 1 };
    slot.saturating_add(covered - 1).min(SLOT_COUNT.max(slot))
}

/// Wall-clock span of a class.
pub fn span(slot: u8, duration: f32) -> Option<(NaiveTime, NaiveTime)> {
    let (start, _) = slot_times(slot)?;
    let (_, end) = slot_times(end_slot(slot, duration))?;
    Some((start, end))
}

/// "7:15-8:00", or "Slot N" when the slot is outside the day.
pub fn time_range(slot: u8, duration: f32) -> String {
    match span(slot, duration) {
        Some((start, end)) => format!("{}-{}", start.format("%-H:%M"), end.format("%-H:%M")),
        None => format!("Slot {slot}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_and_last_slot() {
        assert_eq!(time_range(1, 1.0), "7:15-8:00");
        assert_eq!(time_range(16, 1.0), "19:45-20:30");
    }

    #[test]
    fn double_lesson_ends_on_second_slot() {
        assert_eq!(end_slot(7, 2.0), 8);
        assert_eq!(time_range(7, 2.0), "12:15-13:50");
    }

    #[test]
    fn half_and_overlong_durations() {
        assert_eq!(end_slot(3, 0.5), 3);
        assert_eq!(end_slot(3, 1.5), 4);
        assert_eq!(end_slot(15, 4.0), 16);
        assert_eq!(time_range(15, 4.0), "18:55-20:30");
    }

    #[test]
    fn outside_the_day() {
        assert_eq!(slot_times(0), None);
        assert_eq!(slot_times(17), None);
        assert_eq!(time_range(0, 1.0), "Slot 0");
    }
}
