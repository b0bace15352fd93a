// src/filter.rs
//! Personal view of a schedule: which sub-group ("skupina") the user attends
//! per subject, and which subjects to hide entirely. Held in memory only.

use std::collections::{BTreeMap, BTreeSet};

use crate::engine::{ClassEntry, WeeklySchedule};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubGroupFilter {
    /// subject → chosen sub-group number
    pub selected: BTreeMap<String, u8>,
    pub hidden_subjects: BTreeSet<String>,
}

impl SubGroupFilter {
    pub fn select(&mut self, subject: &str, group: Option<u8>) {
        match group {
            Some(g) => { self.selected.insert(s!(subject), g); }
            None => { self.selected.remove(subject); }
        }
    }

    pub fn set_hidden(&mut self, subject: &str, hidden: bool) {
        if hidden {
            self.hidden_subjects.insert(s!(subject));
        } else {
            self.hidden_subjects.remove(subject);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.hidden_subjects.is_empty()
    }

    /// Entries without a sub-group always pass (unless hidden). With a
    /// preference for the subject, only the chosen group passes.
    pub fn should_show(&self, entry: &ClassEntry) -> bool {
        if self.hidden_subjects.contains(&entry.subject) {
            return false;
        }
        let Some(group) = entry.sub_group_number else { return true };
        match self.selected.get(&entry.subject) {
            Some(want) => *want == group,
            None => true,
        }
    }

    /// Filtered copy; day notes and empty days are kept.
    pub fn apply(&self, schedule: &WeeklySchedule) -> WeeklySchedule {
        let mut out = schedule.clone();
        for day in &mut out.days {
            day.classes.retain(|c| self.should_show(c));
        }
        out
    }
}

/// Sub-group numbers seen per subject.
pub fn subgroups_by_subject(schedule: &WeeklySchedule) -> BTreeMap<String, BTreeSet<u8>> {
    let mut out: BTreeMap<String, BTreeSet<u8>> = BTreeMap::new();
    for entry in schedule.entries() {
        if let Some(g) = entry.sub_group_number {
            out.entry(entry.subject.clone()).or_default().insert(g);
        }
    }
    out
}

/// All distinct subjects, sorted.
pub fn subjects(schedule: &WeeklySchedule) -> BTreeSet<String> {
    schedule.entries().map(|e| e.subject.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DayBlock;

    fn entry(subject: &str, group: Option<u8>) -> ClassEntry {
        let mut e = ClassEntry::new(subject, 2, 1.0);
        e.sub_group_number = group;
        e
    }

    fn week() -> WeeklySchedule {
        let mut tue = DayBlock::new("Torek 7.10.");
        tue.classes = vec![entry("RSR lv", Some(2)), entry("NRP lv", Some(1)), entry("EPP", None)];
        let mut thu = DayBlock::new("Četrtek 9.10.");
        thu.classes = vec![entry("RSR lv", Some(3)), entry("NRO lv", None)];
        let noted = DayBlock::noted("Petek 10.10.", "Pred začetkom pouka");
        WeeklySchedule { class_name: s!("RAI 2.l"), week_label: s!(), days: vec![tue, thu, noted] }
    }

    #[test]
    fn groups_collected_per_subject() {
        let map = subgroups_by_subject(&week());
        assert_eq!(map.len(), 2);
        assert_eq!(map["RSR lv"], BTreeSet::from([2, 3]));
        assert_eq!(map["NRP lv"], BTreeSet::from([1]));
        assert_eq!(subjects(&week()).len(), 4);
    }

    #[test]
    fn no_preference_shows_everything() {
        let f = SubGroupFilter::default();
        assert!(f.is_empty());
        assert_eq!(f.apply(&week()), week());
    }

    #[test]
    fn preference_hides_other_groups_only() {
        let mut f = SubGroupFilter::default();
        f.select("RSR lv", Some(3));
        let out = f.apply(&week());

        let tue: Vec<&str> = out.days[0].classes.iter().map(|c| c.subject.as_str()).collect();
        assert_eq!(tue, vec!["NRP lv", "EPP"]);
        assert_eq!(out.days[1].classes.len(), 2);
        assert!(out.days[2].note.is_some());

        f.select("RSR lv", None);
        assert!(f.is_empty());
    }

    #[test]
    fn hidden_subject_wins() {
        let mut f = SubGroupFilter::default();
        f.set_hidden("EPP", true);
        assert!(!f.should_show(&entry("EPP", None)));
        assert!(f.should_show(&entry("NRO lv", None)));
        f.set_hidden("EPP", false);
        assert!(f.should_show(&entry("EPP", None)));
    }
}
