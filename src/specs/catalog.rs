// src/specs/catalog.rs
// Which weeks are published, and which classes exist.

use std::sync::LazyLock;
use std::time::Duration as StdDuration;

use chrono::{Datelike, Duration, NaiveDate};
use scraper::Selector;
use serde::Serialize;

use crate::config::consts::{
    CLASS_SCAN_MAX, CLASS_SCAN_MAX_MISSES, OPTIONS_TTL_SECS, PROBE_ANCHORS, WEEKS_AHEAD, WEEKS_BACK,
};
use crate::core::cache::TtlCache;
use crate::core::html;
use crate::core::net::TimetableSource;
use crate::progress::Progress;

static CLASS_BANNER: LazyLock<Selector> = LazyLock::new(|| html::selector(r#"font[size="7"]"#));

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WeekOption {
    /// ISO week number, as used in page URLs.
    pub number: u32,
    pub year: i32,
    pub monday: NaiveDate,
    pub is_current: bool,
}

impl WeekOption {
    /// The ISO week containing `date`.
    pub fn containing(date: NaiveDate, today: NaiveDate) -> Self {
        let iso = date.iso_week();
        let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        Self {
            number: iso.week(),
            year: iso.year(),
            monday,
            is_current: today.iso_week() == iso,
        }
    }

    pub fn current(today: NaiveDate) -> Self {
        Self::containing(today, today)
    }

    /// `D.M.YYYY` of the Monday.
    pub fn label(&self) -> String {
        let d = self.monday;
        format!("{}.{}.{}", d.day(), d.month(), d.year())
    }

    /// `D.M. - D.M.` Monday to Friday.
    pub fn display(&self) -> String {
        let fri = self.monday + Duration::days(4);
        format!("{}.{}. - {}.{}.", self.monday.day(), self.monday.month(), fri.day(), fri.month())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassOption {
    pub id: u32,
    pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub weeks: Vec<WeekOption>,
    pub classes: Vec<ClassOption>,
    /// Week the class list was read from.
    pub scanned_week: Option<u32>,
}

impl Catalog {
    pub fn week(&self, number: u32) -> Option<&WeekOption> {
        self.weeks.iter().find(|w| w.number == number)
    }

    pub fn class_label(&self, id: u32) -> Option<&str> {
        self.classes.iter().find(|c| c.id == id).map(|c| c.label.as_str())
    }
}

/// Weeks around `today`, oldest first, one per ISO week number.
pub fn week_candidates(today: NaiveDate) -> Vec<WeekOption> {
    let mut out: Vec<WeekOption> = Vec::new();
    for offset in -WEEKS_BACK..=WEEKS_AHEAD {
        let Some(date) = today.checked_add_signed(Duration::weeks(offset)) else { continue };
        let week = WeekOption::containing(date, today);
        if !out.iter().any(|w| w.number == week.number) {
            out.push(week);
        }
    }
    out
}

/// Weeks for which at least one anchor class page exists.
pub fn discover_weeks(source: &dyn TimetableSource, today: NaiveDate, progress: &mut dyn Progress) -> Vec<WeekOption> {
    let candidates = week_candidates(today);
    progress.begin(candidates.len());
    progress.log("Probing published weeks…");

    let weeks: Vec<WeekOption> = candidates
        .into_iter()
        .filter(|w| {
            let found = PROBE_ANCHORS.iter().any(|id| source.page_exists(w.number, *id));
            progress.item_done(w.number);
            found
        })
        .collect();

    logf!("Catalog: {} week(s) published", weeks.len());
    weeks
}

/// Banner text of a class page (`<font size="7">`).
pub fn class_label(page: &str) -> Option<String> {
    let doc = html::parse(page);
    html::first(doc.root_element(), &CLASS_BANNER)
        .map(html::text)
        .filter(|t| !t.is_empty())
}

/// Scan class ids upward until the ceiling or too many misses in a row.
pub fn discover_classes(source: &dyn TimetableSource, week: u32, progress: &mut dyn Progress) -> Vec<ClassOption> {
    progress.begin(CLASS_SCAN_MAX as usize);
    progress.log(&format!("Scanning classes in week {week}…"));

    let mut classes = Vec::new();
    let mut misses = 0u32;

    for id in 1..=CLASS_SCAN_MAX {
        if misses >= CLASS_SCAN_MAX_MISSES {
            logd!("Catalog: stop at id {} after {} misses", id, misses);
            break;
        }
        let label = match source.fetch_page(week, id) {
            Ok(page) => class_label(&page),
            Err(e) => {
                if !e.is_not_found() {
                    logd!("Catalog: class {} in week {}: {}", id, week, e);
                }
                None
            }
        };
        match label {
            Some(label) => {
                classes.push(ClassOption { id, label });
                misses = 0;
            }
            None => misses += 1,
        }
        progress.item_done(id);
    }

    logf!("Catalog: {} class(es) in week {}", classes.len(), week);
    classes
}

/// Weeks, then classes from the current week (or the first published one).
pub fn discover(source: &dyn TimetableSource, today: NaiveDate, progress: &mut dyn Progress) -> Catalog {
    let weeks = discover_weeks(source, today, progress);
    let scan = weeks
        .iter()
        .find(|w| w.is_current)
        .or_else(|| weeks.first())
        .map(|w| w.number)
        .unwrap_or_else(|| today.iso_week().week());

    let classes = discover_classes(source, scan, progress);
    progress.finish();
    Catalog { weeks, classes, scanned_week: Some(scan) }
}

/// Discovery is slow (hundreds of requests); results are kept for hours.
pub struct CatalogCache {
    cache: TtlCache<Catalog>,
}

impl Default for CatalogCache {
    fn default() -> Self { Self::new() }
}

impl CatalogCache {
    const KEY: &'static str = "catalog";

    pub fn new() -> Self {
        Self { cache: TtlCache::new(StdDuration::from_secs(OPTIONS_TTL_SECS)) }
    }

    /// Only complete catalogs (weeks and classes) are remembered.
    pub fn get_or_discover(
        &mut self,
        source: &dyn TimetableSource,
        today: NaiveDate,
        progress: &mut dyn Progress,
        use_cache: bool,
    ) -> Catalog {
        if use_cache {
            if let Some(hit) = self.cache.get(Self::KEY) {
                logd!("Catalog: cache hit");
                return hit;
            }
        }
        let fresh = discover(source, today, progress);
        if use_cache && !fresh.weeks.is_empty() && !fresh.classes.is_empty() {
            self.cache.insert(Self::KEY, fresh.clone());
        } else {
            self.cache.clear();
        }
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::net::StaticSource;
    use crate::progress::NullProgress;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn class_page(label: &str) -> String {
        format!(r##"<center><font size="7" face="Arial" color="#0000FF">{label}</font></center>"##)
    }

    #[test]
    fn week_labels() {
        let w = WeekOption::current(date(2025, 10, 8));
        assert_eq!(w.number, 41);
        assert_eq!(w.monday, date(2025, 10, 6));
        assert_eq!(w.label(), "6.10.2025");
        assert_eq!(w.display(), "6.10. - 10.10.");
        assert!(w.is_current);
    }

    #[test]
    fn candidates_cross_the_year() {
        let weeks = week_candidates(date(2025, 12, 31));
        assert_eq!(weeks.len(), 21);
        assert_eq!(weeks.iter().filter(|w| w.is_current).count(), 1);
        // 2025-12-31 is in ISO week 1 of 2026
        let current = weeks.iter().find(|w| w.is_current).unwrap();
        assert_eq!((current.number, current.year), (1, 2026));
        assert_eq!(weeks.first().map(|w| w.number), Some(45));
    }

    #[test]
    fn weeks_found_by_anchor_pages() {
        let src = StaticSource::new()
            .with_page(40, 3, class_page("RAI 3.l"))
            .with_page(41, 1, class_page("RAI 1.l"));
        let weeks = discover_weeks(&src, date(2025, 10, 8), &mut NullProgress);
        let numbers: Vec<u32> = weeks.iter().map(|w| w.number).collect();
        assert_eq!(numbers, vec![40, 41]);
    }

    #[test]
    fn class_scan_stops_after_misses() {
        let mut src = StaticSource::new();
        src.insert(41, 1, class_page("RAI 1.l"));
        src.insert(41, 2, class_page("RAI 2.l"));
        src.insert(41, 20, class_page("MEH 1.l"));
        // beyond 30 consecutive misses: never reached
        src.insert(41, 60, class_page("ghost"));
        src.insert(41, 21, "<p>no banner</p>");

        let classes = discover_classes(&src, 41, &mut NullProgress);
        let ids: Vec<u32> = classes.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 20]);
        assert_eq!(classes[1].label, "RAI 2.l");
    }

    #[test]
    fn discovery_prefers_current_week_and_caches() {
        let src = StaticSource::new()
            .with_page(40, 1, class_page("old"))
            .with_page(41, 1, class_page("RAI 1.l"));
        let mut cache = CatalogCache::new();
        let cat = cache.get_or_discover(&src, date(2025, 10, 8), &mut NullProgress, true);
        assert_eq!(cat.scanned_week, Some(41));
        assert_eq!(cat.class_label(1), Some("RAI 1.l"));
        assert!(cat.week(40).is_some());

        // served from cache even though the source is now empty
        let again = cache.get_or_discover(&StaticSource::new(), date(2025, 10, 8), &mut NullProgress, true);
        assert_eq!(again, cat);
        // bypass
        let fresh = cache.get_or_discover(&StaticSource::new(), date(2025, 10, 8), &mut NullProgress, false);
        assert!(fresh.weeks.is_empty());
    }
}
