// src/config/consts.rs

// Net config
pub const BASE_URL: &str = "https://sckr.si/vss/urniki/c";
pub const CLASS_ID_WIDTH: usize = 5; // c00002.htm
pub const USER_AGENT: &str = concat!("urnik_scrape/", env!("CARGO_PKG_VERSION"));
pub const HTTP_TIMEOUT_SECS: u64 = 15;

// In-memory caches
pub const TIMETABLE_TTL_SECS: u64 = 15 * 60;
pub const OPTIONS_TTL_SECS: u64 = 6 * 60 * 60;

// Discovery
pub const PROBE_ANCHORS: [u32; 3] = [1, 2, 3]; // a week exists if any of these classes does
pub const WEEKS_BACK: i64 = 8;
pub const WEEKS_AHEAD: i64 = 12;
pub const CLASS_SCAN_MAX: u32 = 300;
pub const CLASS_SCAN_MAX_MISSES: u32 = 30;

// Calendar
pub const ICS_PRODID: &str = "-//ŠC Kranj//Urnik//EN";
pub const ICS_UID_DOMAIN: &str = "sckranj.si";

// Export
pub const DEFAULT_OUT_DIR: &str = "out";
pub const DEFAULT_FILE: &str = "urnik";

// Logging
pub const LOG_FILE: &str = ".urnik/debug.log";
