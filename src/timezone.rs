//! Pakistan Standard Time static data and response payloads.
//!
//! PKT is a fixed UTC+5 offset with no daylight saving, so the clock math
//! needs nothing beyond `chrono::FixedOffset`.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

pub const COUNTRY: &str = "Pakistan";
pub const COUNTRY_CODE: &str = "PK";
pub const TIMEZONE_NAME: &str = "Asia/Karachi";
pub const ABBREVIATION: &str = "PKT";
pub const DESCRIPTION: &str = "Pakistan Standard Time (PKT)";
/// PKT is UTC+5 (18000 seconds).
pub const UTC_OFFSET_SECS: i32 = 18_000;
pub const DEFAULT_CITY: &str = "Lahore";

/// An administrative region of Pakistan.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Region {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

pub const REGIONS: [Region; 7] = [
    Region { name: "Islamabad", kind: "Capital Territory" },
    Region { name: "Punjab", kind: "Province" },
    Region { name: "Sindh", kind: "Province" },
    Region { name: "Khyber Pakhtunkhwa", kind: "Province" },
    Region { name: "Balochistan", kind: "Province" },
    Region { name: "Gilgit-Baltistan", kind: "Administrative Territory" },
    Region { name: "Azad Kashmir", kind: "Administrative Territory" },
];

pub const MAJOR_CITIES: [&str; 10] = [
    "Karachi",
    "Lahore",
    "Faisalabad",
    "Rawalpindi",
    "Gujranwala",
    "Peshawar",
    "Multan",
    "Hyderabad",
    "Islamabad",
    "Quetta",
];

/// The region reported alongside the default city.
pub fn default_region() -> Region {
    REGIONS[1] // Punjab
}

fn pkt_offset() -> FixedOffset {
    FixedOffset::east_opt(UTC_OFFSET_SECS).unwrap()
}

/// The current wall-clock time in PKT.
pub fn now_pkt() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&pkt_offset())
}

/// Compact time payload for `?simple=true`.
#[derive(Debug, Serialize)]
pub struct SimpleTime {
    pub time: String,
    pub time_24h: String,
    pub date: String,
    pub timezone: &'static str,
    pub offset: &'static str,
    pub country: &'static str,
    pub city: &'static str,
}

/// Full time payload with country, timezone and meta sections.
#[derive(Debug, Serialize)]
pub struct FullTime {
    pub country_info: CountryInfo,
    pub timezone_info: TimezoneInfo,
    pub current_time: CurrentTime,
    pub meta: Meta,
}

#[derive(Debug, Serialize)]
pub struct CountryInfo {
    pub name: &'static str,
    pub code: &'static str,
    pub current_region: Region,
    pub current_city: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TimezoneInfo {
    pub name: &'static str,
    pub abbreviation: &'static str,
    pub offset_hours: i32,
    pub description: &'static str,
    pub dst_observed: bool,
}

#[derive(Debug, Serialize)]
pub struct CurrentTime {
    pub date: String,
    pub time_12h: String,
    pub time_24h: String,
    pub timezone: &'static str,
    pub day_of_week: String,
    pub unix_timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub timezone_source: &'static str,
}

fn format_date(now: &DateTime<FixedOffset>) -> String {
    now.format("%A, %B %d, %Y").to_string()
}

fn format_12h(now: &DateTime<FixedOffset>) -> String {
    now.format("%I:%M:%S %p").to_string()
}

fn format_24h(now: &DateTime<FixedOffset>) -> String {
    now.format("%H:%M:%S").to_string()
}

/// Build the compact payload for a given PKT time.
pub fn simple_response(now: DateTime<FixedOffset>) -> SimpleTime {
    SimpleTime {
        time: format_12h(&now),
        time_24h: format_24h(&now),
        date: format_date(&now),
        timezone: ABBREVIATION,
        offset: "UTC+5",
        country: COUNTRY,
        city: DEFAULT_CITY,
    }
}

/// Build the full payload for a given PKT time.
pub fn full_response(now: DateTime<FixedOffset>, generated_at: DateTime<Utc>) -> FullTime {
    FullTime {
        country_info: CountryInfo {
            name: COUNTRY,
            code: COUNTRY_CODE,
            current_region: default_region(),
            current_city: DEFAULT_CITY,
        },
        timezone_info: TimezoneInfo {
            name: TIMEZONE_NAME,
            abbreviation: ABBREVIATION,
            offset_hours: UTC_OFFSET_SECS / 3600,
            description: DESCRIPTION,
            dst_observed: false,
        },
        current_time: CurrentTime {
            date: format_date(&now),
            time_12h: format_12h(&now),
            time_24h: format_24h(&now),
            timezone: ABBREVIATION,
            day_of_week: now.format("%A").to_string(),
            unix_timestamp: now.timestamp(),
        },
        meta: Meta {
            generated_at: generated_at.to_rfc3339(),
            timezone_source: "Built-in Pakistan Standard Time",
        },
    }
}

/// Render the plain-text report for `?format=text`.
pub fn text_response(now: DateTime<FixedOffset>) -> String {
    let region = default_region();
    let regions = REGIONS
        .iter()
        .map(|r| r.name)
        .collect::<Vec<_>>()
        .join(", ");
    let cities = MAJOR_CITIES.join(", ");

    format!(
        "PAKISTAN STANDARD TIME\n\
         ======================\n\n\
         Location: {city}, {region_name}, {country}\n\
         Region Type: {region_kind}\n\
         Timezone: {abbr} (UTC+5)\n\n\
         CURRENT TIME\n\
         ============\n\
         Date: {date}\n\
         Time (12-hour): {time_12h}\n\
         Time (24-hour): {time_24h}\n\n\
         ADMINISTRATIVE INFORMATION\n\
         ==========================\n\
         Regions: {regions}\n\
         Major Cities: {cities}\n",
        city = DEFAULT_CITY,
        region_name = region.name,
        country = COUNTRY,
        region_kind = region.kind,
        abbr = ABBREVIATION,
        date = format_date(&now),
        time_12h = format_12h(&now),
        time_24h = format_24h(&now),
        regions = regions,
        cities = cities,
    )
}
