//! Completeness predicates.
//!
//! Each function answers one question about an item snapshot. All of them
//! are pure and total: unparseable input is simply a `false`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use refreshsparse_common::{ImageType, SeriesStatus};
use refreshsparse_db::models::Item;

/// Full-date layouts tried in order by [`is_date`].
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%m/%d/%y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%A, %B %d, %Y",
    "%A %B %d %Y",
    "%A, %d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%Y-%m-%d %I:%M:%S %p",
];

/// Layouts with the year or day left out; completed before parsing.
const MONTH_YEAR_FORMATS: &[&str] = &["%d %B %Y", "%d %B, %Y"];
const DAY_MONTH_FORMATS: &[&str] = &["%d %B %Y", "%B %d %Y", "%m/%d/%Y", "%m-%d-%Y"];
const YEAR_MONTH_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn fold(value: &str) -> String {
    value.to_lowercase()
}

/// Unicode-aware, case-insensitive prefix match.
pub fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    fold(haystack).starts_with(&fold(prefix))
}

/// Unicode-aware, case-insensitive substring match.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    fold(haystack).contains(&fold(needle))
}

/// Unicode-aware, case-insensitive equality.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    fold(a) == fold(b)
}

/// Whether `value` reads as a calendar date or timestamp.
///
/// Parsing is lenient: numeric and month-name layouts, with or without a
/// time part, plus month/year and day/month forms.
pub fn is_date(value: &str) -> bool {
    let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if value.is_empty() {
        return false;
    }

    if DateTime::parse_from_rfc3339(&value).is_ok() {
        return true;
    }
    if DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(&value, fmt).is_ok())
    {
        return true;
    }
    if DATETIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(&value, fmt).is_ok())
    {
        return true;
    }

    let with_day = format!("1 {value}");
    if MONTH_YEAR_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(&with_day, fmt).is_ok())
    {
        return true;
    }

    // "2024-03" and "2024/03"
    let separator = if value.contains('/') { '/' } else { '-' };
    let with_day = format!("{value}{separator}01");
    if YEAR_MONTH_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(&with_day, fmt).is_ok())
    {
        return true;
    }

    // 2000 is a leap year, so "29 February" and "2/29" pass.
    let with_year = if value.contains('/') {
        format!("{value}/2000")
    } else if value.contains('-') {
        format!("{value}-2000")
    } else {
        format!("{value} 2000")
    };
    DAY_MONTH_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(&with_year, fmt).is_ok())
}

pub fn missing_overview(item: &Item, enabled: bool) -> bool {
    enabled && is_blank(item.overview.as_deref())
}

pub fn missing_name(item: &Item, enabled: bool) -> bool {
    enabled && is_blank(Some(&item.name))
}

/// Season names the catalog generates when it has nothing better.
///
/// Case-sensitive on purpose: a real title such as "season of the witch"
/// must not match.
pub fn is_placeholder_season_name(name: &str) -> bool {
    name.starts_with("Season") || name.starts_with("Specials")
}

pub fn name_is_date(item: &Item, enabled: bool) -> bool {
    enabled && is_date(&item.name)
}

/// Name starts with any of `tokens`. An empty token list never matches.
pub fn bad_name(item: &Item, tokens: &[String]) -> bool {
    !item.name.is_empty()
        && tokens
            .iter()
            .any(|token| starts_with_ignore_case(&item.name, token))
}

pub fn overview_bad_name(item: &Item, tokens: &[String], enabled: bool) -> bool {
    enabled
        && item.overview.as_deref().is_some_and(|overview| {
            tokens
                .iter()
                .any(|token| contains_ignore_case(overview, token))
        })
}

pub fn missing_image(item: &Item, image_type: ImageType, enabled: bool) -> bool {
    enabled && !item.has_image(image_type)
}

/// Fewer provider IDs than `minimum`. A minimum of 0 never triggers.
pub fn too_few_provider_ids(item: &Item, minimum: usize) -> bool {
    item.provider_ids.len() < minimum
}

/// A series not marked ended whose last refresh is older than `status_days`.
///
/// Unknown status counts as not ended. `None` disables the check.
pub fn series_may_have_ended(item: &Item, status_days: Option<u64>, now: DateTime<Utc>) -> bool {
    let Some(status_days) = status_days else {
        return false;
    };
    item.status != Some(SeriesStatus::Ended) && item.days_since_refresh(now) > status_days as f64
}

/// Strictly more than `cooldown` minutes since the last refresh.
pub fn cooled_down_minutes(item: &Item, cooldown: i64, now: DateTime<Utc>) -> bool {
    item.minutes_since_refresh(now) > cooldown as f64
}

/// Strictly more than `cooldown` days since the last refresh.
pub fn cooled_down_days(item: &Item, cooldown: i64, now: DateTime<Utc>) -> bool {
    item.days_since_refresh(now) > cooldown as f64
}
