//! Pure derivation of dashboard display values.
//!
//! Nothing here performs I/O; the same functions back the async
//! `DashboardService` and the C ABI.

use crate::types::{DashboardStats, Resume};

/// Derive display stats from the record count `n` and the count `p` of
/// processed records. With no records the baseline is returned unchanged.
///
/// `responses_change` is never recomputed; it always carries the baseline
/// value.
pub fn derive_stats(record_count: u32, processed_count: u32, baseline: &DashboardStats) -> DashboardStats {
    if record_count == 0 {
        return *baseline;
    }
    let n = record_count;
    let p = processed_count.min(n);

    let applications = n.saturating_mul(8).max(5);
    // floor(0.4 * a) and floor(0.6 * r) in integer arithmetic.
    let responses = (applications / 5 * 2 + applications % 5 * 2 / 5).max(2);
    let interviews = (responses / 5 * 3 + responses % 5 * 3 / 5).max(1);

    DashboardStats {
        score: 85u32.saturating_add(p.saturating_mul(5)).min(100),
        views: 200u32.saturating_add(n.saturating_mul(75)).max(50),
        interviews,
        applications,
        responses,
        views_change: clamp_i32(10 + 2 * i64::from(p)).max(5),
        applications_change: clamp_i32(5 + i64::from(n)).max(3),
        responses_change: baseline.responses_change,
        interviews_change: clamp_i32(20 + 5 * i64::from(p)).max(10),
    }
}

/// `derive_stats` over a slice of fetched records.
pub fn stats_for_resumes(resumes: &[Resume], baseline: &DashboardStats) -> DashboardStats {
    let n = u32::try_from(resumes.len()).unwrap_or(u32::MAX);
    let p = resumes.iter().filter(|r| r.is_processed()).count();
    derive_stats(n, u32::try_from(p).unwrap_or(u32::MAX), baseline)
}

fn clamp_i32(v: i64) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Build a display name from the local part of an email address.
///
/// `"john.doe@example.com"` becomes `"John Doe"`. Fragments are split on
/// `.`, `_` and `-`; empty fragments are skipped.
pub fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    local
        .split(['.', '_', '-'])
        .filter(|fragment| !fragment.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(fragment: &str) -> String {
    let mut chars = fragment.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// 32-bit signed polynomial rolling hash over UTF-16 code units
/// (`h = h * 31 + unit`, wrapping).
pub fn name_hash(input: &str) -> i32 {
    input
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Pick an avatar deterministically: `|hash| mod N`.
pub fn select_avatar<'a>(seed: &str, avatars: &'a [String]) -> Option<&'a str> {
    if avatars.is_empty() {
        return None;
    }
    let index = name_hash(seed).unsigned_abs() as usize % avatars.len();
    Some(avatars[index].as_str())
}
