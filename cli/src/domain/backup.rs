//! Naming of configuration backups.
//!
//! Backups sit next to the live configuration as
//! `config_<YYYYMMDD>_<HHMMSS>.yaml`. A second backup within the same second
//! gets a numeric suffix, so an existing backup is never overwritten.

use chrono::NaiveDateTime;

/// Backup file name for `taken_at`; `attempt` 0 is the plain timestamp,
/// later attempts append `_<attempt>`.
#[must_use]
pub fn backup_file_name(taken_at: NaiveDateTime, attempt: u32) -> String {
    let stamp = taken_at.format("%Y%m%d_%H%M%S");
    if attempt == 0 {
        format!("config_{stamp}.yaml")
    } else {
        format!("config_{stamp}_{attempt}.yaml")
    }
}

/// First candidate name for which `taken` returns `false`.
pub fn first_free_backup_name(taken_at: NaiveDateTime, taken: impl Fn(&str) -> bool) -> String {
    (0..)
        .map(|attempt| backup_file_name(taken_at, attempt))
        .find(|name| !taken(name))
        .unwrap_or_else(|| backup_file_name(taken_at, u32::MAX))
}

/// `true` for names produced by [`backup_file_name`].
#[must_use]
pub fn is_backup_file_name(name: &str) -> bool {
    let Some(rest) = name
        .strip_prefix("config_")
        .and_then(|r| r.strip_suffix(".yaml"))
    else {
        return false;
    };
    let mut parts = rest.split('_');
    let date = parts.next().unwrap_or_default();
    let time = parts.next().unwrap_or_default();
    let suffix_ok = match parts.next() {
        None => true,
        Some(n) => !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()),
    };
    date.len() == 8
        && time.len() == 6
        && date.chars().chain(time.chars()).all(|c| c.is_ascii_digit())
        && suffix_ok
        && parts.next().is_none()
}
