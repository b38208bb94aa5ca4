use chrono::{DateTime, TimeZone};

pub const FOLDER_PREFIX: &str = "signed_documents";

/// Replace everything outside `[0-9A-Za-z.-]` with `_`.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File stem for a document: the sanitized title, or the sanitized
/// identifier when the title is blank.
pub fn base_name(display_name: &str, identifier: &str) -> String {
    if display_name.trim().is_empty() {
        sanitize(identifier)
    } else {
        sanitize(display_name)
    }
}

/// Stem that also carries the identifier, used when the plain stem is taken.
pub fn disambiguated_name(display_name: &str, identifier: &str) -> String {
    let base = base_name(display_name, identifier);
    let id = sanitize(identifier);
    if base == id {
        base
    } else {
        format!("{base}_{id}")
    }
}

pub fn run_folder_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{FOLDER_PREFIX}_{}", now.format("%Y%m%d_%H%M%S"))
}
