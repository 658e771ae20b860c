//! Helpers shared by the report and suggestion listing queries.

use crate::domain::PageRequest;

/// Escape `raw` for use as an exact `ILIKE` pattern.
pub(crate) fn exact_ilike_pattern(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// `LIMIT` and `OFFSET` values for a page request.
pub(crate) fn page_bounds(page: &PageRequest) -> Result<(i64, i64), String> {
    let offset = i64::try_from(page.offset())
        .map_err(|_| "requested offset exceeds i64 range".to_owned())?;
    Ok((i64::from(page.limit()), offset))
}

/// Stored counter as a domain count; negative drift reads as zero.
pub(crate) fn stored_count(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}
