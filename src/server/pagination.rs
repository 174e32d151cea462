pub const QUESTIONS_PER_PAGE: usize = 10;

/// Returns the 1-based `page` of `items`, `QUESTIONS_PER_PAGE` entries long.
///
/// Pages past the end, and pages below 1, are empty rather than an error. Callers decide whether
/// an empty page means "not found".
pub fn paginate<T>(items: &[T], page: i64) -> &[T] {
    if page < 1 {
        return &[];
    }
    let start = usize::try_from(page - 1)
        .ok()
        .and_then(|p| p.checked_mul(QUESTIONS_PER_PAGE))
        .unwrap_or(usize::MAX);
    if start >= items.len() {
        return &[];
    }
    let end = (start + QUESTIONS_PER_PAGE).min(items.len());
    &items[start..end]
}
