use std::collections::BTreeSet;

/// How the rendered-page set reacts when the focus page moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Pages are never evicted once materialized.
    AccumulateOnly,
    /// Pages farther than `eviction_radius` from the focus fall back to placeholders.
    SlidingWindow { eviction_radius: usize },
}

/// Pages within `buffer_radius` of `focus_page`, clamped to the document.
///
/// An unknown page count yields an empty set; an out-of-range focus is clamped first.
pub fn compute_buffered_set(
    focus_page: usize,
    total_pages: Option<usize>,
    buffer_radius: usize,
) -> BTreeSet<usize> {
    let Some(total_pages) = total_pages.filter(|total| *total > 0) else {
        return BTreeSet::new();
    };

    let focus = focus_page.clamp(1, total_pages);
    let first = focus.saturating_sub(buffer_radius).max(1);
    let last = focus.saturating_add(buffer_radius).min(total_pages);
    (first..=last).collect()
}

/// Next rendered set after the focus moves to `focus_page`.
///
/// The buffered window is always added. Under the sliding policy, pages already
/// rendered survive while they stay inside the eviction window.
pub fn retain_pages(
    current: &BTreeSet<usize>,
    focus_page: usize,
    total_pages: Option<usize>,
    buffer_radius: usize,
    policy: RetentionPolicy,
) -> BTreeSet<usize> {
    let Some(total) = total_pages.filter(|total| *total > 0) else {
        return BTreeSet::new();
    };
    let mut next = compute_buffered_set(focus_page, Some(total), buffer_radius);

    match policy {
        RetentionPolicy::AccumulateOnly => {
            next.extend(
                current
                    .iter()
                    .copied()
                    .filter(|page| (1..=total).contains(page)),
            );
        }
        RetentionPolicy::SlidingWindow { eviction_radius } => {
            let keep_radius = eviction_radius.max(buffer_radius);
            let keep = compute_buffered_set(focus_page, Some(total), keep_radius);
            next.extend(current.intersection(&keep).copied());
        }
    }
    next
}
