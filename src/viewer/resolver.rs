use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityObservation {
    /// 1-based page number.
    pub page: usize,
    pub intersection_ratio: f32,
    /// Distance from the page centre to the viewport centre, in layout units.
    pub center_distance: f32,
}

impl VisibilityObservation {
    pub fn new(page: usize, intersection_ratio: f32) -> Self {
        Self {
            page,
            intersection_ratio,
            center_distance: 0.0,
        }
    }

    pub fn with_center_distance(mut self, center_distance: f32) -> Self {
        self.center_distance = center_distance;
        self
    }
}

/// Ratios this close to the best one count as a tie.
pub const RATIO_TIE_EPSILON: f32 = 1e-3;

/// The most visible page, if its ratio reaches `threshold`.
///
/// Among pages tied with the best ratio, `current` keeps its place; otherwise the
/// page nearest the viewport centre wins, then the earlier page.
pub fn dominant_page(
    batch: &[VisibilityObservation],
    threshold: f32,
    current: Option<usize>,
) -> Option<usize> {
    let best_ratio = batch
        .iter()
        .map(|obs| obs.intersection_ratio)
        .filter(|ratio| ratio.is_finite())
        .fold(None::<f32>, |best, ratio| Some(best.map_or(ratio, |best| best.max(ratio))))?;
    if best_ratio < threshold {
        return None;
    }

    let tied = batch.iter().filter(|obs| {
        obs.intersection_ratio.is_finite()
            && best_ratio - obs.intersection_ratio <= RATIO_TIE_EPSILON
    });
    if let Some(current) = current
        && tied.clone().any(|obs| obs.page == current)
    {
        return Some(current);
    }
    tied.min_by(|left, right| {
        left.center_distance
            .abs()
            .total_cmp(&right.center_distance.abs())
            .then(left.page.cmp(&right.page))
    })
    .map(|obs| obs.page)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    page: usize,
    since: Instant,
}

/// Debounces dominant-page observations into at most one commit per quiet period.
#[derive(Debug, Clone)]
pub struct CurrentPageResolver {
    threshold: f32,
    quiet_period: Duration,
    candidate: Option<Candidate>,
}

impl CurrentPageResolver {
    pub fn new(threshold: f32, quiet_period: Duration) -> Self {
        Self {
            threshold,
            quiet_period,
            candidate: None,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    pub fn pending_page(&self) -> Option<usize> {
        self.candidate.map(|candidate| candidate.page)
    }

    /// Records one observation tick; `current` wins ties so a settled page stays put.
    ///
    /// A new winner restarts the quiet period; an ambiguous tick drops the candidate.
    pub fn observe(&mut self, batch: &[VisibilityObservation], current: usize, now: Instant) {
        match dominant_page(batch, self.threshold, Some(current)) {
            Some(page) => {
                if self.candidate.map(|candidate| candidate.page) != Some(page) {
                    self.candidate = Some(Candidate { page, since: now });
                }
            }
            None => self.candidate = None,
        }
    }

    /// Hands out the candidate once it has been stable for the quiet period.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        let candidate = self.candidate?;
        if now.saturating_duration_since(candidate.since) < self.quiet_period {
            return None;
        }
        self.candidate = None;
        Some(candidate.page)
    }

    pub fn reset(&mut self) {
        self.candidate = None;
    }
}
