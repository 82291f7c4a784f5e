//! Candidate selection by mood, genre and duration.
//!
//! Two tiers, tried in order:
//!
//! 1. **Strict**: same mood, same genre code, duration within
//!    [0.9 × reference, 1.1 × reference], not the reference itself.
//! 2. **Relaxed**: same mood, not the reference itself. Only consulted when
//!    the strict tier is empty.
//!
//! If the relaxed tier is empty too the outcome is [`Candidates::Empty`],
//! a normal result rather than an error.

use crate::catalog::Catalog;
use crate::track::Track;
use log::{debug, info};

/// Relative duration tolerance of the strict tier
pub const DURATION_TOLERANCE: f64 = 0.1;

/// Selected candidates, tagged with the tier that produced them.
/// Non-empty vectors only; an empty selection is `Empty`.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidates<'a> {
    Strict(Vec<&'a Track>),
    Relaxed(Vec<&'a Track>),
    Empty,
}

impl<'a> Candidates<'a> {
    #[must_use]
    pub fn tracks(&self) -> &[&'a Track] {
        match self {
            Candidates::Strict(tracks) | Candidates::Relaxed(tracks) => tracks,
            Candidates::Empty => &[],
        }
    }

    #[must_use]
    pub fn is_relaxed(&self) -> bool {
        matches!(self, Candidates::Relaxed(_))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Candidates::Empty)
    }
}

/// Whether `duration_ms` lies in the closed strict window around `reference_ms`.
#[must_use]
pub fn within_duration_window(reference_ms: u64, duration_ms: u64) -> bool {
    let reference = reference_ms as f64;
    let duration = duration_ms as f64;
    duration >= reference * (1.0 - DURATION_TOLERANCE) && duration <= reference * (1.0 + DURATION_TOLERANCE)
}

/// Strict tier only
pub fn strict_filter<'a>(catalog: &'a Catalog, reference: &Track, mood: &str) -> Vec<&'a Track> {
    catalog
        .iter()
        .filter(|track| {
            track.mood == mood
                && track.genre_code == reference.genre_code
                && within_duration_window(reference.duration_ms, track.duration_ms)
                && track.id != reference.id
        })
        .collect()
}

/// Relaxed tier only
pub fn relaxed_filter<'a>(catalog: &'a Catalog, reference: &Track, mood: &str) -> Vec<&'a Track> {
    catalog
        .iter()
        .filter(|track| track.mood == mood && track.id != reference.id)
        .collect()
}

/// Strict tier, falling back once to the relaxed tier.
pub fn filter_candidates<'a>(catalog: &'a Catalog, reference: &Track, predicted_mood: &str) -> Candidates<'a> {
    let strict = strict_filter(catalog, reference, predicted_mood);
    if !strict.is_empty() {
        debug!("Strict filter kept {} candidates for `{}`", strict.len(), reference.id);
        return Candidates::Strict(strict);
    }

    info!("No strict match for `{}`, relaxing filters to mood `{predicted_mood}` only", reference.name);
    let relaxed = relaxed_filter(catalog, reference, predicted_mood);
    if relaxed.is_empty() {
        info!("No track shares mood `{predicted_mood}` with `{}`", reference.name);
        return Candidates::Empty;
    }

    debug!("Relaxed filter kept {} candidates for `{}`", relaxed.len(), reference.id);
    Candidates::Relaxed(relaxed)
}
