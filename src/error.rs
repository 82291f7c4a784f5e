//! Error kinds raised by the recommendation core.
//!
//! Everything here is raised at the point of detection and never retried:
//! the pipeline is pure, so the same inputs always fail the same way.
//! Loaders that touch the filesystem use `anyhow` instead and wrap these
//! through `?`.

use thiserror::Error;

/// Core recommendation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecommendError {
    /// An artist or genre string the shared encoder was never fitted on
    #[error("unknown {field} `{value}`: not present when the encoder was fitted")]
    UnknownCategory { field: &'static str, value: String },

    /// Missing or non-finite data in a track record
    #[error("malformed track `{track_id}`: {reason}")]
    MalformedTrack { track_id: String, reason: String },

    /// Name search matched more than one track
    #[error("`{query}` matches {} tracks, pick one", matches.len())]
    AmbiguousLookup { query: String, matches: Vec<LookupMatch> },

    /// Name search matched nothing
    #[error("no track matches `{0}`")]
    TrackNotFound(String),

    /// Two catalog rows share an identifier
    #[error("duplicate track id `{0}` in catalog")]
    DuplicateTrack(String),

    /// Classifier received a feature vector of the wrong width
    #[error("feature vector has {actual} values, classifier expects {expected}")]
    FeatureVectorLength { expected: usize, actual: usize },

    /// Classifier produced a class id outside the label encoder
    #[error("class id {0} has no label")]
    UnknownClass(usize),

    /// Catalog mood missing from the model's label vocabulary
    #[error("catalog mood `{0}` is not in the model vocabulary")]
    UnknownMood(String),

    #[error("top_n must be a positive integer")]
    InvalidTopN,

    #[error("weight for `{feature}` must be positive and finite, got {weight}")]
    InvalidWeight { feature: &'static str, weight: f64 },
}

/// One candidate of an ambiguous lookup: catalog position plus display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupMatch {
    pub position: usize,
    pub name: String,
    pub artist: String,
}

pub type RecommendResult<T> = Result<T, RecommendError>;
