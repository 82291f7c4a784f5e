//! # Catalog Module
//!
//! The catalog is the immutable, ordered table of tracks every recommendation
//! reads from. It is built once at startup from [`TrackRecord`]s (a CSV file
//! or the SQLite store in [`crate::db`]), and while building it:
//!
//! - fits and freezes the artist and genre encoders over the distinct strings
//! - assigns each track its artist and genre codes
//! - rejects duplicate identifiers, empty moods, zero durations and
//!   non-finite audio features
//!
//! Nothing mutates a catalog after construction, so a `&Catalog` can be
//! shared across threads without locking.
//!
//! ## CSV layout
//!
//! ```text
//! track_id,track_name,artists,track_genre,mood,duration_ms,valence,energy,
//! danceability,tempo,acousticness,instrumentalness,speechiness
//! ```
//!
//! Extra columns are ignored.

use crate::encoder::LabelEncoder;
use crate::error::{LookupMatch, RecommendError, RecommendResult};
use crate::track::{AudioFeatures, Track};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Raw catalog row, before categorical encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub track_id: String,
    pub track_name: String,
    pub artists: String,
    pub track_genre: String,
    pub mood: String,
    pub duration_ms: u64,
    pub valence: f64,
    pub energy: f64,
    pub danceability: f64,
    pub tempo: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub speechiness: f64,
}

impl TrackRecord {
    fn features(&self) -> AudioFeatures {
        AudioFeatures {
            valence: self.valence,
            energy: self.energy,
            danceability: self.danceability,
            tempo: self.tempo,
            acousticness: self.acousticness,
            instrumentalness: self.instrumentalness,
            speechiness: self.speechiness,
        }
    }
}

impl From<&Track> for TrackRecord {
    fn from(track: &Track) -> Self {
        let f = &track.features;
        Self {
            track_id: track.id.clone(),
            track_name: track.name.clone(),
            artists: track.artist.clone(),
            track_genre: track.genre.clone(),
            mood: track.mood.clone(),
            duration_ms: track.duration_ms,
            valence: f.valence,
            energy: f.energy,
            danceability: f.danceability,
            tempo: f.tempo,
            acousticness: f.acousticness,
            instrumentalness: f.instrumentalness,
            speechiness: f.speechiness,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    tracks: Vec<Track>,
    by_id: HashMap<String, usize>,
    artists: LabelEncoder,
    genres: LabelEncoder,
}

impl Catalog {
    /// Build a catalog from raw rows, preserving their order.
    ///
    /// # Errors
    ///
    /// - [`RecommendError::DuplicateTrack`] if two rows share an id
    /// - [`RecommendError::MalformedTrack`] for an empty mood, a zero
    ///   duration or a non-finite feature
    pub fn from_records(records: Vec<TrackRecord>) -> RecommendResult<Self> {
        let artists = LabelEncoder::fit("artist", records.iter().map(|r| r.artists.as_str()));
        let genres = LabelEncoder::fit("genre", records.iter().map(|r| r.track_genre.as_str()));

        let mut by_id = HashMap::with_capacity(records.len());
        let mut tracks = Vec::with_capacity(records.len());

        for record in records {
            if by_id.insert(record.track_id.clone(), tracks.len()).is_some() {
                return Err(RecommendError::DuplicateTrack(record.track_id));
            }
            if record.mood.trim().is_empty() {
                return Err(malformed(&record.track_id, "mood label is empty"));
            }
            if record.duration_ms == 0 {
                return Err(malformed(&record.track_id, "duration must be positive"));
            }

            let track = Track {
                artist_code: artists.encode(&record.artists)?,
                genre_code: genres.encode(&record.track_genre)?,
                features: record.features(),
                id: record.track_id,
                name: record.track_name,
                artist: record.artists,
                genre: record.track_genre,
                mood: record.mood,
                duration_ms: record.duration_ms,
            };
            track.check_finite()?;
            tracks.push(track);
        }

        debug!(
            "Catalog built: {} tracks, {} artists, {} genres",
            tracks.len(),
            artists.len(),
            genres.len()
        );

        Ok(Self { tracks, by_id, artists, genres })
    }

    /// Read a catalog CSV file.
    pub fn load_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open catalog CSV at {}", path.display()))?;

        let records = reader
            .deserialize::<TrackRecord>()
            .enumerate()
            .map(|(row, record)| {
                // +2: header line and 1-based numbering
                record.with_context(|| format!("Invalid catalog row {} in {}", row + 2, path.display()))
            })
            .collect::<Result<Vec<TrackRecord>>>()?;

        let catalog = Self::from_records(records)
            .with_context(|| format!("Catalog at {} failed validation", path.display()))?;
        info!("Loaded {} tracks from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[must_use]
    pub fn artist_encoder(&self) -> &LabelEncoder {
        &self.artists
    }

    #[must_use]
    pub fn genre_encoder(&self) -> &LabelEncoder {
        &self.genres
    }

    /// Track by identifier
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Track> {
        self.by_id.get(id).and_then(|&position| self.tracks.get(position))
    }

    /// Track at a catalog position
    #[must_use]
    pub fn at(&self, position: usize) -> Option<&Track> {
        self.tracks.get(position)
    }

    /// Distinct mood labels in first-seen order
    #[must_use]
    pub fn moods(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.tracks
            .iter()
            .map(|track| track.mood.as_str())
            .filter(|mood| seen.insert(*mood))
            .collect()
    }

    /// Every `(position, track)` whose name contains `query`, ignoring case.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = (usize, &'a Track)> + 'a {
        let needle = query.to_lowercase();
        self.tracks
            .iter()
            .enumerate()
            .filter(move |(_, track)| track.name.to_lowercase().contains(&needle))
    }

    /// Exactly one track whose name contains `query`.
    ///
    /// Several matches are reported as [`RecommendError::AmbiguousLookup`];
    /// choosing between them is left to the caller.
    pub fn find_by_name(&self, query: &str) -> RecommendResult<&Track> {
        let matches: Vec<(usize, &Track)> = self.search(query).collect();
        match matches.as_slice() {
            [] => Err(RecommendError::TrackNotFound(query.to_string())),
            [(_, track)] => Ok(*track),
            _ => Err(RecommendError::AmbiguousLookup {
                query: query.to_string(),
                matches: matches
                    .iter()
                    .map(|(position, track)| LookupMatch {
                        position: *position,
                        name: track.name.clone(),
                        artist: track.artist.clone(),
                    })
                    .collect(),
            }),
        }
    }

    /// Like [`Catalog::find_by_name`], but `pick` selects one of several
    /// matches by catalog position.
    pub fn resolve(&self, query: &str, pick: Option<usize>) -> RecommendResult<&Track> {
        let Some(position) = pick else {
            return self.find_by_name(query);
        };
        self.search(query)
            .find(|(candidate, _)| *candidate == position)
            .map(|(_, track)| track)
            .ok_or_else(|| RecommendError::TrackNotFound(format!("{query} (position {position})")))
    }
}

fn malformed(track_id: &str, reason: &str) -> RecommendError {
    RecommendError::MalformedTrack {
        track_id: track_id.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    pub(crate) fn record(id: &str, name: &str, genre: &str, mood: &str, duration_ms: u64) -> TrackRecord {
        TrackRecord {
            track_id: id.to_string(),
            track_name: name.to_string(),
            artists: format!("Artist {id}"),
            track_genre: genre.to_string(),
            mood: mood.to_string(),
            duration_ms,
            valence: 0.5,
            energy: 0.5,
            danceability: 0.5,
            tempo: 120.0,
            acousticness: 0.5,
            instrumentalness: 0.0,
            speechiness: 0.05,
        }
    }

    #[test]
    fn test_codes_assigned_from_sorted_vocabulary() {
        let catalog = Catalog::from_records(vec![
            record("a", "Uno", "rock", "felice", 200_000),
            record("b", "Due", "jazz", "triste", 180_000),
            record("c", "Tre", "rock", "felice", 210_000),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("a").unwrap().genre_code, 1);
        assert_eq!(catalog.get("b").unwrap().genre_code, 0);
        assert_eq!(catalog.get("c").unwrap().genre_code, 1);
        assert_eq!(catalog.genre_encoder().encode("jazz").unwrap(), 0);
        assert_eq!(catalog.moods(), ["felice", "triste"]);
        assert_eq!(catalog.at(1).unwrap().id, "b");
    }

    #[test]
    fn test_get_by_id_matches_position() {
        let catalog = Catalog::from_records(vec![
            record("a", "Uno", "rock", "felice", 200_000),
            record("b", "Due", "jazz", "triste", 180_000),
            record("c", "Tre", "rock", "felice", 210_000),
        ])
        .unwrap();

        for (position, track) in catalog.iter().enumerate() {
            assert_eq!(catalog.get(&track.id), catalog.at(position));
        }
        assert_eq!(catalog.get("c").unwrap().name, "Tre");
        assert!(catalog.get("z").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Catalog::from_records(vec![
            record("a", "Uno", "rock", "felice", 200_000),
            record("a", "Uno bis", "rock", "felice", 200_000),
        ]);
        assert_eq!(result.unwrap_err(), RecommendError::DuplicateTrack("a".into()));
    }

    #[test]
    fn test_malformed_rows_rejected() {
        let mut nan = record("a", "Uno", "rock", "felice", 200_000);
        nan.energy = f64::NAN;
        assert!(matches!(
            Catalog::from_records(vec![nan]),
            Err(RecommendError::MalformedTrack { .. })
        ));

        let no_mood = record("b", "Due", "rock", " ", 200_000);
        assert!(matches!(
            Catalog::from_records(vec![no_mood]),
            Err(RecommendError::MalformedTrack { .. })
        ));

        let zero = record("c", "Tre", "rock", "felice", 0);
        assert!(matches!(
            Catalog::from_records(vec![zero]),
            Err(RecommendError::MalformedTrack { .. })
        ));
    }

    #[test]
    fn test_find_by_name_outcomes() {
        let catalog = Catalog::from_records(vec![
            record("a", "Sweet Love", "pop", "felice", 200_000),
            record("b", "Lovers Rock", "pop", "felice", 200_000),
            record("c", "Storm", "metal", "aggressivo", 300_000),
        ])
        .unwrap();

        assert_eq!(catalog.find_by_name("STORM").unwrap().id, "c");
        assert!(matches!(
            catalog.find_by_name("polka"),
            Err(RecommendError::TrackNotFound(_))
        ));

        match catalog.find_by_name("love") {
            Err(RecommendError::AmbiguousLookup { matches, .. }) => {
                let positions: Vec<usize> = matches.iter().map(|m| m.position).collect();
                assert_eq!(positions, [0, 1]);
            }
            other => panic!("expected AmbiguousLookup, got {other:?}"),
        }

        assert_eq!(catalog.resolve("love", Some(1)).unwrap().id, "b");
        assert!(catalog.resolve("love", Some(2)).is_err(), "position 2 is not a match");
    }

    #[test]
    fn test_load_csv_ignores_extra_columns() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "track_id,track_name,artists,track_genre,mood,duration_ms,valence,energy,danceability,tempo,acousticness,instrumentalness,speechiness,liveness"
        )
        .unwrap();
        writeln!(file, "t1,Alba,Mina,pop,felice,200000,0.8,0.7,0.6,118.0,0.1,0.0,0.04,0.2").unwrap();
        writeln!(file, "t2,Notte,Mina,pop,triste,190000,0.2,0.3,0.4,80.5,0.7,0.1,0.03,0.1").unwrap();

        let catalog = Catalog::load_csv(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        let notte = catalog.get("t2").unwrap();
        assert_eq!(notte.features.tempo, 80.5);
        assert_eq!(notte.artist_code, catalog.get("t1").unwrap().artist_code);
    }
}
