//! # Integration Tests for Moodmatch
//!
//! End-to-end tests over real files: a CSV catalog, the SQLite store and a
//! JSON mood model written to a temporary directory, driven through the
//! library API and the `moodmatch` binary.

use anyhow::Result;
use moodmatch::config::RuntimeConfig;
use moodmatch::error::RecommendError;
use moodmatch::predictor::MoodQuery;
use moodmatch::recommender::{Outcome, RecommenderContext};
use moodmatch::track::AudioFeatures;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

const CATALOG_CSV: &str = "\
track_id,track_name,artists,track_genre,mood,duration_ms,valence,energy,danceability,tempo,acousticness,instrumentalness,speechiness,popularity
t1,Alba,Aurora,pop,felice,200000,0.8,0.7,0.6,120.0,0.2,0.0,0.05,71
t2,Brezza,Borea,pop,felice,205000,0.8,0.7,0.6,120.0,0.2,0.0,0.05,40
t3,Caos,Cerbero,metal,aggressivo,200000,0.3,0.95,0.4,160.0,0.01,0.3,0.1,55
t4,Pioggia,Dafne,pop,triste,300000,0.2,0.2,0.3,70.0,0.8,0.1,0.04,12
t5,Alba Chiara,Eco,rock,felice,180000,0.9,0.6,0.5,125.0,0.1,0.0,0.06,80
";

/// One tree: valence <= 0.5 is "triste", anything above is "felice".
const MODEL_JSON: &str = r#"{
  "labels": ["aggressivo", "felice", "triste"],
  "classifier": {
    "n_features": 10,
    "trees": [
      { "nodes": [
          { "feature": 0, "threshold": 0.5, "left": 1, "right": 2 },
          { "value": [0.0, 0.0, 12.0] },
          { "value": [1.0, 9.0, 0.0] }
      ] }
    ]
  }
}"#;

/// Test helper writing the catalog and model to a temporary directory
fn create_test_files() -> Result<(TempDir, PathBuf, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let csv_path = temp_dir.path().join("tracks_labeled.csv");
    let model_path = temp_dir.path().join("mood_model.json");
    fs::write(&csv_path, CATALOG_CSV)?;
    fs::write(&model_path, MODEL_JSON)?;
    Ok((temp_dir, csv_path, model_path))
}

fn load_context() -> Result<(TempDir, RecommenderContext)> {
    let (temp_dir, csv_path, model_path) = create_test_files()?;
    let context = RecommenderContext::load(&RuntimeConfig::with_paths(csv_path, model_path))?;
    Ok((temp_dir, context))
}

fn ids(outcome: &Outcome<'_>) -> Vec<String> {
    outcome.recommendations().iter().map(|r| r.track.id.clone()).collect()
}

#[cfg(test)]
mod recommendation_tests {
    use super::*;

    #[test]
    fn test_strict_match_with_full_explanation() -> Result<()> {
        let (_temp_dir, context) = load_context()?;
        let reference = context.catalog().get("t1").expect("t1 in catalog");

        let outcome = context.recommend(reference, 5)?;
        assert_eq!(outcome.mood(), "felice");
        assert!(matches!(outcome, Outcome::Recommended { relaxed: false, .. }));
        assert_eq!(ids(&outcome), ["t2"]);

        let rec = &outcome.recommendations()[0];
        assert_eq!(rec.distance, 0.0);
        assert_eq!(
            rec.explanation.to_string(),
            "Principal motivation: valence simile (Δ=0.000). \
             Other factors: same mood, identical genre, similar duration (5.0s)"
        );
        Ok(())
    }

    #[test]
    fn test_relaxed_fallback_returns_all_when_fewer_than_top_n() -> Result<()> {
        let (_temp_dir, context) = load_context()?;
        // Only rock track, so the strict tier is empty.
        let reference = context.catalog().get("t5").expect("t5 in catalog");

        let outcome = context.recommend(reference, 5)?;
        assert!(matches!(outcome, Outcome::Recommended { relaxed: true, .. }));
        // t1 and t2 are equidistant; catalog order breaks the tie.
        assert_eq!(ids(&outcome), ["t1", "t2"]);
        let recs = outcome.recommendations();
        assert_eq!(recs[0].distance, recs[1].distance);
        Ok(())
    }

    #[test]
    fn test_no_candidates_is_an_outcome_not_an_error() -> Result<()> {
        let (_temp_dir, context) = load_context()?;
        // Predicted "triste", and no other track carries that catalog mood.
        let reference = context.catalog().get("t4").expect("t4 in catalog");

        let outcome = context.recommend(reference, 5)?;
        assert_eq!(outcome, Outcome::NoCandidates { mood: "triste".to_string() });
        Ok(())
    }

    #[test]
    fn test_predicted_mood_overrides_catalog_mood() -> Result<()> {
        let (_temp_dir, context) = load_context()?;
        // Labeled "aggressivo" in the catalog, predicted "triste".
        let reference = context.catalog().get("t3").expect("t3 in catalog");

        let outcome = context.recommend(reference, 5)?;
        assert_eq!(outcome.mood(), "triste");
        assert_eq!(ids(&outcome), ["t4"]);
        Ok(())
    }

    #[test]
    fn test_repeated_requests_serialize_identically() -> Result<()> {
        let (_temp_dir, context) = load_context()?;
        let reference = context.catalog().get("t5").expect("t5 in catalog");

        let first = serde_json::to_string(&context.recommend(reference, 3)?)?;
        let second = serde_json::to_string(&context.recommend(reference, 3)?)?;
        assert_eq!(first, second);
        assert!(first.contains(r#""outcome":"recommended""#));
        Ok(())
    }

    #[test]
    fn test_lookup_by_name_and_pick() -> Result<()> {
        let (_temp_dir, context) = load_context()?;

        match context.recommend_by_name("alba", None, 5) {
            Err(RecommendError::AmbiguousLookup { matches, .. }) => {
                let positions: Vec<usize> = matches.iter().map(|m| m.position).collect();
                assert_eq!(positions, [0, 4]);
            }
            other => panic!("expected AmbiguousLookup, got {other:?}"),
        }

        let outcome = context.recommend_by_name("alba", Some(0), 5)?;
        assert_eq!(ids(&outcome), ["t2"]);

        assert!(matches!(
            context.recommend_by_name("nessuna", None, 5),
            Err(RecommendError::TrackNotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_unknown_artist_is_surfaced() -> Result<()> {
        let (_temp_dir, context) = load_context()?;
        let features = context.catalog().get("t1").expect("t1 in catalog").features;
        let query = MoodQuery::raw(features, "Nobody", "pop", 200_000);

        match context.predictor().predict_label(&query) {
            Err(RecommendError::UnknownCategory { field, value }) => {
                assert_eq!(field, "artist");
                assert_eq!(value, "Nobody");
            }
            other => panic!("expected UnknownCategory, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_raw_query_for_known_strings_predicts() -> Result<()> {
        let (_temp_dir, context) = load_context()?;
        let features = AudioFeatures {
            valence: 0.1,
            ..AudioFeatures::default()
        };
        let query = MoodQuery::raw(features, "Eco", "metal", 240_000);
        assert_eq!(context.predictor().predict_label(&query)?, "triste");
        Ok(())
    }
}

#[cfg(test)]
mod database_integration_tests {
    use super::*;
    use moodmatch::db;

    #[test]
    fn test_imported_catalog_matches_csv() -> Result<()> {
        let (temp_dir, csv_path, model_path) = create_test_files()?;
        let db_path = temp_dir.path().join("catalog.db");

        assert_eq!(db::import_csv(&db_path, &csv_path, false)?, 5);

        let from_csv = RecommenderContext::load(&RuntimeConfig::with_paths(csv_path, model_path.clone()))?;
        let from_db = RecommenderContext::load(&RuntimeConfig::with_paths(db_path, model_path))?;
        assert_eq!(from_csv.catalog().tracks(), from_db.catalog().tracks());

        let reference = from_db.catalog().get("t5").expect("t5 in catalog");
        assert_eq!(ids(&from_db.recommend(reference, 5)?), ["t1", "t2"]);
        Ok(())
    }

    #[test]
    fn test_reimport_needs_force() -> Result<()> {
        let (temp_dir, csv_path, _model_path) = create_test_files()?;
        let db_path = temp_dir.path().join("catalog.db");

        db::import_csv(&db_path, &csv_path, false)?;
        assert!(db::import_csv(&db_path, &csv_path, false).is_err());
        assert_eq!(db::import_csv(&db_path, &csv_path, true)?, 5);

        let conn = rusqlite::Connection::open(&db_path)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM tracks", [], |row| row.get(0))?;
        assert_eq!(count, 5);
        Ok(())
    }

    #[test]
    fn test_model_with_wrong_input_width_is_rejected() -> Result<()> {
        let (temp_dir, csv_path, _model_path) = create_test_files()?;
        let model_path = temp_dir.path().join("two_feature_model.json");
        fs::write(&model_path, MODEL_JSON.replace(r#""n_features": 10"#, r#""n_features": 2"#))?;

        let err = RecommenderContext::load(&RuntimeConfig::with_paths(csv_path, model_path))
            .expect_err("the model cannot take ten inputs");
        assert_eq!(
            err.downcast_ref::<RecommendError>(),
            Some(&RecommendError::FeatureVectorLength { expected: 10, actual: 2 })
        );
        Ok(())
    }

    #[test]
    fn test_model_missing_catalog_mood_is_rejected() -> Result<()> {
        let (temp_dir, csv_path, _model_path) = create_test_files()?;
        let model_path = temp_dir.path().join("narrow_model.json");
        fs::write(
            &model_path,
            MODEL_JSON
                .replace(r#"["aggressivo", "felice", "triste"]"#, r#"["felice", "triste"]"#)
                .replace("[0.0, 0.0, 12.0]", "[0.0, 12.0]")
                .replace("[1.0, 9.0, 0.0]", "[9.0, 0.0]"),
        )?;

        let err = RecommenderContext::load(&RuntimeConfig::with_paths(csv_path, model_path))
            .expect_err("aggressivo is not a model label");
        assert_eq!(
            err.downcast_ref::<RecommendError>(),
            Some(&RecommendError::UnknownMood("aggressivo".to_string()))
        );
        Ok(())
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    fn moodmatch() -> Command {
        Command::new(env!("CARGO_BIN_EXE_moodmatch"))
    }

    #[test]
    fn test_cli_help_displays_correctly() {
        let output = moodmatch().arg("--help").output().expect("Failed to run help command");

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("moodmatch"));
        assert!(stdout.contains("recommend"));
        assert!(stdout.contains("search"));
        assert!(stdout.contains("predict"));
        assert!(stdout.contains("import"));
    }

    #[test]
    fn test_completion_generation() {
        let output = moodmatch()
            .args(["completion", "bash"])
            .output()
            .expect("Failed to run completion command");

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("_moodmatch"));
        assert!(stdout.contains("complete"));
    }

    #[test]
    fn test_recommend_prints_distance_and_explanation() -> Result<()> {
        let (_temp_dir, csv_path, model_path) = create_test_files()?;

        let output = moodmatch()
            .arg("--catalog")
            .arg(&csv_path)
            .arg("--model")
            .arg(&model_path)
            .args(["recommend", "Alba", "--pick", "0"])
            .output()?;

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Brezza by Borea [distance: 0.000]"));
        assert!(stdout.contains("Other factors: same mood, identical genre, similar duration (5.0s)"));
        Ok(())
    }

    #[test]
    fn test_ambiguous_name_lists_matches() -> Result<()> {
        let (_temp_dir, csv_path, model_path) = create_test_files()?;

        let output = moodmatch()
            .env("MOODMATCH_CATALOG", &csv_path)
            .env("MOODMATCH_MODEL", &model_path)
            .args(["recommend", "alba"])
            .output()?;

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("[0] Alba by Aurora"));
        assert!(stderr.contains("[4] Alba Chiara by Eco"));
        assert!(stderr.contains("--pick"));
        Ok(())
    }
}
