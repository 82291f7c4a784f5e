use crate::catalog::{Catalog, TrackRecord};
use anyhow::{Context, Result};
use log::{info, trace};
use rusqlite::Connection;
use std::path::Path;

/// Open the catalog database at `db_path`, creating the file if needed.
pub fn connect(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("SQLite connection refused. DB location: {}", db_path.display()))?;

    Ok(conn)
}

/// Create the `tracks` table if it does not exist yet.
pub fn init(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS tracks (
            position         INTEGER PRIMARY KEY,
            track_id         TEXT    NOT NULL UNIQUE,
            track_name       TEXT    NOT NULL,
            artists          TEXT    NOT NULL,
            track_genre      TEXT    NOT NULL,
            mood             TEXT    NOT NULL,
            duration_ms      INTEGER NOT NULL,
            valence          REAL    NOT NULL,
            energy           REAL    NOT NULL,
            danceability     REAL    NOT NULL,
            tempo            REAL    NOT NULL,
            acousticness     REAL    NOT NULL,
            instrumentalness REAL    NOT NULL,
            speechiness      REAL    NOT NULL
        )",
        (),
    )
    .context("Invalid SQL command when CREATEing tracks TABLE.")?;

    Ok(())
}

/// Import a catalog CSV into the database at `db_path`.
///
/// The CSV is validated as a whole catalog first, so a database is never
/// left holding rows the recommender would refuse. Without `force`, an
/// already populated database is an error; with it, existing rows are
/// replaced. Returns the number of imported tracks.
pub fn import_csv(db_path: &Path, csv_path: &Path, force: bool) -> Result<usize> {
    let catalog = Catalog::load_csv(csv_path)?;
    let records: Vec<TrackRecord> = catalog.iter().map(TrackRecord::from).collect();

    let mut conn = connect(db_path)?;
    init(&conn)?;

    let existing: i64 = conn
        .query_row("SELECT COUNT(*) FROM tracks", [], |row| row.get(0))
        .context("Could not count catalog entries.")?;
    if existing > 0 && !force {
        anyhow::bail!(
            "Catalog database {} already holds {existing} tracks. Use --force to replace them.",
            db_path.display()
        );
    }

    insert(&records, &mut conn, existing > 0)?;
    info!("Imported {} tracks into {}", records.len(), db_path.display());
    Ok(records.len())
}

/// Adds all records inside one transaction, clearing the table first when
/// `replace` is set.
fn insert(records: &[TrackRecord], conn: &mut Connection, replace: bool) -> Result<()> {
    let tx = conn.transaction()?;

    if replace {
        tx.execute("DELETE FROM tracks", ())
            .context("Failed to clear existing tracks.")?;
    }

    {
        let mut stmt = tx.prepare(
            "INSERT INTO tracks (position, track_id, track_name, artists, track_genre, mood, duration_ms,
                valence, energy, danceability, tempo, acousticness, instrumentalness, speechiness)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )?;

        for (position, record) in records.iter().enumerate() {
            stmt.execute(rusqlite::params![
                position as i64,
                record.track_id,
                record.track_name,
                record.artists,
                record.track_genre,
                record.mood,
                record.duration_ms as i64,
                record.valence,
                record.energy,
                record.danceability,
                record.tempo,
                record.acousticness,
                record.instrumentalness,
                record.speechiness,
            ])
            .with_context(|| format!("Invalid SQL statement when INSERTing track `{}`", record.track_id))?;
        }
    }

    tx.commit().context("Commiting SQL transaction failed.")?;
    Ok(())
}

/// Every stored record, in catalog order.
pub fn load_records(conn: &Connection) -> Result<Vec<TrackRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT track_id, track_name, artists, track_genre, mood, duration_ms,
                valence, energy, danceability, tempo, acousticness, instrumentalness, speechiness
             FROM tracks ORDER BY position",
        )
        .context("Invalid SQL statement when SELECTing FROM tracks.")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(TrackRecord {
                track_id: row.get(0)?,
                track_name: row.get(1)?,
                artists: row.get(2)?,
                track_genre: row.get(3)?,
                mood: row.get(4)?,
                duration_ms: row.get::<_, i64>(5)?.max(0) as u64,
                valence: row.get(6)?,
                energy: row.get(7)?,
                danceability: row.get(8)?,
                tempo: row.get(9)?,
                acousticness: row.get(10)?,
                instrumentalness: row.get(11)?,
                speechiness: row.get(12)?,
            })
        })
        .context("Cannot query tracks.")?;

    let mut records = Vec::new();
    // Could use collect, but then no per-row context.
    for row in rows {
        records.push(row.context("Queried track row unwrap failed.")?);
    }
    trace!("{} rows in catalog database", records.len());

    Ok(records)
}

/// Open the database at `db_path` and build a catalog from it.
pub fn load_catalog(db_path: &Path) -> Result<Catalog> {
    if !db_path.exists() {
        anyhow::bail!(
            "No catalog database at {}. Import one first: moodmatch import <tracks.csv>",
            db_path.display()
        );
    }
    let conn = connect(db_path)?;
    let records = load_records(&conn)?;
    let catalog = Catalog::from_records(records)
        .with_context(|| format!("Catalog database {} failed validation", db_path.display()))?;
    info!("Loaded {} tracks from {}", catalog.len(), db_path.display());
    Ok(catalog)
}
