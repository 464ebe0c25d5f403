//! Query functions for enriched court records.
//!
//! The upsert and the naming-pass updates use `exec_raw_params()` /
//! `query_raw_params()` with positional parameters; batch label updates
//! go through `UPDATE … FROM (VALUES …)` statements chunked under the
//! `PostgreSQL` parameter limit.

use std::fmt::Write as _;

use court_map_cluster::naming::NamedCourtRow;
use court_map_court_models::CourtRecord;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// Maximum number of parameters `PostgreSQL` allows per statement.
pub const PG_MAX_PARAMS: usize = 65_535;

/// Result of one batch upsert.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOutcome {
    /// Records written in this batch.
    pub inserted: u64,
    /// Records lost to a rolled-back batch.
    pub failed: u64,
}

/// Upserts a batch of court records inside one transaction.
///
/// Existing rows (matched on `osm_id`) are fully overwritten, including
/// the `updated_at` timestamp; new ids are inserted. A failure anywhere
/// in the batch rolls the whole batch back (the transaction is dropped
/// uncommitted), counts every record as failed, and lets the caller
/// continue with the next batch.
///
/// # Errors
///
/// Returns [`DbError`] only if the transaction itself cannot be opened
/// or committed; insert failures are absorbed into the outcome.
pub async fn upsert_courts_batch(
    db: &dyn Database,
    records: &[CourtRecord],
) -> Result<BatchOutcome, DbError> {
    if records.is_empty() {
        return Ok(BatchOutcome::default());
    }

    let txn = db.begin_transaction().await?;

    match insert_records(txn.as_ref(), records).await {
        Ok(inserted) => {
            txn.commit().await?;
            Ok(BatchOutcome {
                inserted,
                failed: 0,
            })
        }
        Err(e) => {
            // Dropping the uncommitted transaction rolls the batch back.
            log::error!("Batch of {} records failed, rolling back: {e}", records.len());
            Ok(BatchOutcome {
                inserted: 0,
                failed: records.len() as u64,
            })
        }
    }
}

/// Inserts every record of a batch on the given (transactional) handle.
async fn insert_records(db: &dyn Database, records: &[CourtRecord]) -> Result<u64, DbError> {
    let mut inserted = 0u64;

    for record in records {
        let court = &record.court;

        db.exec_raw_params(
            "INSERT INTO courts (
                osm_id, sport, hoops, surface, public_access,
                latitude, longitude, fallback_name,
                cluster_id, photon_name, photon_distance_km, photon_source,
                is_school, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14
            )
            ON CONFLICT (osm_id) DO UPDATE SET
                sport = EXCLUDED.sport,
                hoops = EXCLUDED.hoops,
                surface = EXCLUDED.surface,
                public_access = EXCLUDED.public_access,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                fallback_name = EXCLUDED.fallback_name,
                cluster_id = EXCLUDED.cluster_id,
                photon_name = EXCLUDED.photon_name,
                photon_distance_km = EXCLUDED.photon_distance_km,
                photon_source = EXCLUDED.photon_source,
                is_school = EXCLUDED.is_school,
                updated_at = EXCLUDED.updated_at",
            &[
                DatabaseValue::String(court.osm_id.clone()),
                DatabaseValue::String(court.sport.as_ref().to_string()),
                court.hoops.map_or(DatabaseValue::Null, |h| {
                    DatabaseValue::Int32(i32::try_from(h).unwrap_or(i32::MAX))
                }),
                DatabaseValue::String(court.surface.as_ref().to_string()),
                court
                    .public_access
                    .map_or(DatabaseValue::Null, DatabaseValue::Bool),
                DatabaseValue::Real64(court.latitude),
                DatabaseValue::Real64(court.longitude),
                DatabaseValue::String(court.fallback_name.clone()),
                record
                    .cluster_id
                    .as_ref()
                    .map_or(DatabaseValue::Null, |c| DatabaseValue::String(c.clone())),
                record
                    .photon_name
                    .as_ref()
                    .map_or(DatabaseValue::Null, |n| DatabaseValue::String(n.clone())),
                record
                    .photon_distance_km
                    .map_or(DatabaseValue::Null, DatabaseValue::Real64),
                record
                    .photon_source
                    .as_ref()
                    .map_or(DatabaseValue::Null, |s| DatabaseValue::String(s.clone())),
                DatabaseValue::Bool(record.is_school),
                DatabaseValue::DateTime(chrono::Utc::now().naive_utc()),
            ],
        )
        .await?;

        inserted += 1;
    }

    Ok(inserted)
}

/// Reads back all persisted courts for the naming pass, ordered by
/// ascending surrogate id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn fetch_named_courts(db: &dyn Database) -> Result<Vec<NamedCourtRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, photon_name, sport, individual_name FROM courts ORDER BY id",
            &[],
        )
        .await?;

    let mut courts = Vec::with_capacity(rows.len());

    for row in &rows {
        courts.push(NamedCourtRow {
            id: row.to_value("id").unwrap_or(0),
            facility_name: row.to_value("photon_name").unwrap_or(None),
            sport: row.to_value("sport").unwrap_or_default(),
            individual_name: row.to_value("individual_name").unwrap_or(None),
        });
    }

    Ok(courts)
}

/// Applies individual-name changes in one transaction.
///
/// Assignments go through chunked `UPDATE … FROM (VALUES …)`
/// statements; clears go through chunked `IN` lists. Returns the number
/// of rows changed.
///
/// # Errors
///
/// Returns [`DbError`] if any statement or the commit fails; the
/// transaction is dropped uncommitted in that case and no labels
/// change.
pub async fn apply_individual_names(
    db: &dyn Database,
    changes: &[(i64, Option<String>)],
) -> Result<u64, DbError> {
    if changes.is_empty() {
        return Ok(0);
    }

    let assignments: Vec<(i64, &str)> = changes
        .iter()
        .filter_map(|(id, name)| name.as_deref().map(|n| (*id, n)))
        .collect();
    let clears: Vec<i64> = changes
        .iter()
        .filter(|(_, name)| name.is_none())
        .map(|(id, _)| *id)
        .collect();

    let txn = db.begin_transaction().await?;

    let mut total_changed = 0u64;

    // Each VALUES row uses 2 parameters: (id, name).
    let params_per_row: usize = 2;
    for chunk in assignments.chunks(PG_MAX_PARAMS / params_per_row) {
        let mut sql = String::from(
            "UPDATE courts c SET individual_name = d.individual_name\nFROM (VALUES ",
        );
        let mut params: Vec<DatabaseValue> = Vec::with_capacity(chunk.len() * 2);
        let mut idx = 1u32;

        for (i, &(id, name)) in chunk.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            write!(sql, "(${idx}::bigint, ${next}::text)", next = idx + 1).unwrap();
            params.push(DatabaseValue::Int64(id));
            params.push(DatabaseValue::String(name.to_string()));
            idx += 2;
        }

        sql.push_str(") AS d(id, individual_name) WHERE c.id = d.id");

        total_changed += txn.as_ref().exec_raw_params(&sql, &params).await?;
    }

    for chunk in clears.chunks(PG_MAX_PARAMS) {
        let mut sql = String::from("UPDATE courts SET individual_name = NULL WHERE id IN (");
        let mut params: Vec<DatabaseValue> = Vec::with_capacity(chunk.len());

        for (i, &id) in chunk.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            write!(sql, "${}", i + 1).unwrap();
            params.push(DatabaseValue::Int64(id));
        }

        sql.push(')');

        total_changed += txn.as_ref().exec_raw_params(&sql, &params).await?;
    }

    txn.commit().await?;

    Ok(total_changed)
}
