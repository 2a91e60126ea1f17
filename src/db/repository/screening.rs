use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::ValueStatus;
use crate::models::{ClassifiedValue, Screening};

/// Insert a screening and its values in one transaction.
pub fn insert_screening(conn: &mut Connection, screening: &Screening) -> Result<(), DatabaseError> {
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO screenings (id, user_id, file_name, uploaded_at, summary,
         recommendations, flagged_count)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            screening.id.to_string(),
            screening.user_id,
            screening.file_name,
            screening.uploaded_at.to_rfc3339(),
            screening.summary,
            serde_json::to_string(&screening.recommendations)?,
            screening.flagged_count as i64,
        ],
    )?;

    for (position, value) in screening.values.iter().enumerate() {
        tx.execute(
            "INSERT INTO screening_values (id, screening_id, position, test_key,
             test_name, value, unit, status, normal_range, explanation)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                Uuid::new_v4().to_string(),
                screening.id.to_string(),
                position as i64,
                value.test_key,
                value.test_name,
                value.value,
                value.unit,
                value.status.as_str(),
                value.normal_range,
                value.explanation,
            ],
        )?;
    }

    tx.commit()?;
    Ok(())
}

/// All screenings owned by a user, newest first.
pub fn list_screenings_for_user(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<Screening>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, file_name, uploaded_at, summary, recommendations, flagged_count
         FROM screenings WHERE user_id = ?1 ORDER BY uploaded_at DESC, rowid DESC",
    )?;

    let rows = stmt.query_map(params![user_id], |row| Ok(screening_row(row)))?;

    let mut screenings = Vec::new();
    for row in rows {
        let mut screening = screening_from_row(row??)?;
        screening.values = load_values(conn, &screening.id)?;
        screenings.push(screening);
    }
    Ok(screenings)
}

fn load_values(conn: &Connection, screening_id: &Uuid) -> Result<Vec<ClassifiedValue>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT test_key, test_name, value, unit, status, normal_range, explanation
         FROM screening_values WHERE screening_id = ?1 ORDER BY position",
    )?;

    let rows = stmt.query_map(params![screening_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, f64>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut values = Vec::new();
    for row in rows {
        let (test_key, test_name, value, unit, status, normal_range, explanation) = row?;
        values.push(ClassifiedValue {
            test_key,
            test_name,
            value,
            unit,
            status: ValueStatus::from_str(&status)?,
            normal_range,
            explanation,
        });
    }
    Ok(values)
}

// Internal row type for Screening mapping
struct ScreeningRow {
    id: String,
    user_id: String,
    file_name: String,
    uploaded_at: String,
    summary: String,
    recommendations: String,
    flagged_count: i64,
}

fn screening_row(row: &rusqlite::Row<'_>) -> Result<ScreeningRow, rusqlite::Error> {
    Ok(ScreeningRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        file_name: row.get(2)?,
        uploaded_at: row.get(3)?,
        summary: row.get(4)?,
        recommendations: row.get(5)?,
        flagged_count: row.get(6)?,
    })
}

fn screening_from_row(row: ScreeningRow) -> Result<Screening, DatabaseError> {
    Ok(Screening {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        user_id: row.user_id,
        file_name: row.file_name,
        uploaded_at: DateTime::parse_from_rfc3339(&row.uploaded_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        summary: row.summary,
        recommendations: serde_json::from_str(&row.recommendations)?,
        flagged_count: row.flagged_count as usize,
        values: Vec::new(),
    })
}
