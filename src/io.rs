use crate::model::{SchoolSnapshot, TeacherId, Timetable, PERIODS};
use anyhow::{bail, Context};
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

/// Import d'un emploi du temps depuis CSV: header `day,p1,...,p8`, une ligne par jour.
///
/// La première colonne (libellé du jour) est ignorée ; la forme 6×8 est validée.
pub fn import_timetable_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Timetable> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        if rec.len() != PERIODS + 1 {
            bail!(
                "row {}: expected {} fields (day + {PERIODS} periods), got {}",
                line + 1,
                PERIODS + 1,
                rec.len()
            );
        }
        rows.push(rec.iter().skip(1).map(|cell| cell.trim().to_string()).collect());
    }
    Timetable::from_rows(rows).map_err(anyhow::Error::msg)
}

/// Export CSV des remplacements:
/// header `id,absence_id,absent,substitute,day,period,class,created_at`
pub fn export_substitutions_csv<P: AsRef<Path>>(
    path: P,
    snapshot: &SchoolSnapshot,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "id",
        "absence_id",
        "absent",
        "substitute",
        "day",
        "period",
        "class",
        "created_at",
    ])?;
    let mut day_buf = itoa::Buffer::new();
    let mut period_buf = itoa::Buffer::new();
    for a in &snapshot.assignments {
        let absent = snapshot
            .absences
            .iter()
            .find(|e| e.id == a.absence)
            .map(|e| username_of(snapshot, e.teacher))
            .unwrap_or("");
        let id = a.id.to_string();
        let absence = a.absence.to_string();
        let created = a.created_at.to_rfc3339();
        w.write_record([
            id.as_str(),
            absence.as_str(),
            absent,
            username_of(snapshot, a.substitute),
            day_buf.format(a.slot.day()),
            period_buf.format(a.slot.period()),
            a.class_name.as_str(),
            created.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Nom d'utilisateur, ou chaîne vide pour un enseignant retiré depuis.
pub fn username_of(snapshot: &SchoolSnapshot, id: TeacherId) -> &str {
    snapshot
        .teachers
        .iter()
        .find(|t| t.id == id)
        .map(|t| t.username.as_str())
        .unwrap_or("")
}
