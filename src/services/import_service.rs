use crate::error::{Error, Result};
use crate::models::user::{ROLE_SCHOOL, ROLE_STUDENT};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader};
use serde::Serialize;
use std::collections::HashMap;
use validator::ValidateEmail;

/// Outcome report for a bulk upload. Per-row errors never abort the batch;
/// they are collected here and returned to the caller.
#[derive(Debug, Default, Serialize)]
pub struct ImportSummary {
    pub uploaded_count: usize,
    pub failed_count: usize,
    pub failed_details: Vec<RowFailure>,
}

#[derive(Debug, Serialize)]
pub struct RowFailure {
    pub row: usize,
    pub email: Option<String>,
    pub reason: String,
}

impl ImportSummary {
    pub fn record_ok(&mut self) {
        self.uploaded_count += 1;
    }

    pub fn record_failure(&mut self, row: usize, email: Option<String>, reason: impl Into<String>) {
        self.failed_count += 1;
        self.failed_details.push(RowFailure {
            row,
            email,
            reason: reason.into(),
        });
    }
}

/// Raw cells of one spreadsheet row, 1-based row number as shown in Excel.
#[derive(Debug)]
pub struct SheetRow {
    pub number: usize,
    pub cells: HashMap<String, String>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct NewUserRecord {
    pub name: String,
    pub email: String,
    pub role: String,
}

pub fn read_sheet_from_path(path: &str) -> Result<Vec<SheetRow>> {
    let workbook = open_workbook_auto(path)?;
    collect_rows(workbook)
}

pub fn read_sheet_from_bytes(bytes: Vec<u8>) -> Result<Vec<SheetRow>> {
    let cursor = std::io::Cursor::new(bytes);
    let workbook = open_workbook_auto_from_rs(cursor)?;
    collect_rows(workbook)
}

fn collect_rows<RS>(mut workbook: calamine::Sheets<RS>) -> Result<Vec<SheetRow>>
where
    RS: std::io::Read + std::io::Seek,
{
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::BadRequest("The workbook has no sheets".into()))??;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(Error::BadRequest("The sheet is empty".into()));
    };

    let headers: Vec<Option<String>> = header_row.iter().map(cell_string_lower).collect();
    if headers.iter().all(Option::is_none) {
        return Err(Error::BadRequest("The sheet has no header row".into()));
    }

    let mut sheet_rows = Vec::new();
    for (idx, row) in rows.enumerate() {
        let mut cells = HashMap::new();
        for (col, cell) in row.iter().enumerate() {
            let Some(Some(header)) = headers.get(col) else {
                continue;
            };
            if let Some(value) = cell_string(cell) {
                cells.insert(header.clone(), value);
            }
        }
        // Header is row 1 in the spreadsheet, data starts at row 2.
        sheet_rows.push(SheetRow {
            number: idx + 2,
            cells,
        });
    }
    Ok(sheet_rows)
}

fn cell_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        other => {
            let text = other.to_string().trim().to_string();
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        }
    }
}

fn cell_string_lower(cell: &Data) -> Option<String> {
    cell_string(cell).map(|s| s.to_lowercase())
}

/// Row validation for the bulk user upload: name present, email
/// well-formed, role (from the row or the request default) one of
/// school/student.
pub fn validate_user_row(row: &SheetRow, default_role: &str) -> std::result::Result<NewUserRecord, String> {
    let name = row
        .cells
        .get("name")
        .cloned()
        .ok_or_else(|| "Missing name".to_string())?;

    let email = row
        .cells
        .get("email")
        .cloned()
        .ok_or_else(|| "Missing email".to_string())?
        .to_lowercase();
    if !email.validate_email() {
        return Err(format!("Malformed email: {}", email));
    }

    let role = row
        .cells
        .get("role")
        .map(|r| r.to_lowercase())
        .unwrap_or_else(|| default_role.to_string());
    if role != ROLE_SCHOOL && role != ROLE_STUDENT {
        return Err(format!("Unknown role: {}", role));
    }

    Ok(NewUserRecord { name, email, role })
}

/// Row validation for the bulk mark upload: the row must carry an email
/// plus an in-range integer mark for every sub-skill of the target core
/// skill. A single bad or missing mark fails the whole row; nothing is
/// partially applied.
pub fn validate_mark_row(
    row: &SheetRow,
    sub_skills: &[String],
    ceiling: i32,
) -> std::result::Result<(String, HashMap<String, i32>), String> {
    let email = row
        .cells
        .get("email")
        .cloned()
        .ok_or_else(|| "Missing email".to_string())?
        .to_lowercase();
    if !email.validate_email() {
        return Err(format!("Malformed email: {}", email));
    }

    let mut marks = HashMap::new();
    for sub_skill in sub_skills {
        let key = sub_skill.to_lowercase();
        let raw = row
            .cells
            .get(&key)
            .ok_or_else(|| format!("Missing mark for {}", sub_skill))?;
        let mark: i32 = raw
            .parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i32)
            .ok_or_else(|| format!("Invalid mark for {}: {}", sub_skill, raw))?;
        if mark < 0 || mark > ceiling {
            return Err(format!(
                "Mark for {} out of range: {} (allowed 0..={})",
                sub_skill, mark, ceiling
            ));
        }
        marks.insert(sub_skill.clone(), mark);
    }
    Ok((email, marks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn sheet(headers: &[&str], rows: &[&[&str]]) -> Vec<SheetRow> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                worksheet
                    .write_string((r + 1) as u32, col as u16, *value)
                    .unwrap();
            }
        }
        let buffer = workbook.save_to_buffer().unwrap();
        read_sheet_from_bytes(buffer).unwrap()
    }

    #[test]
    fn workbook_round_trips_through_the_reader() {
        let rows = sheet(
            &["Name", "Email"],
            &[&["Asha Rao", "asha@example.com"], &["Vik", "vik@example.com"]],
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].number, 2);
        assert_eq!(rows[0].cells.get("name").unwrap(), "Asha Rao");
        assert_eq!(rows[1].cells.get("email").unwrap(), "vik@example.com");
    }

    #[test]
    fn unparseable_bytes_abort_with_a_single_error() {
        assert!(read_sheet_from_bytes(b"not a workbook".to_vec()).is_err());
    }

    #[test]
    fn user_rows_need_name_and_wellformed_email() {
        let rows = sheet(
            &["name", "email"],
            &[
                &["Asha", "asha@example.com"],
                &["", "missing-name@example.com"],
                &["Vik", "not-an-email"],
            ],
        );
        assert_eq!(
            validate_user_row(&rows[0], "student").unwrap(),
            NewUserRecord {
                name: "Asha".into(),
                email: "asha@example.com".into(),
                role: "student".into(),
            }
        );
        assert!(validate_user_row(&rows[1], "student")
            .unwrap_err()
            .contains("Missing name"));
        assert!(validate_user_row(&rows[2], "student")
            .unwrap_err()
            .contains("Malformed email"));
    }

    #[test]
    fn role_column_overrides_the_default_but_admin_is_refused() {
        let rows = sheet(
            &["name", "email", "role"],
            &[
                &["Asha", "asha@example.com", "school"],
                &["Vik", "vik@example.com", "admin"],
            ],
        );
        assert_eq!(validate_user_row(&rows[0], "student").unwrap().role, "school");
        assert!(validate_user_row(&rows[1], "student").is_err());
    }

    #[test]
    fn mark_rows_require_every_sub_skill_within_the_ceiling() {
        let sub_skills: Vec<String> = vec!["Algebra".into(), "Geometry".into()];
        let rows = sheet(
            &["email", "algebra", "geometry"],
            &[
                &["asha@example.com", "8", "9"],
                &["vik@example.com", "8", "12"],
                &["mira@example.com", "7", ""],
            ],
        );

        let (email, marks) = validate_mark_row(&rows[0], &sub_skills, 10).unwrap();
        assert_eq!(email, "asha@example.com");
        assert_eq!(marks.get("Algebra"), Some(&8));
        assert_eq!(marks.get("Geometry"), Some(&9));

        // 12 > ceiling of 10: the whole row fails, no partial marks.
        assert!(validate_mark_row(&rows[1], &sub_skills, 10)
            .unwrap_err()
            .contains("out of range"));
        assert!(validate_mark_row(&rows[2], &sub_skills, 10)
            .unwrap_err()
            .contains("Missing mark for Geometry"));
    }

    #[test]
    fn summary_tallies_match_the_outcomes() {
        let mut summary = ImportSummary::default();
        summary.record_ok();
        summary.record_ok();
        summary.record_failure(4, Some("dup@example.com".into()), "User already exists");
        assert_eq!(summary.uploaded_count, 2);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.failed_details.len(), 1);
        assert_eq!(summary.failed_details[0].row, 4);
    }
}
