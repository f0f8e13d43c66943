//! Spreadsheet export of stored job records
//!
//! One CSV row per job, with skills and benefits spread over fixed
//! `Skill N` / `Benefit N` columns.

use anyhow::{Context, Result};
use std::io::Write;

use crate::types::{JobRecord, MAX_LIST_ITEMS};

/// Leading columns, before the skill and benefit columns
pub const BASE_COLUMNS: &[&str] = &[
    "Job Title",
    "Company",
    "Location",
    "Category",
    "Industry",
    "Type",
    "Salary",
    "Education",
    "Experience",
    "Vacancy",
    "Deadline",
    "Date Posted",
    "Link",
];

/// Full header row
pub fn header() -> Vec<String> {
    let mut columns: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend((1..=MAX_LIST_ITEMS).map(|i| format!("Skill {}", i)));
    columns.extend((1..=MAX_LIST_ITEMS).map(|i| format!("Benefit {}", i)));
    columns
}

fn padded(items: &[String]) -> impl Iterator<Item = String> + '_ {
    items
        .iter()
        .cloned()
        .chain(std::iter::repeat(String::new()))
        .take(MAX_LIST_ITEMS)
}

fn row(job: &JobRecord) -> Vec<String> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let mut row = vec![
        job.title.clone(),
        text(&job.company),
        text(&job.location),
        text(&job.category),
        text(&job.industry),
        text(&job.job_type),
        text(&job.salary),
        text(&job.education),
        text(&job.experience),
        text(&job.vacancy_count),
        text(&job.deadline),
        job.posted_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        job.link.clone(),
    ];
    row.extend(padded(&job.skills));
    row.extend(padded(&job.benefits));
    row
}

/// Write `jobs` as CSV, returning the number of data rows
pub fn write_jobs_csv<W: Write>(jobs: &[JobRecord], out: W) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(header()).context("Failed to write CSV header")?;
    for job in jobs {
        writer
            .write_record(row(job))
            .with_context(|| format!("Failed to write CSV row for {}", job.link))?;
    }
    writer.flush().context("Failed to flush CSV output")?;
    Ok(jobs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn job() -> JobRecord {
        JobRecord {
            title: "Data Analyst".to_string(),
            company: Some("Acme, Inc.".to_string()),
            category: None,
            industry: Some("Retail".to_string()),
            vacancy_count: Some("2".to_string()),
            education: None,
            experience: None,
            location: Some("Dhaka".to_string()),
            job_type: Some("Full-Time".to_string()),
            deadline: None,
            salary: None,
            link: "https://jobs.example.com/1".to_string(),
            posted_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            skills: vec!["SQL".to_string(), "Excel".to_string()],
            benefits: vec!["Lunch".to_string()],
        }
    }

    #[test]
    fn header_has_fixed_list_columns() {
        let header = header();
        assert_eq!(header.len(), BASE_COLUMNS.len() + 2 * MAX_LIST_ITEMS);
        assert_eq!(header[13], "Skill 1");
        assert_eq!(header.last().map(String::as_str), Some("Benefit 14"));
    }

    #[test]
    fn writes_one_row_per_job() {
        let mut out = Vec::new();
        let count = write_jobs_csv(&[job()], &mut out).unwrap();
        assert_eq!(count, 1);

        let mut reader = csv::Reader::from_reader(out.as_slice());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(&row[0], "Data Analyst");
        assert_eq!(&row[1], "Acme, Inc.");
        assert_eq!(&row[11], "2026-03-01 09:30:00");
        assert_eq!(&row[13], "SQL");
        assert_eq!(&row[14], "Excel");
        assert_eq!(&row[15], "");
        assert_eq!(&row[13 + MAX_LIST_ITEMS], "Lunch");
    }
}
