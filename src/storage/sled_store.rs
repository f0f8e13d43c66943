//! sled-backed storage gateway

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, warn};

use super::{JobStore, RawHtmlStats, SaveOutcome};
use crate::types::{ExtractedFields, JobRecord, RawHtmlRecord};

/// Jobs keyed by link and cached pages keyed by URL, stored as JSON
pub struct SledJobStore {
    db: sled::Db,
    jobs: sled::Tree,
    raw_html: sled::Tree,
}

impl SledJobStore {
    /// Open or create the database under `data_dir`
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let db_path = data_dir.as_ref().join("jobs.sled");
        let db = sled::open(&db_path)
            .with_context(|| format!("Failed to open job database at {:?}", db_path))?;
        Self::from_db(db)
    }

    /// In-memory database removed on drop
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .context("Failed to open temporary job database")?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self> {
        let jobs = db.open_tree("jobs").context("Failed to open jobs tree")?;
        let raw_html = db
            .open_tree("raw_html")
            .context("Failed to open raw_html tree")?;
        Ok(Self { db, jobs, raw_html })
    }

    fn decode<T: DeserializeOwned>(key: &[u8], data: &[u8]) -> Option<T> {
        match serde_json::from_slice(data) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    "Skipping undecodable entry {}: {}",
                    String::from_utf8_lossy(key),
                    e
                );
                None
            }
        }
    }

    fn get_raw_html(&self, url: &str) -> Result<Option<RawHtmlRecord>> {
        let data = self
            .raw_html
            .get(url.as_bytes())
            .with_context(|| format!("Failed to read cached page {}", url))?;
        Ok(data.and_then(|d| Self::decode(url.as_bytes(), &d)))
    }

    fn put_raw_html(&self, record: &RawHtmlRecord) -> Result<()> {
        let data = serde_json::to_vec(record)
            .with_context(|| format!("Failed to serialize cached page {}", record.url))?;
        self.raw_html
            .insert(record.url.as_bytes(), data)
            .with_context(|| format!("Failed to store cached page {}", record.url))?;
        Ok(())
    }

    fn raw_html_records(&self) -> impl Iterator<Item = RawHtmlRecord> + '_ {
        self.raw_html.iter().filter_map(|entry| match entry {
            Ok((key, data)) => Self::decode(&key, &data),
            Err(e) => {
                warn!("Failed to read raw_html tree: {}", e);
                None
            }
        })
    }
}

impl JobStore for SledJobStore {
    fn save_job(&self, fields: &ExtractedFields) -> Result<SaveOutcome> {
        let Some(record) = JobRecord::from_fields(fields, Utc::now()) else {
            return Ok(SaveOutcome::MissingRequired);
        };

        let data = serde_json::to_vec(&record)
            .with_context(|| format!("Failed to serialize job {}", record.link))?;

        // Insert only if absent; a concurrent writer for the same link loses here
        let swapped = self
            .jobs
            .compare_and_swap(record.link.as_bytes(), None as Option<&[u8]>, Some(data))
            .with_context(|| format!("Failed to store job {}", record.link))?;

        match swapped {
            Ok(()) => {
                debug!("Saved job {}", record.link);
                Ok(SaveOutcome::Saved)
            }
            Err(_) => Ok(SaveOutcome::Duplicate),
        }
    }

    fn upsert_raw_html(
        &self,
        url: &str,
        html: &str,
        fetched_at: DateTime<Utc>,
        source_domain: &str,
    ) -> Result<RawHtmlRecord> {
        let record = match self.get_raw_html(url)? {
            Some(mut existing) => {
                existing.html_content = html.to_string();
                existing.fetched_at = fetched_at;
                existing.source_domain = source_domain.to_string();
                existing
            }
            None => RawHtmlRecord::new(url, html, fetched_at, source_domain),
        };
        self.put_raw_html(&record)?;
        Ok(record)
    }

    fn mark_processed(&self, url: &str, success: bool, processed_at: DateTime<Utc>) -> Result<bool> {
        let Some(mut record) = self.get_raw_html(url)? else {
            return Ok(false);
        };
        record.last_processed_at = Some(processed_at);
        record.processing_succeeded = success;
        self.put_raw_html(&record)?;
        Ok(true)
    }

    fn query_unprocessed_raw_html(&self, domain_filter: Option<&str>, limit: usize) -> Result<Vec<RawHtmlRecord>> {
        let filter = domain_filter.map(str::to_lowercase);
        let mut records: Vec<RawHtmlRecord> = self
            .raw_html_records()
            .filter(|r| !r.processing_succeeded)
            .filter(|r| match &filter {
                Some(f) => r.source_domain.to_lowercase().contains(f.as_str()),
                None => true,
            })
            .collect();

        records.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at));
        records.truncate(limit);
        Ok(records)
    }

    fn get_job(&self, link: &str) -> Result<Option<JobRecord>> {
        let data = self
            .jobs
            .get(link.as_bytes())
            .with_context(|| format!("Failed to read job {}", link))?;
        Ok(data.and_then(|d| Self::decode(link.as_bytes(), &d)))
    }

    fn all_jobs(&self) -> Result<Vec<JobRecord>> {
        let mut jobs = Vec::with_capacity(self.jobs.len());
        for entry in self.jobs.iter() {
            let (key, data) = entry.context("Failed to read jobs tree")?;
            if let Some(job) = Self::decode::<JobRecord>(&key, &data) {
                jobs.push(job);
            }
        }
        jobs.sort_by(|a, b| a.posted_at.cmp(&b.posted_at));
        Ok(jobs)
    }

    fn job_count(&self) -> usize {
        self.jobs.len()
    }

    fn raw_html_stats(&self) -> Result<RawHtmlStats> {
        let mut stats = RawHtmlStats::default();
        for record in self.raw_html_records() {
            stats.total += 1;
            if record.processing_succeeded {
                stats.succeeded += 1;
            } else {
                stats.pending += 1;
            }
        }
        Ok(stats)
    }

    fn flush(&self) -> Result<()> {
        self.db.flush().context("Failed to flush job database")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Field;
    use chrono::Duration;

    fn job(title: Option<&str>, link: Option<&str>) -> ExtractedFields {
        let mut fields = ExtractedFields::default();
        if let Some(title) = title {
            fields.set(Field::Title, title);
        }
        if let Some(link) = link {
            fields.set(Field::Link, link);
        }
        fields
    }

    #[test]
    fn save_twice_persists_once() {
        let store = SledJobStore::temporary().unwrap();
        let fields = job(Some("Accountant"), Some("https://jobs.example.com/1"));

        assert_eq!(store.save_job(&fields).unwrap(), SaveOutcome::Saved);

        let mut again = fields.clone();
        again.title = Some("Senior Accountant".to_string());
        assert_eq!(store.save_job(&again).unwrap(), SaveOutcome::Duplicate);

        assert_eq!(store.job_count(), 1);
        let stored = store.get_job("https://jobs.example.com/1").unwrap().unwrap();
        assert_eq!(stored.title, "Accountant");
    }

    #[test]
    fn missing_title_or_link_persists_nothing() {
        let store = SledJobStore::temporary().unwrap();
        assert_eq!(
            store.save_job(&job(None, Some("https://jobs.example.com/1"))).unwrap(),
            SaveOutcome::MissingRequired
        );
        assert_eq!(
            store.save_job(&job(Some("Driver"), None)).unwrap(),
            SaveOutcome::MissingRequired
        );
        assert_eq!(store.job_count(), 0);
    }

    #[test]
    fn skills_are_stored_with_the_record() {
        let store = SledJobStore::temporary().unwrap();
        let mut fields = job(Some("Developer"), Some("https://jobs.example.com/dev"));
        fields.skills = vec!["Rust".to_string(), "SQL".to_string()];
        store.save_job(&fields).unwrap();

        let jobs = store.all_jobs().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].skills, vec!["Rust".to_string(), "SQL".to_string()]);
    }

    #[test]
    fn upsert_keeps_processing_state() {
        let store = SledJobStore::temporary().unwrap();
        let url = "https://jobs.example.com/1";
        let t0 = Utc::now();

        let created = store.upsert_raw_html(url, "<p>v1</p>", t0, "jobs.example.com").unwrap();
        assert!(!created.processing_succeeded);
        assert!(store.mark_processed(url, true, t0).unwrap());

        let refreshed = store
            .upsert_raw_html(url, "<p>v2</p>", t0 + Duration::seconds(5), "jobs.example.com")
            .unwrap();
        assert_eq!(refreshed.html_content, "<p>v2</p>");
        assert!(refreshed.processing_succeeded);
        assert_eq!(refreshed.last_processed_at, Some(t0));
    }

    #[test]
    fn mark_processed_unknown_url() {
        let store = SledJobStore::temporary().unwrap();
        assert!(!store.mark_processed("https://nowhere.example", true, Utc::now()).unwrap());
    }

    #[test]
    fn unprocessed_query_filters_and_orders() {
        let store = SledJobStore::temporary().unwrap();
        let t0 = Utc::now();
        store.upsert_raw_html("https://a.example/1", "", t0, "https://a.example").unwrap();
        store
            .upsert_raw_html("https://a.example/2", "", t0 + Duration::seconds(1), "https://a.example")
            .unwrap();
        store
            .upsert_raw_html("https://b.example/1", "", t0 + Duration::seconds(2), "https://b.example")
            .unwrap();
        store.upsert_raw_html("https://a.example/3", "", t0, "https://a.example").unwrap();
        store.mark_processed("https://a.example/3", true, t0).unwrap();
        store.mark_processed("https://a.example/1", false, t0).unwrap();

        let all = store.query_unprocessed_raw_html(None, 10).unwrap();
        let urls: Vec<&str> = all.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://b.example/1", "https://a.example/2", "https://a.example/1"]);

        let only_a = store.query_unprocessed_raw_html(Some("A.EXAMPLE"), 1).unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].url, "https://a.example/2");

        let stats = store.raw_html_stats().unwrap();
        assert_eq!(stats, RawHtmlStats { total: 4, succeeded: 1, pending: 3 });
    }

    #[test]
    fn reopens_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SledJobStore::open(dir.path()).unwrap();
            store
                .save_job(&job(Some("Chef"), Some("https://jobs.example.com/chef")))
                .unwrap();
            store.flush().unwrap();
        }
        let store = SledJobStore::open(dir.path()).unwrap();
        assert_eq!(store.job_count(), 1);
    }
}
