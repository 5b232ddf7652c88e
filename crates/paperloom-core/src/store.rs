//! Year-partitioned record store
//!
//! One `{year}.json` file per publication year, shape
//! `{year, count, papers}`. Writes go through a `.tmp` sibling and a rename
//! so an interrupted run never corrupts the previous valid partition.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::record::PaperRecord;

#[derive(Debug, Serialize, Deserialize)]
pub struct YearPartition {
    pub year: i32,
    pub count: usize,
    pub papers: Vec<PaperRecord>,
}

#[derive(Serialize)]
struct PartitionOut<'a> {
    year: i32,
    count: usize,
    papers: &'a [PaperRecord],
}

/// Serialize to `path` via tmp-file-then-rename.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &json).with_context(|| format!("cannot write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("cannot rename {} → {}", tmp.display(), path.display()))?;
    Ok(())
}

pub struct YearStore {
    dir: PathBuf,
}

impl YearStore {
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create data dir {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn partition_path(&self, year: i32) -> PathBuf {
        self.dir.join(format!("{year}.json"))
    }

    /// Records for one year; empty (not an error) when no partition exists.
    pub fn load(&self, year: i32) -> Result<Vec<PaperRecord>> {
        let path = self.partition_path(year);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("cannot read partition {}", path.display()))?;
        let part: YearPartition = serde_json::from_str(&content)
            .with_context(|| format!("corrupt partition {}", path.display()))?;
        if part.count != part.papers.len() {
            log::warn!(
                "partition {year}: count {} disagrees with {} papers, trusting papers",
                part.count,
                part.papers.len()
            );
        }
        Ok(part.papers)
    }

    /// Persist a full partition. `count` is denormalized from the slice.
    pub fn save(&self, year: i32, papers: &[PaperRecord]) -> Result<()> {
        let out = PartitionOut {
            year,
            count: papers.len(),
            papers,
        };
        write_json_atomic(&self.partition_path(year), &out)
            .with_context(|| format!("saving partition {year}"))
    }

    /// Years with an existing partition, ascending.
    pub fn years(&self) -> Result<Vec<i32>> {
        let mut years = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("cannot list data dir {}", self.dir.display()))?
        {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // partitions are 4-digit years; index.json and friends are not
            if stem.len() == 4 && stem.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(year) = stem.parse() {
                    years.push(year);
                }
            }
        }
        years.sort_unstable();
        Ok(years)
    }

    /// Every partition's contents, for index rebuilds.
    pub fn load_all(&self) -> Result<Vec<(i32, Vec<PaperRecord>)>> {
        let mut all = Vec::new();
        for year in self.years()? {
            all.push((year, self.load(year)?));
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Links, Tags};

    fn record(id: &str) -> PaperRecord {
        PaperRecord {
            id: id.to_string(),
            title: format!("Paper {id}"),
            abstract_text: String::new(),
            authors: Vec::new(),
            published: "2024-03-01T00:00:00Z".to_string(),
            updated: "2024-03-01T00:00:00Z".to_string(),
            source_categories: Vec::new(),
            primary_category: None,
            links: Links::default(),
            categories: Vec::new(),
            tags: Tags::default(),
            fetched_at: String::new(),
        }
    }

    #[test]
    fn load_missing_year_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = YearStore::new(dir.path()).unwrap();
        assert!(store.load(2024).unwrap().is_empty());
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = YearStore::new(dir.path()).unwrap();
        let papers = vec![record("2403.00001"), record("2403.00002")];
        store.save(2024, &papers).unwrap();
        assert_eq!(store.load(2024).unwrap(), papers);
    }

    #[test]
    fn save_writes_count_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let store = YearStore::new(dir.path()).unwrap();
        store.save(2024, &[record("2403.00001")]).unwrap();

        let content = fs::read_to_string(store.partition_path(2024)).unwrap();
        let part: YearPartition = serde_json::from_str(&content).unwrap();
        assert_eq!(part.year, 2024);
        assert_eq!(part.count, 1);

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn years_skips_non_partition_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = YearStore::new(dir.path()).unwrap();
        store.save(2023, &[record("2301.00001")]).unwrap();
        store.save(2024, &[record("2403.00001")]).unwrap();
        fs::write(dir.path().join("index.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        assert_eq!(store.years().unwrap(), vec![2023, 2024]);
    }

    #[test]
    fn load_tolerates_stale_count() {
        let dir = tempfile::tempdir().unwrap();
        let store = YearStore::new(dir.path()).unwrap();
        let json = serde_json::json!({
            "year": 2024,
            "count": 99,
            "papers": [serde_json::to_value(record("2403.00001")).unwrap()],
        });
        fs::write(store.partition_path(2024), json.to_string()).unwrap();
        assert_eq!(store.load(2024).unwrap().len(), 1);
    }

    #[test]
    fn load_corrupt_partition_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = YearStore::new(dir.path()).unwrap();
        fs::write(store.partition_path(2024), "{truncated").unwrap();
        assert!(store.load(2024).is_err());
    }
}
