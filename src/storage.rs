//! CSV persistence for raw, normalized and skill-tagged job datasets.

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{NormalizedJobRecord, RawJobRecord, SkillCount, SkilledJobRecord};

/// Encoding of list-valued columns (`Welfare`, `Soft Skills`, ...) as one CSV cell.
///
/// Lists are written as bracketed, quoted items: `['Thưởng', 'Du lịch']`.
pub mod list_cell {
    use serde::{Deserialize, Deserializer, Serializer};

    fn quote(item: &str) -> String {
        let escaped = item
            .replace('\\', "\\\\")
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t");
        if item.contains('\'') && !item.contains('"') {
            format!("\"{}\"", escaped)
        } else {
            format!("'{}'", escaped.replace('\'', "\\'"))
        }
    }

    pub fn encode(items: &[String]) -> String {
        let quoted: Vec<String> = items.iter().map(|i| quote(i)).collect();
        format!("[{}]", quoted.join(", "))
    }

    /// Parse a list cell. A cell that is not bracketed is read as a single item.
    pub fn decode(cell: &str) -> Vec<String> {
        let cell = cell.trim();
        if cell.is_empty() || cell == "[]" {
            return Vec::new();
        }
        let Some(inner) = cell.strip_prefix('[').and_then(|c| c.strip_suffix(']')) else {
            return vec![cell.to_string()];
        };

        let mut items = Vec::new();
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\'' && c != '"' {
                continue;
            }
            let delimiter = c;
            let mut item = String::new();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => match chars.next() {
                        Some('n') => item.push('\n'),
                        Some('r') => item.push('\r'),
                        Some('t') => item.push('\t'),
                        Some(other) => item.push(other),
                        None => break,
                    },
                    c if c == delimiter => break,
                    c => item.push(c),
                }
            }
            items.push(item);
        }
        items
    }

    pub fn serialize<S: Serializer>(items: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(items))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let cell = String::deserialize(deserializer)?;
        Ok(decode(&cell))
    }
}

fn create_writer(path: &Path) -> anyhow::Result<csv::Writer<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    // Headers are always written by the caller so an empty dataset still carries its columns.
    Ok(csv::WriterBuilder::new().has_headers(false).from_writer(file))
}

fn write_serialized<T: Serialize>(path: &Path, rows: &[T], header: &[&str]) -> anyhow::Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_serialized<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut rows = Vec::new();
    for (line, row) in reader.deserialize().enumerate() {
        rows.push(row.with_context(|| format!("Invalid row {} in {}", line + 2, path.display()))?);
    }
    Ok(rows)
}

/// Column order of the raw CSV.
pub const RAW_COLUMNS: [&str; 14] = [
    "Job Title",
    "Company",
    "Location",
    "Salary",
    "Date",
    "Job Link",
    "Expire Date",
    "Welfare",
    "Job Description",
    "Job Requirements",
    "Job Level",
    "Job Type",
    "Experience",
    "Industry",
];

pub fn write_raw_jobs(path: &Path, jobs: &[RawJobRecord]) -> anyhow::Result<()> {
    write_serialized(path, jobs, &RAW_COLUMNS)
}

pub fn read_raw_jobs(path: &Path) -> anyhow::Result<Vec<RawJobRecord>> {
    read_serialized(path)
}

pub fn write_normalized_jobs(path: &Path, jobs: &[NormalizedJobRecord]) -> anyhow::Result<()> {
    write_serialized(path, jobs, &crate::models::NORMALIZED_COLUMNS)
}

pub fn read_normalized_jobs(path: &Path) -> anyhow::Result<Vec<NormalizedJobRecord>> {
    read_serialized(path)
}

pub fn write_skilled_jobs(path: &Path, jobs: &[SkilledJobRecord]) -> anyhow::Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_record(SkilledJobRecord::header())?;
    for job in jobs {
        writer.write_record(job.cells())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_skill_counts(path: &Path, counts: &[SkillCount]) -> anyhow::Result<()> {
    write_serialized(path, counts, &["Skill", "Count"])
}

pub fn read_skill_counts(path: &Path) -> anyhow::Result<Vec<SkillCount>> {
    read_serialized(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpireDate, JobDetail, ListingItem};
    use chrono::NaiveDate;

    fn raw(link: &str) -> RawJobRecord {
        ListingItem {
            title: "Business Analyst".to_string(),
            company: "Công ty ABC".to_string(),
            location: "Hà Nội\r\nHồ Chí Minh".to_string(),
            salary: "15 - 20 Tr VND".to_string(),
            posted: "01-03-2025".to_string(),
            expires: "Hôm nay".to_string(),
            link: link.to_string(),
            welfare: vec!["Chế độ bảo hiểm".to_string(), "Laptop, MacBook".to_string()],
        }
        .into_record(JobDetail::unavailable())
    }

    #[test]
    fn test_list_cell_encoding() {
        assert_eq!(list_cell::encode(&[]), "[]");
        assert_eq!(
            list_cell::encode(&["SQL".to_string(), "Power BI".to_string()]),
            "['SQL', 'Power BI']"
        );
        assert_eq!(list_cell::encode(&["it's".to_string()]), "[\"it's\"]");
    }

    #[test]
    fn test_list_cell_decoding() {
        assert!(list_cell::decode("").is_empty());
        assert!(list_cell::decode("[]").is_empty());
        assert_eq!(
            list_cell::decode("['SQL', 'Power BI', \"it's\"]"),
            vec!["SQL", "Power BI", "it's"]
        );
        assert_eq!(list_cell::decode(r"['a\'b', 'x, y']"), vec!["a'b", "x, y"]);
        assert_eq!(list_cell::decode("plain"), vec!["plain"]);
    }

    #[test]
    fn test_raw_jobs_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw").join("jobs.csv");
        let jobs = vec![raw("https://x/1"), raw("https://x/2")];

        write_raw_jobs(&path, &jobs).unwrap();
        let header = std::fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("Job Title,Company,Location,Salary,Date,Job Link"));

        let loaded = read_raw_jobs(&path).unwrap();
        assert_eq!(loaded, jobs);
    }

    #[test]
    fn test_empty_dataset_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_raw_jobs(&path, &[]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), RAW_COLUMNS.join(","));
        assert!(read_raw_jobs(&path).unwrap().is_empty());
    }

    #[test]
    fn test_normalized_nulls_and_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.csv");

        let mut job = NormalizedJobRecord::from_raw(raw("https://x/1"));
        job.date = NaiveDate::from_ymd_opt(2025, 3, 1);
        job.expire_date = ExpireDate::Unknown;
        job.min_salary = Some(15_000_000.0);
        job.max_salary = Some(20_000_000.0);
        job.exp_min = Some(2.0);
        job.exp_max = None;

        write_normalized_jobs(&path, std::slice::from_ref(&job)).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(",unknown,"));

        let loaded = read_normalized_jobs(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].expire_date, ExpireDate::Unknown);
        assert_eq!(loaded[0].date, job.date);
        assert_eq!(loaded[0].exp_max, None);
        assert_eq!(loaded[0].min_salary, Some(15_000_000.0));
    }

    #[test]
    fn test_skill_counts_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hard_skills.csv");
        let counts = vec![
            SkillCount {
                skill: "SQL".to_string(),
                count: 3,
            },
            SkillCount {
                skill: "Python".to_string(),
                count: 1,
            },
        ];
        write_skill_counts(&path, &counts).unwrap();
        assert_eq!(read_skill_counts(&path).unwrap(), counts);
    }
}
