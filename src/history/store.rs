use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::record::{QueryRecord, HEADERS};

/// Append-only history kept in a headed, comma-separated file.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the header row if the file is absent or empty. Returns true when it did so.
    pub fn ensure_initialized(&self) -> Result<bool> {
        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to inspect history file {:?}", self.path)
                })
            }
        };
        if !needs_header {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create history file {:?}", self.path))?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(HEADERS)?;
        writer
            .flush()
            .with_context(|| format!("Failed to write header to {:?}", self.path))?;
        info!(path = ?self.path, "initialized empty history file");
        Ok(true)
    }

    /// True when the file has content whose last byte is not a line break.
    fn lacks_trailing_newline(&self) -> Result<bool> {
        let mut file = File::open(&self.path)
            .with_context(|| format!("Failed to open history file {:?}", self.path))?;
        if file.metadata()?.len() == 0 {
            return Ok(false);
        }
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last).with_context(|| {
            format!("Failed to read end of history file {:?}", self.path)
        })?;
        Ok(last[0] != b'\n')
    }

    pub fn append(&self, record: &QueryRecord) -> Result<()> {
        self.ensure_initialized()?;
        let unterminated = self.lacks_trailing_newline()?;
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open history file {:?} for append", self.path))?;
        // A hand-edited last line may lack its newline; the new row must not join it.
        if unterminated {
            file.write_all(b"\n").with_context(|| {
                format!("Failed to terminate last line of {:?}", self.path)
            })?;
        }
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write record to {:?}", self.path))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush history file {:?}", self.path))?;
        debug!(query = %record.query, diet = %record.diet, "appended history record");
        Ok(())
    }

    /// Every decodable record in file order. Rows that fail to decode are skipped with a warning.
    pub fn load_all(&self) -> Result<Vec<QueryRecord>> {
        self.ensure_initialized()?;
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open history file {:?}", self.path))?;
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

        let headers = rdr
            .headers()
            .with_context(|| format!("Failed to read header of {:?}", self.path))?
            .clone();
        for column in HEADERS {
            if !headers.iter().any(|h| h == column) {
                return Err(anyhow!(
                    "Column '{}' not found in history file {:?}",
                    column,
                    self.path
                ));
            }
        }

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (row_index, result) in rdr.deserialize::<QueryRecord>().enumerate() {
            match result {
                Ok(record) => records.push(record),
                Err(e) if e.is_io_error() => {
                    return Err(e).with_context(|| {
                        format!("Failed to read record at row index {}", row_index)
                    });
                }
                Err(e) => {
                    skipped += 1;
                    let line = e.position().map(|p| p.line()).unwrap_or(row_index as u64 + 2);
                    warn!(path = ?self.path, line, error = %e, "skipping malformed history row");
                }
            }
        }
        if skipped > 0 {
            warn!(
                path = ?self.path,
                skipped,
                loaded = records.len(),
                "history loaded with skipped rows"
            );
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diet::Diet;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::tempdir;

    fn at(day: u32, hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_load_all_initializes_missing_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("history.csv");
        let store = HistoryStore::new(&path);

        assert!(store.load_all()?.is_empty());
        assert_eq!(fs::read_to_string(&path)?, "Timestamp,Query,Diet\n");
        Ok(())
    }

    #[test]
    fn test_append_then_load_single_record() -> Result<()> {
        let dir = tempdir()?;
        let store = HistoryStore::new(dir.path().join("history.csv"));
        let record = QueryRecord::new(at(1, 10), "vegan breakfast", Diet::Vegan);

        store.append(&record)?;

        let loaded = store.load_all()?;
        assert_eq!(loaded, vec![record]);
        assert_eq!(
            fs::read_to_string(store.path())?,
            "Timestamp,Query,Diet\n2024-01-01 10:00:00,vegan breakfast,Vegan\n"
        );
        Ok(())
    }

    #[test]
    fn test_append_keeps_order_and_header() -> Result<()> {
        let dir = tempdir()?;
        let store = HistoryStore::new(dir.path().join("nested").join("history.csv"));
        let records = vec![
            QueryRecord::new(at(1, 9), "masala dosa", Diet::None),
            QueryRecord::new(at(2, 13), "paneer, spinach & \"rice\"", Diet::HighProtein),
            QueryRecord::new(at(3, 19), "cauliflower mash", Diet::LowCarb),
        ];
        for record in &records {
            store.append(record)?;
            assert_eq!(store.load_all()?.last(), Some(record));
        }

        assert_eq!(store.load_all()?, records);
        let contents = fs::read_to_string(store.path())?;
        assert_eq!(contents.matches("Timestamp,Query,Diet").count(), 1);
        Ok(())
    }

    #[test]
    fn test_malformed_rows_are_skipped() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("history.csv");
        let mut file = File::create(&path)?;
        writeln!(file, "Timestamp,Query,Diet")?;
        writeln!(file, "2024-01-01 10:00:00,vegan breakfast,Vegan")?;
        writeln!(file, "not a date,broken,Vegan")?;
        writeln!(file, "2024-01-02 11:00:00,mystery,Paleo")?;
        writeln!(file, "2024-01-03 12:00:00,too,many,fields")?;
        writeln!(file, "2024-01-04 08:15:00,keto bread,Keto")?;
        file.flush()?;

        let loaded = HistoryStore::new(&path).load_all()?;
        let queries: Vec<&str> = loaded.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, vec!["vegan breakfast", "keto bread"]);
        Ok(())
    }

    #[test]
    fn test_append_after_unterminated_last_row() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("history.csv");
        fs::write(
            &path,
            "Timestamp,Query,Diet\n2024-01-01 10:00:00,vegan breakfast,Vegan",
        )?;
        let store = HistoryStore::new(&path);
        let appended = QueryRecord::new(at(2, 9), "keto bread", Diet::Keto);

        store.append(&appended)?;

        let loaded = store.load_all()?;
        assert_eq!(
            loaded,
            vec![
                QueryRecord::new(at(1, 10), "vegan breakfast", Diet::Vegan),
                appended
            ]
        );
        Ok(())
    }

    #[test]
    fn test_append_after_unterminated_header() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("history.csv");
        fs::write(&path, "Timestamp,Query,Diet")?;
        let store = HistoryStore::new(&path);
        let appended = QueryRecord::new(at(3, 18), "rajma chawal", Diet::HighProtein);

        store.append(&appended)?;

        assert_eq!(store.load_all()?, vec![appended]);
        assert_eq!(
            fs::read_to_string(&path)?,
            "Timestamp,Query,Diet\n2024-01-03 18:00:00,rajma chawal,High Protein\n"
        );
        Ok(())
    }

    #[test]
    fn test_missing_column_fails_fast() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("history.csv");
        fs::write(&path, "Timestamp,Query\n2024-01-01 10:00:00,soup\n")?;

        let result = HistoryStore::new(&path).load_all();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Column 'Diet' not found"));
        Ok(())
    }

    #[test]
    fn test_empty_file_gets_header() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("history.csv");
        File::create(&path)?;
        let store = HistoryStore::new(&path);

        assert!(store.ensure_initialized()?);
        assert!(!store.ensure_initialized()?);
        assert!(store.load_all()?.is_empty());
        Ok(())
    }
}
