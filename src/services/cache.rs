// src/services/cache.rs
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use csv::{Reader, Writer};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{HistorySeries, Region};
use super::Result;

pub const MACRO_SNAPSHOT: &str = "macro_snapshot.json";
pub const BONDS_SNAPSHOT: &str = "bonds_snapshot.json";
pub const STOCKS_SNAPSHOT: &str = "stocks_snapshot.json";
pub const NEWS_ITEMS: &str = "news_items.json";
pub const CPI_HISTORY: &str = "macro_history.csv";
pub const SUBSCRIBERS: &str = "email_recipients.json";

const HISTORY_YEAR_COLUMN: &str = "date";

/// Flat-file cache. Every artifact is a single file in `dir`; freshness comes
/// from the file's modification time. Writes overwrite the whole file and are
/// not coordinated between writers.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn read(&self, name: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(name)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn write(&self, name: &str, blob: &str) -> Result<()> {
        fs::write(self.path(name), blob)?;
        debug!("Wrote cache artifact {} ({} bytes)", name, blob.len());
        Ok(())
    }

    pub fn is_stale(&self, name: &str, max_age: Duration) -> bool {
        self.is_stale_at(name, max_age, SystemTime::now())
    }

    pub fn is_stale_at(&self, name: &str, max_age: Duration, now: SystemTime) -> bool {
        match fs::metadata(self.path(name)).and_then(|m| m.modified()) {
            Ok(modified) => age_exceeds(modified, now, max_age),
            Err(_) => true,
        }
    }

    /// `Ok(None)` only when the artifact has never been written. Unreadable
    /// or malformed files are errors.
    pub fn try_load_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.read(name)? {
            Some(blob) => {
                let value = serde_json::from_str(&blob)
                    .map_err(|e| format!("Malformed cache artifact {}: {}", name, e))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Missing, unreadable or malformed artifacts come back as `None`.
    pub fn load_json<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.try_load_json(name).unwrap_or_else(|e| {
            warn!("Ignoring cache artifact {}: {}", name, e);
            None
        })
    }

    pub fn save_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let blob = serde_json::to_string_pretty(value)?;
        self.write(name, &blob)
    }

    pub fn load_history(&self) -> HistorySeries {
        match self.read(CPI_HISTORY) {
            Ok(Some(text)) => parse_history_csv(&text).unwrap_or_else(|e| {
                warn!("Ignoring malformed CPI history: {}", e);
                HistorySeries::new()
            }),
            Ok(None) => HistorySeries::new(),
            Err(e) => {
                warn!("Failed to read CPI history: {}", e);
                HistorySeries::new()
            }
        }
    }

    pub fn save_history(&self, history: &HistorySeries) -> Result<()> {
        let text = render_history_csv(history)?;
        self.write(CPI_HISTORY, &text)
    }
}

/// True when the artifact is older than `max_age`. A zero threshold always
/// forces a refresh; an age exactly equal to the threshold is still fresh.
pub fn age_exceeds(modified: SystemTime, now: SystemTime, max_age: Duration) -> bool {
    if max_age.is_zero() {
        return true;
    }
    match now.duration_since(modified) {
        Ok(age) => age > max_age,
        // mtime ahead of the clock
        Err(_) => false,
    }
}

fn history_column(region: Region) -> String {
    format!("{}-CPI", region.code())
}

pub fn parse_history_csv(text: &str) -> Result<HistorySeries> {
    let mut rdr = Reader::from_reader(text.as_bytes());
    let headers = rdr.headers()?.clone();

    let idx_year = headers
        .iter()
        .position(|h| h.trim() == HISTORY_YEAR_COLUMN)
        .ok_or("No 'date' column in CPI history")?;
    let region_columns: Vec<(Region, usize)> = Region::ALL
        .iter()
        .filter_map(|r| {
            let name = history_column(*r);
            headers.iter().position(|h| h.trim() == name).map(|idx| (*r, idx))
        })
        .collect();

    let mut history = HistorySeries::new();
    for record in rdr.records() {
        let row = record?;
        let year: i32 = row
            .get(idx_year)
            .ok_or("Missing 'date' field")?
            .trim()
            .parse()?;
        for (region, idx) in &region_columns {
            let cell = row.get(*idx).unwrap_or("").trim();
            let value = if cell.is_empty() { None } else { Some(cell.parse::<f64>()?) };
            history.set(year, *region, value);
        }
    }
    Ok(history)
}

pub fn render_history_csv(history: &HistorySeries) -> Result<String> {
    let mut wtr = Writer::from_writer(Vec::new());

    let mut header = vec![HISTORY_YEAR_COLUMN.to_string()];
    header.extend(Region::ALL.iter().map(|r| history_column(*r)));
    wtr.write_record(&header)?;

    for row in history.rows() {
        let mut record = vec![row.year.to_string()];
        for region in Region::ALL {
            record.push(row.cpi.get(region).map(|v| v.to_string()).unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }

    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MacroSnapshot;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn staleness_boundaries() {
        let written = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let threshold = 20 * MINUTE;

        assert!(!age_exceeds(written, written + threshold, threshold));
        assert!(age_exceeds(written, written + threshold + Duration::from_secs(1), threshold));
        assert!(!age_exceeds(written, written + 5 * MINUTE, threshold));
    }

    #[test]
    fn zero_threshold_is_always_stale() {
        let now = SystemTime::now();
        assert!(age_exceeds(now, now, Duration::ZERO));
    }

    #[test]
    fn never_written_artifact_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path()).unwrap();
        assert!(cache.is_stale(MACRO_SNAPSHOT, Duration::from_secs(u64::MAX / 4)));
        assert!(cache.read(MACRO_SNAPSHOT).unwrap().is_none());
    }

    #[test]
    fn freshly_written_artifact_is_not_stale() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path()).unwrap();
        cache.write(NEWS_ITEMS, "[]").unwrap();
        assert!(!cache.is_stale(NEWS_ITEMS, 30 * MINUTE));
        assert_eq!(cache.read(NEWS_ITEMS).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn malformed_json_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path()).unwrap();
        cache.write(MACRO_SNAPSHOT, "{not json").unwrap();
        assert!(cache.load_json::<MacroSnapshot>(MACRO_SNAPSHOT).is_none());
        assert!(cache.try_load_json::<MacroSnapshot>(MACRO_SNAPSHOT).is_err());
        assert!(cache.try_load_json::<MacroSnapshot>(BONDS_SNAPSHOT).unwrap().is_none());
    }

    #[test]
    fn history_csv_keeps_blank_cells_as_null() {
        let mut history = HistorySeries::new();
        history.set(2019, Region::CN, Some(2.9));
        history.set(2020, Region::US, Some(1.2));

        let text = render_history_csv(&history).unwrap();
        assert!(text.starts_with("date,CN-CPI,US-CPI,EU-CPI"));

        let parsed = parse_history_csv(&text).unwrap();
        assert_eq!(parsed.get(2019, Region::CN), Some(2.9));
        assert_eq!(parsed.get(2019, Region::US), None);
        assert_eq!(parsed.get(2020, Region::US), Some(1.2));
    }

    #[test]
    fn history_csv_tolerates_missing_region_columns() {
        let parsed = parse_history_csv("date,US-CPI\n2018,2.4\n").unwrap();
        assert_eq!(parsed.get(2018, Region::US), Some(2.4));
        assert_eq!(parsed.get(2018, Region::CN), None);
    }
}
