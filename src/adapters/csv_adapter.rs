//! CSV file cache adapter: one `<SECID>.csv` per security under a base directory.

use crate::domain::candle::{Candle, COLUMNS};
use crate::domain::error::MoexError;
use crate::ports::cache_port::CachePort;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn csv_path(&self, sec_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", sec_id.to_uppercase()))
    }

    /// Security ids that have a cache file, sorted.
    ///
    /// Only upper-case stems are listed, since those are the names `load` opens.
    pub fn list_cached(&self) -> Result<Vec<String>, MoexError> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut sec_ids = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(sec_id) = name_str.strip_suffix(".csv") {
                let loadable = !sec_id.is_empty() && sec_id == sec_id.to_uppercase();
                if loadable && entry.file_type()?.is_file() {
                    sec_ids.push(sec_id.to_string());
                }
            }
        }

        sec_ids.sort();
        Ok(sec_ids)
    }

    /// Write `candles` as CSV to any writer, header first.
    pub fn write_table<W: std::io::Write>(writer: W, candles: &[Candle]) -> Result<(), MoexError> {
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        wtr.write_record(COLUMNS).map_err(csv_to_io)?;
        for candle in candles {
            wtr.serialize(candle).map_err(csv_to_io)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn malformed(path: &Path, reason: String) -> MoexError {
        MoexError::CacheMalformed {
            path: path.display().to_string(),
            reason,
        }
    }
}

fn csv_to_io(err: csv::Error) -> MoexError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => MoexError::Io(e),
        _ => MoexError::Io(std::io::Error::other(message)),
    }
}

impl CachePort for CsvAdapter {
    fn load(&self, sec_id: &str) -> Result<Vec<Candle>, MoexError> {
        let path = self.csv_path(sec_id);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MoexError::CacheNotFound {
                    path: path.display().to_string(),
                });
            }
            Err(e) => return Err(MoexError::Io(e)),
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| Self::malformed(&path, format!("unreadable header: {e}")))?;
        let found: Vec<&str> = headers.iter().collect();
        if found != COLUMNS {
            return Err(Self::malformed(
                &path,
                format!("expected columns {:?}, found {:?}", COLUMNS, found),
            ));
        }

        let mut candles = Vec::new();
        for (line, result) in rdr.deserialize::<Candle>().enumerate() {
            let candle = result
                .map_err(|e| Self::malformed(&path, format!("row {}: {}", line + 1, e)))?;
            candles.push(candle);
        }

        debug!(path = %path.display(), rows = candles.len(), "read cache file");
        Ok(candles)
    }

    fn save(&self, sec_id: &str, candles: &[Candle]) -> Result<(), MoexError> {
        fs::create_dir_all(&self.base_path)?;
        let path = self.csv_path(sec_id);
        let tmp_path = path.with_extension("csv.tmp");

        let file = fs::File::create(&tmp_path)?;
        if let Err(e) = Self::write_table(file, candles) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        fs::rename(&tmp_path, &path)?;

        debug!(path = %path.display(), rows = candles.len(), "wrote cache file");
        Ok(())
    }

    fn contains(&self, sec_id: &str) -> bool {
        self.csv_path(sec_id).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const HEADER: &str = "TRADEDATE,BOARDID,SECID,NUMTRADES,VALUE,OPEN,LOW,HIGH,CLOSE,WAPRICE,VOLUME\n";

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = format!(
            "{HEADER}\
            2024-01-03,TQBR,SBER,81234,9876543210.5,271.9,270.1,275,274.5,273.2,36152110\n\
            2024-01-04,TQBR,SBER,70211,8123456789,274.7,273,276.4,275.3,275,29531900\n\
            2024-01-06,TQBR,SBER,0,0,,,,,,0\n"
        );

        fs::write(path.join("SBER.csv"), csv_content).unwrap();
        fs::write(path.join("GAZP.csv"), HEADER).unwrap();
        fs::write(path.join("notes.txt"), "not a cache file").unwrap();

        (dir, path)
    }

    #[test]
    fn load_returns_rows_in_file_order() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let candles = adapter.load("SBER").unwrap();

        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0].trade_date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(candles[0].board_id, "TQBR");
        assert_eq!(candles[0].open, Some(271.9));
        assert_eq!(candles[0].high, Some(275.0));
        assert_eq!(candles[0].volume, 36_152_110);
        assert_eq!(candles[1].trade_date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
    }

    #[test]
    fn load_maps_empty_prices_to_none() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let candles = adapter.load("sber").unwrap();

        assert_eq!(candles[2].close, None);
        assert_eq!(candles[2].wa_price, None);
        assert_eq!(candles[2].num_trades, 0);
    }

    #[test]
    fn load_header_only_is_empty_table() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        assert!(adapter.load("GAZP").unwrap().is_empty());
    }

    #[test]
    fn load_missing_file_is_cache_not_found() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter.load("LKOH").unwrap_err();
        assert!(matches!(err, MoexError::CacheNotFound { .. }));
    }

    #[test]
    fn load_wrong_columns_is_malformed() {
        let (_dir, path) = setup_test_data();
        fs::write(
            path.join("YNDX.csv"),
            "date,open,high,low,close,volume\n2024-01-15,100.0,110.0,90.0,105.0,50000\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(path);

        let err = adapter.load("YNDX").unwrap_err();
        assert!(matches!(err, MoexError::CacheMalformed { .. }));
    }

    #[test]
    fn load_bad_row_is_malformed() {
        let (_dir, path) = setup_test_data();
        fs::write(
            path.join("MGNT.csv"),
            format!("{HEADER}not-a-date,TQBR,MGNT,1,1,1,1,1,1,1,1\n"),
        )
        .unwrap();
        let adapter = CsvAdapter::new(path);

        let err = adapter.load("MGNT").unwrap_err();
        assert!(matches!(err, MoexError::CacheMalformed { ref reason, .. } if reason.starts_with("row 1")));
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path.clone());
        let original = adapter.load("SBER").unwrap();

        adapter.save("SBERP", &original).unwrap();
        let reloaded = adapter.load("SBERP").unwrap();

        assert_eq!(reloaded, original);
        assert!(!path.join("SBERP.csv.tmp").exists());
    }

    #[test]
    fn save_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("cache").join("daily");
        let adapter = CsvAdapter::new(nested.clone());

        adapter.save("SBER", &[]).unwrap();

        assert!(adapter.contains("SBER"));
        assert_eq!(fs::read_to_string(nested.join("SBER.csv")).unwrap(), HEADER);
    }

    #[test]
    fn list_cached_returns_sorted_ids() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        assert_eq!(adapter.list_cached().unwrap(), vec!["GAZP", "SBER"]);
    }

    #[test]
    fn list_cached_skips_names_load_cannot_open() {
        let (_dir, path) = setup_test_data();
        fs::write(path.join("lkoh.csv"), HEADER).unwrap();
        let adapter = CsvAdapter::new(path);

        let listed = adapter.list_cached().unwrap();

        assert_eq!(listed, vec!["GAZP", "SBER"]);
        for sec_id in &listed {
            assert!(adapter.load(sec_id).is_ok());
        }
    }

    #[test]
    fn list_cached_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvAdapter::new(dir.path().join("absent"));

        assert!(adapter.list_cached().unwrap().is_empty());
    }
}
