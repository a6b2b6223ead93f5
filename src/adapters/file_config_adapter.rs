//! INI file configuration adapter.

use std::path::Path;

use configparser::ini::Ini;

use crate::domain::error::TradesimError;
use crate::ports::config_port::ConfigPort;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TradesimError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| TradesimError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, TradesimError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| TradesimError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[data]
dir = ./data

[backtest]
symbols = AAPL,MSFT
initial_capital = 25000.0

[strategy]
id = sma_crossover
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.get_string("data", "dir"), Some("./data".to_string()));
        assert_eq!(
            adapter.get_string("backtest", "symbols"),
            Some("AAPL,MSFT".to_string())
        );
        assert_eq!(
            adapter.get_string("strategy", "id"),
            Some("sma_crossover".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\ninitial_capital = 100\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_string_treats_blank_as_missing() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nsymbol =   \n").unwrap();
        assert_eq!(adapter.get_string("backtest", "symbol"), None);
    }

    #[test]
    fn get_int_returns_value() {
        let adapter = FileConfigAdapter::from_string("[worker]\npool_size = 8\n").unwrap();
        assert_eq!(adapter.get_int("worker", "pool_size", 4), 8);
    }

    #[test]
    fn get_int_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[worker]\n").unwrap();
        assert_eq!(adapter.get_int("worker", "pool_size", 4), 4);
    }

    #[test]
    fn get_int_returns_default_for_garbage() {
        let adapter = FileConfigAdapter::from_string("[worker]\npool_size = many\n").unwrap();
        assert_eq!(adapter.get_int("worker", "pool_size", 4), 4);
    }

    #[test]
    fn get_double_returns_value() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_capital = 12500.5\n").unwrap();
        assert!((adapter.get_double("backtest", "initial_capital", 0.0) - 12_500.5).abs() < 1e-9);
    }

    #[test]
    fn get_double_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[backtest]\n").unwrap();
        assert!((adapter.get_double("backtest", "initial_capital", 10_000.0) - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn get_usize_rejects_negative() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nshort_period = -3\n").unwrap();
        assert_eq!(adapter.get_usize("strategy", "short_period", 10), 10);
        assert_eq!(adapter.get_usize("strategy", "long_period", 30), 30);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[strategy]\nid = buy_hold\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("strategy", "id"), Some("buy_hold".to_string()));
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/tradesim.ini").err().unwrap();
        assert!(matches!(err, TradesimError::ConfigParse { file, .. } if file.contains("tradesim.ini")));
    }
}
