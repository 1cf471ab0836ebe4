//! Tradable symbol universe
//!
//! The universe is a fixed listing of instruments the simulator allows
//! trading in. It can be loaded from a JSON file (`[{symbol, name, price}]`)
//! or fall back to the built-in Saudi-market listing.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One listed instrument with its static reference price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    /// Last known reference price, used by the offline feed and the
    /// `/stocks` listing when no live quote has been fetched yet.
    pub price: Decimal,
}

/// The fixed set of tradable instruments
#[derive(Debug, Clone)]
pub struct Universe {
    instruments: Vec<Instrument>,
    // uppercase symbol -> index into instruments
    index: HashMap<String, usize>,
}

impl Universe {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        let index = instruments
            .iter()
            .enumerate()
            .map(|(i, inst)| (inst.symbol.to_uppercase(), i))
            .collect();
        Self { instruments, index }
    }

    /// Load a universe listing from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read universe file: {}", path.display()))?;
        let instruments: Vec<Instrument> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse universe file: {}", path.display()))?;
        Ok(Self::new(instruments))
    }

    /// Built-in listing of Tadawul tickers with reference prices
    pub fn builtin() -> Self {
        let listing = [
            ("2010.SR", "Saudi Basic Industries Corp", "68.40"),
            ("2222.SR", "Saudi Arabian Oil Co", "27.15"),
            ("1120.SR", "Al Rajhi Bank", "85.10"),
            ("7010.SR", "Saudi Telecom Co", "41.55"),
            ("1050.SR", "Banque Saudi Fransi", "31.90"),
            ("2020.SR", "SABIC Agri-Nutrients Co", "119.60"),
            ("8230.SR", "Al Rajhi Takaful", "142.20"),
            ("1211.SR", "Saudi Arabian Mining Co", "48.75"),
            ("2280.SR", "Almarai Co", "57.30"),
            ("4003.SR", "United Electronics Co", "92.80"),
            ("1810.SR", "Seera Group Holding", "24.66"),
            ("6010.SR", "National Agricultural Development Co", "25.05"),
            ("1180.SR", "Saudi National Bank", "34.20"),
            ("4300.SR", "Dar Al Arkan Real Estate", "19.88"),
            ("3002.SR", "Najran Cement Co", "8.91"),
            ("8231.SR", "Walaa Cooperative Insurance", "17.34"),
            ("8010.SR", "The Company for Cooperative Insurance", "130.00"),
        ];
        let instruments = listing
            .iter()
            .map(|(symbol, name, price)| Instrument {
                symbol: symbol.to_string(),
                name: name.to_string(),
                price: price.parse().expect("builtin listing price"),
            })
            .collect();
        Self::new(instruments)
    }

    /// Look up an instrument by ticker, case-insensitively
    pub fn lookup(&self, symbol: &str) -> Option<&Instrument> {
        self.index
            .get(&symbol.to_uppercase())
            .map(|&i| &self.instruments[i])
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.index.contains_key(&symbol.to_uppercase())
    }

    /// All instruments in listing order
    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_universe_has_tadawul_tickers() {
        let universe = Universe::builtin();
        assert_eq!(universe.len(), 17);
        assert!(universe.contains("2222.SR"));
        assert!(universe.contains("1120.SR"));
        assert!(!universe.contains("AAPL"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let universe = Universe::builtin();
        let inst = universe.lookup("2222.sr").expect("aramco listed");
        assert_eq!(inst.symbol, "2222.SR");
        assert!(inst.price > Decimal::ZERO);
    }

    #[test]
    fn test_from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("universe.json");
        let listing = serde_json::json!([
            {"symbol": "AAA.SR", "name": "Test Co A", "price": 50.0},
            {"symbol": "BBB.SR", "name": "Test Co B", "price": 12.5}
        ]);
        std::fs::write(&path, serde_json::to_string_pretty(&listing).unwrap()).unwrap();

        let universe = Universe::from_file(&path).unwrap();
        assert_eq!(universe.len(), 2);
        assert_eq!(universe.lookup("aaa.sr").unwrap().name, "Test Co A");
    }

    #[test]
    fn test_from_file_missing_is_error() {
        assert!(Universe::from_file("/nonexistent/universe.json").is_err());
    }
}
