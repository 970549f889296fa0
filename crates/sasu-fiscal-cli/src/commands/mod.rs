pub mod compute;
pub mod optimize;
pub mod rates;

use sasu_fiscal_core::rates::{RateRegistry, RateTable};

use crate::input;

/// Where the rate table comes from: a custom file, else the built-in year.
pub struct TableSource {
    pub year: i32,
    pub rates: Option<String>,
}

impl TableSource {
    /// A custom table replaces the built-in one of its own fiscal year and is used as is.
    pub fn load(&self) -> Result<RateTable, Box<dyn std::error::Error>> {
        let mut registry = RateRegistry::builtin();
        let year = match self.rates {
            Some(ref path) => {
                let table: RateTable = input::file::read_document(path)?;
                tracing::debug!(path = %path, fiscal_year = table.fiscal_year, "custom rate table loaded");
                let year = table.fiscal_year;
                registry.register(table);
                year
            }
            None => self.year,
        };
        Ok(registry.get(year)?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sasu_fiscal_core::SasuError;

    #[test]
    fn test_builtin_year_loaded() {
        let source = TableSource {
            year: 2025,
            rates: None,
        };
        assert_eq!(source.load().unwrap().fiscal_year, 2025);
    }

    #[test]
    fn test_unknown_year_fails() {
        let source = TableSource {
            year: 2019,
            rates: None,
        };
        let err = source.load().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SasuError>(),
            Some(SasuError::UnknownFiscalYear(2019))
        ));
    }
}
