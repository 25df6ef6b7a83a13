//! Output formats
//!
//! The closed set of file formats an export can produce, with the extension
//! and content type each one carries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Content type of multi-chunk archive responses
pub const CONTENT_TYPE_ZIP: &str = "application/zip";

/// Extension of multi-chunk archive responses
pub const EXTENSION_ZIP: &str = ".zip";

/// Rendered spreadsheet format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Excel 97-2003 workbook
    Xls,
    /// Excel 2007+ workbook
    Xlsx,
    /// Delimited text, the format the bundled text engine produces
    #[default]
    Csv,
}

impl OutputFormat {
    /// File extension including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xls => ".xls",
            OutputFormat::Xlsx => ".xlsx",
            OutputFormat::Csv => ".csv",
        }
    }

    /// MIME type for single-file responses
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Xls => "application/vnd.ms-excel",
            OutputFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            OutputFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Xls => "xls",
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        };
        write!(f, "{name}")
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    /// Accepts the format name or its extension, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "xls" => Ok(OutputFormat::Xls),
            "xlsx" => Ok(OutputFormat::Xlsx),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!(
                "Invalid output format '{s}'. Must be one of: xls, xlsx, csv"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions() {
        assert_eq!(OutputFormat::Xls.extension(), ".xls");
        assert_eq!(OutputFormat::Xlsx.extension(), ".xlsx");
        assert_eq!(OutputFormat::Csv.extension(), ".csv");
    }

    #[test]
    fn test_parse_accepts_extension_and_case() {
        assert_eq!(".XLSX".parse::<OutputFormat>().unwrap(), OutputFormat::Xlsx);
        assert_eq!("xls".parse::<OutputFormat>().unwrap(), OutputFormat::Xls);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_default_is_csv() {
        assert_eq!(OutputFormat::default(), OutputFormat::Csv);
        assert_eq!(OutputFormat::default().content_type(), "text/csv; charset=utf-8");
    }
}
