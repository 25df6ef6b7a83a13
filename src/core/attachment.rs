//! Attachment naming
//!
//! Builds the `Content-Disposition` header value for an export. Clients
//! disagree on how a non-ASCII filename should be encoded, so the caller
//! picks a [`ClientCompatibility`] mode.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the attachment filename is encoded for the client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientCompatibility {
    /// ASCII `filename` fallback plus an RFC 5987 `filename*` parameter
    #[default]
    Modern,
    /// Percent-encoded UTF-8 in the plain `filename` parameter
    #[serde(rename = "legacy-percent")]
    LegacyPercentEncoded,
    /// UTF-8 bytes passed through one byte per character
    #[serde(rename = "legacy-raw")]
    LegacyRawBytes,
}

impl ClientCompatibility {
    /// Configuration name of this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientCompatibility::Modern => "modern",
            ClientCompatibility::LegacyPercentEncoded => "legacy-percent",
            ClientCompatibility::LegacyRawBytes => "legacy-raw",
        }
    }
}

impl fmt::Display for ClientCompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientCompatibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "modern" => Ok(ClientCompatibility::Modern),
            "legacy-percent" => Ok(ClientCompatibility::LegacyPercentEncoded),
            "legacy-raw" => Ok(ClientCompatibility::LegacyRawBytes),
            other => Err(format!(
                "Invalid client compatibility '{other}'. Must be one of: modern, legacy-percent, legacy-raw"
            )),
        }
    }
}

/// Produces `Content-Disposition` values
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachmentNamer {
    compatibility: ClientCompatibility,
}

impl AttachmentNamer {
    pub fn new(compatibility: ClientCompatibility) -> Self {
        Self { compatibility }
    }

    pub fn compatibility(&self) -> ClientCompatibility {
        self.compatibility
    }

    /// Header value offering `filename` as an attachment
    ///
    /// ```
    /// use bundle_export::core::attachment::{AttachmentNamer, ClientCompatibility};
    ///
    /// let namer = AttachmentNamer::new(ClientCompatibility::Modern);
    /// assert_eq!(
    ///     namer.name("Bericht ü.xlsx"),
    ///     "attachment; filename=\"Bericht _.xlsx\"; filename*=UTF-8''Bericht%20%C3%BC.xlsx"
    /// );
    /// ```
    pub fn name(&self, filename: &str) -> String {
        match self.compatibility {
            ClientCompatibility::Modern => format!(
                "attachment; filename=\"{}\"; filename*=UTF-8''{}",
                ascii_fallback(filename),
                urlencoding::encode(filename)
            ),
            ClientCompatibility::LegacyPercentEncoded => format!(
                "attachment; filename=\"{}\"",
                urlencoding::encode(filename)
            ),
            ClientCompatibility::LegacyRawBytes => format!(
                "attachment; filename=\"{}\"",
                quote_escape(&latin1_reinterpret(filename))
            ),
        }
    }
}

/// Replaces everything that cannot sit in a quoted ASCII parameter
fn ascii_fallback(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect()
}

/// Maps each UTF-8 byte to the ISO-8859-1 character with the same code
fn latin1_reinterpret(filename: &str) -> String {
    filename.bytes().map(char::from).collect()
}

fn quote_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("modern", ClientCompatibility::Modern)]
    #[test_case("legacy-percent", ClientCompatibility::LegacyPercentEncoded)]
    #[test_case("LEGACY-RAW", ClientCompatibility::LegacyRawBytes)]
    fn test_parse_compatibility(input: &str, expected: ClientCompatibility) {
        assert_eq!(input.parse::<ClientCompatibility>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_compatibility() {
        let err = "ie".parse::<ClientCompatibility>().unwrap_err();
        assert!(err.contains("legacy-percent"));
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for mode in [
            ClientCompatibility::Modern,
            ClientCompatibility::LegacyPercentEncoded,
            ClientCompatibility::LegacyRawBytes,
        ] {
            assert_eq!(mode.to_string().parse::<ClientCompatibility>().unwrap(), mode);
        }
    }

    #[test]
    fn test_modern_ascii_name() {
        let namer = AttachmentNamer::default();
        assert_eq!(
            namer.name("report.zip"),
            "attachment; filename=\"report.zip\"; filename*=UTF-8''report.zip"
        );
    }

    #[test]
    fn test_modern_escapes_quotes_in_fallback() {
        let namer = AttachmentNamer::new(ClientCompatibility::Modern);
        let value = namer.name("a\"b.csv");
        assert!(value.starts_with("attachment; filename=\"a_b.csv\";"));
        assert!(value.ends_with("filename*=UTF-8''a%22b.csv"));
    }

    #[test]
    fn test_legacy_percent() {
        let namer = AttachmentNamer::new(ClientCompatibility::LegacyPercentEncoded);
        assert_eq!(
            namer.name("übersicht.xls"),
            "attachment; filename=\"%C3%BCbersicht.xls\""
        );
    }

    #[test]
    fn test_legacy_raw_bytes() {
        let namer = AttachmentNamer::new(ClientCompatibility::LegacyRawBytes);
        assert_eq!(
            namer.name("ü.xls"),
            "attachment; filename=\"\u{00c3}\u{00bc}.xls\""
        );
    }

    #[test]
    fn test_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: ClientCompatibility,
        }
        let parsed: Wrapper = toml::from_str("mode = \"legacy-raw\"").unwrap();
        assert_eq!(parsed.mode, ClientCompatibility::LegacyRawBytes);
    }
}
