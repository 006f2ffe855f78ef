//! Request and response types for the CloudDNS zone API

use serde::{Deserialize, Serialize};

/// A DNS record owned by the provider.
#[derive(Clone, Debug, Deserialize)]
pub struct Record {
    /// Provider-assigned identifier, the only valid deletion key
    pub identifier: String,
    /// Host part of the record name, without the zone suffix
    pub name: String,
    /// Record type, e.g. `TXT`
    #[serde(rename = "type")]
    pub type_: String,
    /// Record data
    pub rdata: String,
    /// Time-to-live in seconds
    #[serde(default)]
    pub ttl: Option<u32>,
}

impl Record {
    /// RData with the provider's stray quoting removed.
    ///
    /// The CloudDNS API wraps TXT record data in a pair of literal quote
    /// characters on read. Exactly one leading and one trailing quote is
    /// stripped before any value comparison; data without wrapping quotes is
    /// returned unchanged.
    pub fn rdata_unquoted(&self) -> &str {
        let rdata = self.rdata.as_str();
        if rdata.len() >= 2 && rdata.starts_with('"') && rdata.ends_with('"') {
            &rdata[1..rdata.len() - 1]
        } else {
            rdata
        }
    }
}

/// Request payload for creating a record in a zone.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RecordRequest {
    /// Host part of the record name, without the zone suffix
    pub name: String,
    /// Record type, e.g. `TXT`
    #[serde(rename = "type")]
    pub type_: String,
    /// Record data
    pub rdata: String,
    /// Time-to-live in seconds
    pub ttl: u32,
}

#[cfg(test)]
mod tests {
    use super::Record;

    fn record(rdata: &str) -> Record {
        Record {
            identifier: "r1".into(),
            name: "_acme-challenge".into(),
            type_: "TXT".into(),
            rdata: rdata.into(),
            ttl: Some(120),
        }
    }

    #[test]
    fn unquotes_wrapped_rdata() {
        assert_eq!(record("\"abc123\"").rdata_unquoted(), "abc123");
    }

    #[test]
    fn strips_exactly_one_pair() {
        assert_eq!(record("\"\"abc123\"\"").rdata_unquoted(), "\"abc123\"");
    }

    #[test]
    fn leaves_unquoted_rdata_unchanged() {
        assert_eq!(record("abc123").rdata_unquoted(), "abc123");
    }

    #[test]
    fn leaves_partially_quoted_rdata_unchanged() {
        assert_eq!(record("\"abc123").rdata_unquoted(), "\"abc123");
        assert_eq!(record("abc123\"").rdata_unquoted(), "abc123\"");
    }

    #[test]
    fn handles_degenerate_rdata() {
        assert_eq!(record("").rdata_unquoted(), "");
        assert_eq!(record("\"").rdata_unquoted(), "\"");
        assert_eq!(record("\"\"").rdata_unquoted(), "");
    }
}
