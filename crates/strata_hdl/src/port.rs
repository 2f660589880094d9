//! Port directions on fragment and instance boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The direction of a port on a fragment or instance boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Data flows into the fragment.
    #[serde(rename = "i")]
    Input,
    /// Data flows out of the fragment.
    #[serde(rename = "o")]
    Output,
    /// Data flows both ways.
    #[serde(rename = "io")]
    InOut,
}

impl PortDirection {
    /// The short form used in port requests: `i`, `o`, or `io`.
    pub fn as_str(self) -> &'static str {
        match self {
            PortDirection::Input => "i",
            PortDirection::Output => "o",
            PortDirection::InOut => "io",
        }
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown port direction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid port direction '{0}', expected 'i', 'o', or 'io'")]
pub struct ParsePortDirectionError(pub String);

impl FromStr for PortDirection {
    type Err = ParsePortDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "i" => Ok(PortDirection::Input),
            "o" => Ok(PortDirection::Output),
            "io" => Ok(PortDirection::InOut),
            other => Err(ParsePortDirectionError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_short_forms() {
        assert_eq!("i".parse::<PortDirection>().unwrap(), PortDirection::Input);
        assert_eq!("o".parse::<PortDirection>().unwrap(), PortDirection::Output);
        assert_eq!("io".parse::<PortDirection>().unwrap(), PortDirection::InOut);
        let err = "x".parse::<PortDirection>().unwrap_err();
        assert_eq!(err.to_string(), "invalid port direction 'x', expected 'i', 'o', or 'io'");
    }

    #[test]
    fn display_matches_parse() {
        for dir in [PortDirection::Input, PortDirection::Output, PortDirection::InOut] {
            assert_eq!(dir.to_string().parse::<PortDirection>().unwrap(), dir);
        }
    }

    #[test]
    fn port_serde_uses_short_forms() {
        let json = serde_json::to_string(&PortDirection::InOut).unwrap();
        assert_eq!(json, "\"io\"");
        let restored: PortDirection = serde_json::from_str("\"o\"").unwrap();
        assert_eq!(restored, PortDirection::Output);
    }
}
