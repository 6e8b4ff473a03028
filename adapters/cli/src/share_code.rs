//! Single-line level codes for copy-paste transfer.
//!
//! A code reads `crawl:v1:<width>x<height>:<payload>` where the payload is the
//! level's JSON encoded as unpadded base64.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use dungeon_crawler_core::LevelData;
use dungeon_crawler_world::level::{self, LevelError};
use thiserror::Error;

const CODE_DOMAIN: &str = "crawl";
const CODE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded level payload.
pub(crate) const CODE_HEADER: &str = "crawl:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while producing or reading share codes.
#[derive(Debug, Error)]
pub(crate) enum ShareCodeError {
    /// The provided string was empty or contained only whitespace.
    #[error("share code was empty")]
    EmptyPayload,
    /// The code ended before every segment was present.
    #[error("share code is missing the {0}")]
    MissingSegment(&'static str),
    /// The code used an unexpected prefix segment.
    #[error("share code prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The code used an unsupported version identifier.
    #[error("share code version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The dimensions segment disagrees with the embedded level.
    #[error("share code claims {claimed} but the level is {actual}")]
    DimensionMismatch {
        /// Dimensions written in the code header.
        claimed: String,
        /// Dimensions of the decoded level.
        actual: String,
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode share code payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The payload could not be converted to or from JSON.
    #[error("could not process level JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    /// The decoded level breaks a structural rule.
    #[error("shared level is invalid: {0}")]
    InvalidLevel(#[from] LevelError),
}

/// Encodes `level` into a single-line share code.
pub(crate) fn encode(level: &LevelData) -> Result<String, ShareCodeError> {
    level::validate(level)?;
    let json = serde_json::to_vec(level)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{CODE_HEADER}:{}x{}:{encoded}",
        level.width, level.height
    ))
}

/// Decodes and validates a level from a share code.
pub(crate) fn decode(value: &str) -> Result<LevelData, ShareCodeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ShareCodeError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(4, FIELD_DELIMITER);
    let domain = parts.next().ok_or(ShareCodeError::MissingSegment("prefix"))?;
    let version = parts
        .next()
        .ok_or(ShareCodeError::MissingSegment("version"))?;
    let dimensions = parts
        .next()
        .ok_or(ShareCodeError::MissingSegment("grid dimensions"))?;
    let payload = parts
        .next()
        .ok_or(ShareCodeError::MissingSegment("payload"))?;

    if domain != CODE_DOMAIN {
        return Err(ShareCodeError::InvalidPrefix(domain.to_owned()));
    }
    if version != CODE_VERSION {
        return Err(ShareCodeError::UnsupportedVersion(version.to_owned()));
    }

    let (width, height) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    let decoded: LevelData = serde_json::from_slice(&bytes)?;

    if decoded.width != width || decoded.height != height {
        return Err(ShareCodeError::DimensionMismatch {
            claimed: format!("{width}x{height}"),
            actual: format!("{}x{}", decoded.width, decoded.height),
        });
    }
    level::validate(&decoded)?;

    Ok(decoded)
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), ShareCodeError> {
    let invalid = || ShareCodeError::InvalidDimensions(dimensions.to_owned());
    let (width, height) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;

    if width == 0 || height == 0 {
        return Err(invalid());
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_crawler_core::{Facing, Tile};

    #[test]
    fn code_carries_header_and_dimensions() {
        let mut level = level::create_empty_map(9, 7, Facing::East);
        level.name = Some("corridor".to_owned());

        let code = encode(&level).expect("valid level encodes");
        assert!(code.starts_with(&format!("{CODE_HEADER}:9x7:")));

        let decoded = decode(&code).expect("code decodes");
        assert_eq!(decoded, level);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let level = level::create_empty_map(5, 5, Facing::North);
        let code = encode(&level).expect("valid level encodes");

        assert!(decode(&format!("  {code}\n")).is_ok());
    }

    #[test]
    fn malformed_codes_are_rejected() {
        assert!(matches!(decode("   "), Err(ShareCodeError::EmptyPayload)));
        assert!(matches!(
            decode("crawl:v1"),
            Err(ShareCodeError::MissingSegment("grid dimensions"))
        ));
        assert!(matches!(
            decode("maze:v1:5x5:AAAA"),
            Err(ShareCodeError::InvalidPrefix(_))
        ));
        assert!(matches!(
            decode("crawl:v2:5x5:AAAA"),
            Err(ShareCodeError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            decode("crawl:v1:5by5:AAAA"),
            Err(ShareCodeError::InvalidDimensions(_))
        ));
        assert!(matches!(
            decode("crawl:v1:0x5:AAAA"),
            Err(ShareCodeError::InvalidDimensions(_))
        ));
        assert!(matches!(
            decode("crawl:v1:5x5:***"),
            Err(ShareCodeError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn header_must_match_the_level() {
        let level = level::create_empty_map(6, 5, Facing::South);
        let code = encode(&level).expect("valid level encodes");
        let tampered = code.replacen(":6x5:", ":5x6:", 1);

        assert!(matches!(
            decode(&tampered),
            Err(ShareCodeError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn invalid_levels_are_neither_encoded_nor_decoded() {
        let mut level = level::create_empty_map(6, 6, Facing::West);
        level.map[3][3] = Tile::Start;
        assert!(matches!(encode(&level), Err(ShareCodeError::InvalidLevel(_))));

        let json = serde_json::to_vec(&level).expect("serialise level");
        let code = format!("{CODE_HEADER}:6x6:{}", STANDARD_NO_PAD.encode(json));
        assert!(matches!(
            decode(&code),
            Err(ShareCodeError::InvalidLevel(LevelError::StartCount(2)))
        ));
    }
}
