use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

pub const SHARE_QUERY_KEY: &str = "combo";
const SHARE_VERSION: u32 = 1;
const CHECKSUM_HEX_LEN: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShareError {
    #[error("share link has no {SHARE_QUERY_KEY} parameter")]
    Missing,
    #[error("share code is malformed")]
    Malformed,
    #[error("share code checksum mismatch")]
    ChecksumMismatch,
    #[error("unsupported share code version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("failed to encode share payload: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePayload {
    #[serde(rename = "v")]
    pub version: u32,
    #[serde(rename = "c")]
    pub character: String,
    #[serde(rename = "p")]
    pub part_ids: Vec<String>,
}

impl SharePayload {
    #[must_use]
    pub fn new(character: impl Into<String>, part_ids: Vec<String>) -> Self {
        Self {
            version: SHARE_VERSION,
            character: character.into(),
            part_ids,
        }
    }
}

/// `<base64url(json)>.<checksum>`; the checksum catches links that were cut
/// short when copied.
pub fn encode_share_code(payload: &SharePayload) -> Result<String, ShareError> {
    let json =
        serde_json::to_vec(payload).map_err(|error| ShareError::Encode(error.to_string()))?;
    Ok(format!("{}.{}", URL_SAFE_NO_PAD.encode(&json), checksum(&json)))
}

pub fn decode_share_code(code: &str) -> Result<SharePayload, ShareError> {
    let (body, expected) = code.trim().rsplit_once('.').ok_or(ShareError::Malformed)?;
    let json = URL_SAFE_NO_PAD
        .decode(body.as_bytes())
        .map_err(|_| ShareError::Malformed)?;
    if checksum(&json) != expected {
        return Err(ShareError::ChecksumMismatch);
    }
    let payload: SharePayload = serde_json::from_slice(&json).map_err(|_| ShareError::Malformed)?;
    if payload.version != SHARE_VERSION {
        return Err(ShareError::UnsupportedVersion(payload.version));
    }
    Ok(payload)
}

pub fn share_url(base: &str, payload: &SharePayload) -> Result<Url, ShareError> {
    let mut url = Url::parse(base).map_err(|error| ShareError::InvalidUrl(error.to_string()))?;
    let code = encode_share_code(payload)?;
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != SHARE_QUERY_KEY)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair(SHARE_QUERY_KEY, &code);
    Ok(url)
}

pub fn parse_share_url(raw: &str) -> Result<SharePayload, ShareError> {
    let url = Url::parse(raw).map_err(|error| ShareError::InvalidUrl(error.to_string()))?;
    let code = url
        .query_pairs()
        .find(|(key, _)| key == SHARE_QUERY_KEY)
        .map(|(_, value)| value.into_owned())
        .ok_or(ShareError::Missing)?;
    decode_share_code(&code)
}

fn checksum(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = format!("{digest:x}");
    hex.truncate(CHECKSUM_HEX_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_code_is_rejected() {
        let code = encode_share_code(&SharePayload::new(
            "ryu",
            vec!["ryu-001".to_string(), "ryu-004".to_string()],
        ))
        .expect("payload should encode");
        let (body, sum) = code.rsplit_once('.').expect("code has a checksum");
        let cut = format!("{}.{sum}", &body[..body.len() - 3]);
        assert!(decode_share_code(&cut).is_err());
    }

    #[test]
    fn code_without_separator_is_malformed() {
        assert_eq!(decode_share_code("abc"), Err(ShareError::Malformed));
    }
}
