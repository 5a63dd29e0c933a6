//! Magnet URI parsing and info-hash validation

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use url::form_urlencoded;

static BTIH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-fA-F0-9]{40}|[a-zA-Z2-7]{32})$").expect("static regex is valid")
});

const MAGNET_PREFIX: &str = "magnet:?";
const BTIH_PREFIX: &str = "urn:btih:";

/// Reasons a magnet URI is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MagnetError {
    #[error("not a magnet URI")]
    NotMagnet,

    #[error("no xt=urn:btih parameter")]
    MissingInfoHash,

    #[error("invalid BTIH: {0}")]
    InvalidInfoHash(String),
}

/// A validated magnet link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnetLink {
    /// The URI exactly as it was found
    pub uri: String,
    /// 40 hex or 32 base32 characters
    pub info_hash: String,
    /// Decoded `dn` parameter, if present
    pub display_name: Option<String>,
}

impl MagnetLink {
    /// Parses and validates a magnet URI
    ///
    /// # Example
    ///
    /// ```
    /// use tb_harvest::MagnetLink;
    ///
    /// let link = MagnetLink::parse(
    ///     "magnet:?xt=urn:btih:0123456789abcdef0123456789abcdef01234567&dn=Show+S01E01",
    /// ).unwrap();
    /// assert_eq!(link.title(), "Show S01E01");
    /// ```
    pub fn parse(uri: &str) -> Result<Self, MagnetError> {
        let query = uri.strip_prefix(MAGNET_PREFIX).ok_or(MagnetError::NotMagnet)?;

        let mut info_hash = None;
        let mut display_name = None;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "xt" if info_hash.is_none() => {
                    if let Some(hash) = value.strip_prefix(BTIH_PREFIX) {
                        info_hash = Some(hash.to_string());
                    }
                }
                "dn" if display_name.is_none() => {
                    display_name = Some(value.into_owned());
                }
                _ => {}
            }
        }

        let info_hash = info_hash.ok_or(MagnetError::MissingInfoHash)?;
        if !is_valid_btih(&info_hash) {
            return Err(MagnetError::InvalidInfoHash(info_hash));
        }

        Ok(Self {
            uri: uri.to_string(),
            info_hash,
            display_name,
        })
    }

    /// The release title carried in `dn`, or an empty string
    pub fn title(&self) -> &str {
        self.display_name.as_deref().unwrap_or("")
    }

    /// Appends one `tr` parameter per tracker
    pub fn with_trackers(&self, trackers: &[String]) -> String {
        append_trackers(&self.uri, trackers)
    }
}

/// Checks a BitTorrent info-hash: 40 hex characters or 32 base32 characters
pub fn is_valid_btih(hash: &str) -> bool {
    BTIH.is_match(hash)
}

/// Appends `&tr=<tracker>` for every tracker to a magnet URI
pub fn append_trackers(magnet: &str, trackers: &[String]) -> String {
    let mut result = magnet.to_string();
    for tracker in trackers {
        result.push_str("&tr=");
        result.push_str(tracker);
    }
    result
}
