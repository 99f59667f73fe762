//! URL classification and validation.
//!
//! Only YouTube hosts are accepted. Classification looks at the parsed query and
//! path; collection IDs come from an ordered table of URL shapes where the first
//! matching shape decides.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use url::Url;

/// Hosts accepted as YouTube, compared case-insensitively against the URL authority.
pub const SUPPORTED_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "youtu.be",
    "music.youtube.com",
];

const SHORT_LINK_HOST: &str = "youtu.be";

/// Schemes yt-dlp accepts for `--proxy`.
pub const PROXY_SCHEMES: &[&str] = &["http", "https", "socks4", "socks5"];

/// What a URL points at.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UrlKind {
    /// Playlist, including a video opened inside a playlist
    Collection,
    /// One video
    SingleItem,
    /// Channel or user page
    Channel,
    Unknown,
}

impl UrlKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UrlKind::Collection => "playlist",
            UrlKind::SingleItem => "video",
            UrlKind::Channel => "channel",
            UrlKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for UrlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First failing check of [`validate`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("URL is empty")]
    Empty,
    #[error("Invalid URL format")]
    Malformed,
    #[error("URL is not a supported YouTube URL")]
    UnsupportedSite,
    #[error("Unknown YouTube URL type")]
    UnknownKind,
}

/// Known URL shapes, in priority order. Capture groups hold collection identifiers.
const URL_SHAPES: &[(&str, UrlKind)] = &[
    (
        r"(?:https?://)?(?:www\.)?youtube\.com/playlist\?(?:[^#\s]*&)?list=([A-Za-z0-9_-]+)",
        UrlKind::Collection,
    ),
    (
        r"(?:https?://)?(?:www\.)?youtube\.com/watch\?v=[A-Za-z0-9_-]+(?:&list=([A-Za-z0-9_-]+))?",
        UrlKind::SingleItem,
    ),
    (
        r"(?:https?://)?youtu\.be/[A-Za-z0-9_-]+(?:\?list=([A-Za-z0-9_-]+))?",
        UrlKind::SingleItem,
    ),
    (
        r"(?:https?://)?(?:www\.)?youtube\.com/channel/([A-Za-z0-9_-]+)",
        UrlKind::Channel,
    ),
    (
        r"(?:https?://)?(?:www\.)?youtube\.com/user/([A-Za-z0-9_-]+)",
        UrlKind::Channel,
    ),
    (
        r"(?:https?://)?(?:www\.)?youtube\.com/c/([A-Za-z0-9_-]+)",
        UrlKind::Channel,
    ),
    (
        r"(?:https?://)?music\.youtube\.com/playlist\?(?:[^#\s]*&)?list=([A-Za-z0-9_-]+)",
        UrlKind::Collection,
    ),
];

/// Collection IDs of this length or shorter are treated as noise.
const MIN_ID_LEN: usize = 11;

static SHAPES: OnceLock<Vec<(Regex, UrlKind)>> = OnceLock::new();

fn shapes() -> &'static [(Regex, UrlKind)] {
    SHAPES.get_or_init(|| {
        URL_SHAPES
            .iter()
            .map(|(pattern, kind)| (Regex::new(pattern).expect("compile URL shape"), *kind))
            .collect()
    })
}

/// Parse and require both a scheme and a non-empty authority.
fn parse(url: &str) -> Option<Url> {
    Url::parse(url.trim())
        .ok()
        .filter(|parsed| !parsed.authority().is_empty())
}

/// Parse and require a supported host.
fn parse_supported(url: &str) -> Option<Url> {
    parse(url).filter(|parsed| {
        let authority = parsed.authority();
        SUPPORTED_HOSTS
            .iter()
            .any(|host| host.eq_ignore_ascii_case(authority))
    })
}

/// Whether the string is a URI with a scheme and an authority.
pub fn is_well_formed(url: &str) -> bool {
    parse(url).is_some()
}

/// Whether the URL is well formed and its authority is a YouTube host.
pub fn is_supported_site(url: &str) -> bool {
    parse_supported(url).is_some()
}

/// Classify a URL; anything off the supported hosts is [`UrlKind::Unknown`].
pub fn classify(url: &str) -> UrlKind {
    let Some(parsed) = parse_supported(url) else {
        return UrlKind::Unknown;
    };

    let has_query = |key: &str| parsed.query_pairs().any(|(k, _)| k == key);
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    let is_short_link = parsed
        .host_str()
        .is_some_and(|host| host.eq_ignore_ascii_case(SHORT_LINK_HOST));

    if has_query("list") || segments.contains(&"playlist") {
        UrlKind::Collection
    } else if (segments.first() == Some(&"watch") && has_query("v"))
        || (is_short_link && !segments.is_empty())
    {
        UrlKind::SingleItem
    } else if matches!(segments.as_slice(), ["channel" | "user" | "c", _, ..])
        || segments.first().is_some_and(|s| s.starts_with('@') && s.len() > 1)
    {
        UrlKind::Channel
    } else {
        UrlKind::Unknown
    }
}

/// Kind and captured identifier of the first matching URL shape.
pub fn match_shape(url: &str) -> Option<(UrlKind, Option<String>)> {
    shapes().iter().find_map(|(re, kind)| {
        re.captures(url).map(|caps| {
            let id = caps
                .iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str())
                .find(|group| group.len() >= MIN_ID_LEN)
                .map(str::to_string);
            (*kind, id)
        })
    })
}

/// Playlist or channel identifier from the first matching URL shape.
///
/// Later shapes are not consulted once one matches, even if it captured nothing
/// long enough.
pub fn extract_collection_id(url: &str) -> Option<String> {
    match_shape(url).and_then(|(_, id)| id)
}

/// Whether the URL can be handed to yt-dlp as a proxy.
pub fn validate_proxy(url: &str) -> bool {
    parse(url).is_some_and(|parsed| {
        PROXY_SCHEMES
            .iter()
            .any(|scheme| scheme.eq_ignore_ascii_case(parsed.scheme()))
    })
}

/// Run every check in order and report the first failure.
pub fn validate(url: &str) -> Result<UrlKind, ValidationError> {
    if url.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    if !is_well_formed(url) {
        return Err(ValidationError::Malformed);
    }

    if !is_supported_site(url) {
        return Err(ValidationError::UnsupportedSite);
    }

    match classify(url) {
        UrlKind::Unknown => Err(ValidationError::UnknownKind),
        kind => Ok(kind),
    }
}
