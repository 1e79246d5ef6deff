use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CentaurusError;

static IMDB_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"imdb\.com/title/(tt\d+)").unwrap());
static TMDB_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"themoviedb\.org/movie/(\d+)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Imdb,
    Tmdb,
    None,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Imdb => write!(f, "imdb"),
            Scheme::Tmdb => write!(f, "tmdb"),
            Scheme::None => write!(f, "none"),
        }
    }
}

/// A classified link. `scheme` is `None` exactly when `external_id` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LinkIdentifier {
    scheme: Scheme,
    external_id: String,
}

impl LinkIdentifier {
    pub fn imdb(id: impl Into<String>) -> Self {
        Self::classified(Scheme::Imdb, id.into())
    }

    pub fn tmdb(id: impl Into<String>) -> Self {
        Self::classified(Scheme::Tmdb, id.into())
    }

    pub fn none() -> Self {
        Self {
            scheme: Scheme::None,
            external_id: String::new(),
        }
    }

    fn classified(scheme: Scheme, external_id: String) -> Self {
        if external_id.is_empty() {
            return Self::none();
        }
        Self {
            scheme,
            external_id,
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn is_none(&self) -> bool {
        self.scheme == Scheme::None
    }
}

impl fmt::Display for LinkIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.external_id)
    }
}

impl FromStr for LinkIdentifier {
    type Err = CentaurusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let identifier = extract_identifier(value);
        if identifier.is_none() {
            return Err(CentaurusError::UnsupportedLink(value.trim().to_string()));
        }
        Ok(identifier)
    }
}

/// Classifies a free-form link. IMDB wins when both patterns appear.
pub fn extract_identifier(link: &str) -> LinkIdentifier {
    if let Some(captures) = IMDB_LINK.captures(link) {
        let identifier = LinkIdentifier::imdb(&captures[1]);
        debug!(link, %identifier, "classified link");
        return identifier;
    }
    if let Some(captures) = TMDB_LINK.captures(link) {
        let identifier = LinkIdentifier::tmdb(&captures[1]);
        debug!(link, %identifier, "classified link");
        return identifier;
    }
    debug!(link, "link matches no supported scheme");
    LinkIdentifier::none()
}

/// Library folder name derived from the user-supplied display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FolderName(String);

impl FolderName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FolderName {
    type Err = CentaurusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value
            .trim()
            .chars()
            .map(|ch| if ch.is_whitespace() { '_' } else { ch })
            .collect::<String>();
        let is_valid = !normalized.is_empty()
            && normalized != "."
            && normalized != ".."
            && !normalized.contains(['/', '\\']);
        if !is_valid {
            return Err(CentaurusError::InvalidName(value.to_string()));
        }
        Ok(Self(normalized))
    }
}
