use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, info, warn};

use crate::config::TmdbSettings;
use crate::domain::{LinkIdentifier, Scheme};
use crate::error::CentaurusError;
use crate::metadata::{MetadataRecord, RawResponse, TmdbFindResponse, TmdbMovie, normalize};

pub trait MetadataClient {
    fn resolve(&self, identifier: &LinkIdentifier) -> Result<MetadataRecord, CentaurusError>;
}

/// Request shape for one identifier scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    FindByImdb(String),
    MovieById(String),
}

impl Lookup {
    pub fn for_identifier(identifier: &LinkIdentifier) -> Result<Self, CentaurusError> {
        match identifier.scheme() {
            Scheme::Imdb => Ok(Lookup::FindByImdb(identifier.external_id().to_string())),
            Scheme::Tmdb => Ok(Lookup::MovieById(identifier.external_id().to_string())),
            Scheme::None => Err(CentaurusError::UnsupportedLink(identifier.to_string())),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Lookup::FindByImdb(id) => format!("/3/find/{id}"),
            Lookup::MovieById(id) => format!("/3/movie/{id}"),
        }
    }

    /// Query parameters other than the credential.
    pub fn extra_query(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Lookup::FindByImdb(_) => &[("external_source", "imdb_id")],
            Lookup::MovieById(_) => &[],
        }
    }
}

#[derive(Clone)]
pub struct TmdbHttpClient {
    client: Client,
    settings: TmdbSettings,
}

impl TmdbHttpClient {
    pub fn new(settings: TmdbSettings) -> Result<Self, CentaurusError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("centaurus/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| CentaurusError::TmdbHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|err| CentaurusError::TmdbHttp(err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn url(&self, lookup: &Lookup) -> String {
        format!(
            "{}{}",
            self.settings.base_url.trim_end_matches('/'),
            lookup.path()
        )
    }
}

impl MetadataClient for TmdbHttpClient {
    fn resolve(&self, identifier: &LinkIdentifier) -> Result<MetadataRecord, CentaurusError> {
        let lookup = Lookup::for_identifier(identifier)?;
        let url = self.url(&lookup);
        info!(%identifier, %url, "requesting TMDB metadata");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.settings.api_key.expose())])
            .query(lookup.extra_query())
            .send()
            .map_err(|err| {
                let err = transport_error(err);
                warn!(%identifier, error = %err, "TMDB request failed");
                err
            })?;
        let status = response.status().as_u16();
        let body = response.text().map_err(transport_error)?;
        debug!(%identifier, status, bytes = body.len(), "TMDB responded");

        classify_response(&lookup, identifier, status, &body)
    }
}

/// Flattens a reqwest failure into one line. The URL is dropped so the
/// `api_key` query never reaches logs or the user.
fn transport_error(err: reqwest::Error) -> CentaurusError {
    let timed_out = err.is_timeout();
    let err = err.without_url();
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    if timed_out {
        message = format!("timed out: {message}");
    }
    CentaurusError::TmdbHttp(message)
}

/// Turns a raw HTTP outcome into a record or a typed failure.
pub fn classify_response(
    lookup: &Lookup,
    identifier: &LinkIdentifier,
    status: u16,
    body: &str,
) -> Result<MetadataRecord, CentaurusError> {
    if status == 404 {
        return Err(CentaurusError::NotFound(identifier.to_string()));
    }
    if !(200..300).contains(&status) {
        let message = status_message(body).unwrap_or_else(|| "TMDB request failed".to_string());
        return Err(CentaurusError::TmdbStatus { status, message });
    }
    if body.trim().is_empty() {
        return Err(CentaurusError::NotFound(identifier.to_string()));
    }

    let raw = match lookup {
        Lookup::FindByImdb(_) => serde_json::from_str::<TmdbFindResponse>(body).map(RawResponse::Find),
        Lookup::MovieById(_) => serde_json::from_str::<TmdbMovie>(body).map(RawResponse::Movie),
    }
    .map_err(|err| CentaurusError::MalformedResponse(err.to_string()))?;

    normalize(raw, identifier).ok_or_else(|| CentaurusError::NotFound(identifier.to_string()))
}

fn status_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("status_message")
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
}
