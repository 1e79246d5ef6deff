//! Canonical title metadata and the normalization from TMDB response shapes.

use serde::{Deserialize, Serialize};

use crate::domain::{LinkIdentifier, Scheme};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_YEAR: &str = "Unknown Year";
pub const UNKNOWN_RATING: &str = "N/A";

/// Scheme-independent view of a title. Sentinels are already applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataRecord {
    pub title: String,
    pub year: String,
    pub overview: String,
    pub imdb_id: Option<String>,
    pub tmdb_id: String,
    pub genres: Vec<String>,
    pub rating: String,
}

impl MetadataRecord {
    pub fn imdb_link(&self) -> Option<String> {
        self.imdb_id
            .as_deref()
            .map(|id| format!("https://www.imdb.com/title/{id}"))
    }

    pub fn tmdb_link(&self) -> String {
        format!("https://www.themoviedb.org/movie/{}", self.tmdb_id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Genre {
    #[serde(default)]
    pub name: Option<String>,
}

/// Movie object as returned by `/3/movie/{id}` and inside `/3/find` results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbMovie {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<Genre>>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbFindResponse {
    #[serde(default)]
    pub movie_results: Vec<TmdbMovie>,
}

/// The two shapes a lookup can produce.
#[derive(Debug, Clone)]
pub enum RawResponse {
    Find(TmdbFindResponse),
    Movie(TmdbMovie),
}

/// Flattens either response shape into a record. `None` when the response
/// carries no usable movie.
pub fn normalize(raw: RawResponse, identifier: &LinkIdentifier) -> Option<MetadataRecord> {
    let movie = match raw {
        RawResponse::Find(find) => find.movie_results.into_iter().next()?,
        RawResponse::Movie(movie) => movie,
    };
    let tmdb_id = movie.id?;

    let imdb_id = non_blank(movie.imdb_id).or_else(|| {
        (identifier.scheme() == Scheme::Imdb).then(|| identifier.external_id().to_string())
    });

    let title = non_blank(movie.title).unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let year = non_blank(movie.release_date)
        .and_then(|date| date.split('-').next().map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_YEAR.to_string());
    let genres = movie
        .genres
        .unwrap_or_default()
        .into_iter()
        .filter_map(|genre| genre.name)
        .collect();
    let rating = movie
        .vote_average
        .map(format_rating)
        .unwrap_or_else(|| UNKNOWN_RATING.to_string());

    Some(MetadataRecord {
        title,
        year,
        overview: movie.overview.unwrap_or_default(),
        imdb_id,
        tmdb_id: tmdb_id.to_string(),
        genres,
        rating,
    })
}

/// Whole numbers keep one decimal place (`7.0`), others print as-is (`8.8`).
pub fn format_rating(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inception() -> TmdbMovie {
        TmdbMovie {
            id: Some(27205),
            title: Some("Inception".to_string()),
            release_date: Some("2010-07-16".to_string()),
            overview: Some("A thief who steals corporate secrets.".to_string()),
            imdb_id: Some("tt1375666".to_string()),
            genres: Some(vec![
                Genre {
                    name: Some("Action".to_string()),
                },
                Genre {
                    name: Some("Sci-Fi".to_string()),
                },
            ]),
            vote_average: Some(8.8),
        }
    }

    #[test]
    fn normalize_movie_details() {
        let record = normalize(
            RawResponse::Movie(inception()),
            &LinkIdentifier::tmdb("27205"),
        )
        .unwrap();
        assert_eq!(record.title, "Inception");
        assert_eq!(record.year, "2010");
        assert_eq!(record.genres, vec!["Action", "Sci-Fi"]);
        assert_eq!(record.rating, "8.8");
        assert_eq!(record.tmdb_id, "27205");
        assert_eq!(
            record.imdb_link().as_deref(),
            Some("https://www.imdb.com/title/tt1375666")
        );
    }

    #[test]
    fn absent_fields_get_sentinels() {
        let movie = TmdbMovie {
            id: Some(1),
            ..TmdbMovie::default()
        };
        let record = normalize(RawResponse::Movie(movie), &LinkIdentifier::tmdb("1")).unwrap();
        assert_eq!(record.title, UNKNOWN_TITLE);
        assert_eq!(record.year, UNKNOWN_YEAR);
        assert_eq!(record.rating, UNKNOWN_RATING);
        assert_eq!(record.overview, "");
        assert!(record.genres.is_empty());
        assert_eq!(record.imdb_id, None);
    }

    #[test]
    fn find_takes_first_result_and_keeps_queried_imdb_id() {
        let mut first = inception();
        first.imdb_id = None;
        let second = TmdbMovie {
            id: Some(2),
            ..TmdbMovie::default()
        };
        let raw = RawResponse::Find(TmdbFindResponse {
            movie_results: vec![first, second],
        });
        let record = normalize(raw, &LinkIdentifier::imdb("tt1375666")).unwrap();
        assert_eq!(record.tmdb_id, "27205");
        assert_eq!(record.imdb_id.as_deref(), Some("tt1375666"));
    }

    #[test]
    fn empty_find_is_not_a_record() {
        let raw = RawResponse::Find(TmdbFindResponse::default());
        assert!(normalize(raw, &LinkIdentifier::imdb("tt0000001")).is_none());
    }

    #[test]
    fn whole_ratings_keep_a_decimal() {
        assert_eq!(format_rating(7.0), "7.0");
        assert_eq!(format_rating(0.0), "0.0");
        assert_eq!(format_rating(6.35), "6.35");
    }
}
