use assert_matches::assert_matches;

use centaurus::domain::{FolderName, LinkIdentifier, Scheme, extract_identifier};
use centaurus::error::{CentaurusError, ErrorKind};

#[test]
fn imdb_links_yield_tt_ids() {
    let links = [
        "https://www.imdb.com/title/tt1375666",
        "https://www.imdb.com/title/tt1375666/",
        "http://m.imdb.com/title/tt0111161/reviews?ref_=tt_urv",
        "imdb.com/title/tt0000001",
    ];
    let expected = ["tt1375666", "tt1375666", "tt0111161", "tt0000001"];
    for (link, id) in links.iter().zip(expected) {
        let identifier = extract_identifier(link);
        assert_eq!(identifier.scheme(), Scheme::Imdb, "{link}");
        assert_eq!(identifier.external_id(), id, "{link}");
    }
}

#[test]
fn tmdb_links_yield_numeric_ids() {
    let identifier = extract_identifier("https://www.themoviedb.org/movie/603-the-matrix?language=en-US");
    assert_eq!(identifier.scheme(), Scheme::Tmdb);
    assert_eq!(identifier.external_id(), "603");
}

#[test]
fn unmatched_links_are_none() {
    for link in [
        "https://example.com/foo",
        "",
        "https://www.themoviedb.org/tv/1396",
        "https://www.imdb.com/name/nm0000138",
        "27205",
        "tt1375666",
    ] {
        let identifier = extract_identifier(link);
        assert_eq!(identifier.scheme(), Scheme::None, "{link}");
        assert_eq!(identifier.external_id(), "", "{link}");
    }
}

#[test]
fn imdb_takes_precedence_over_tmdb() {
    let link = "https://www.themoviedb.org/movie/27205?from=https://www.imdb.com/title/tt1375666";
    let identifier = extract_identifier(link);
    assert_eq!(identifier, LinkIdentifier::imdb("tt1375666"));
}

#[test]
fn empty_id_collapses_to_none() {
    assert!(LinkIdentifier::tmdb("").is_none());
    assert_eq!(LinkIdentifier::imdb("").scheme(), Scheme::None);
}

#[test]
fn parse_failure_is_link_parse_kind() {
    let err = "https://example.com/foo".parse::<LinkIdentifier>().unwrap_err();
    assert_matches!(err, CentaurusError::UnsupportedLink(_));
    assert_eq!(err.kind(), ErrorKind::LinkParseFailure);
}

#[test]
fn folder_names_are_sanitized() {
    let name: FolderName = "Blade Runner 2049".parse().unwrap();
    assert_eq!(name.as_str(), "Blade_Runner_2049");

    let err = "a/b".parse::<FolderName>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}
