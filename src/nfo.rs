//! `.nfo` sidecar rendering.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::CentaurusError;
use crate::metadata::MetadataRecord;

const ROOT: &str = "movie";

/// Renders the record as an indented XML document with no `<?xml ...?>`
/// prolog; the first line is the root's opening tag. Text escapes only
/// `&`, `<` and `>`, so quotes and apostrophes stay readable.
pub fn render_sidecar(record: &MetadataRecord) -> Result<String, CentaurusError> {
    let fields = [
        ("title", record.title.clone()),
        ("year", record.year.clone()),
        ("plot", record.overview.clone()),
        ("imdb", record.imdb_link().unwrap_or_default()),
        ("tmdb", record.tmdb_link()),
        ("genres", record.genres.join(", ")),
        ("rating", record.rating.clone()),
    ];

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 4);
    writer
        .write_event(Event::Start(BytesStart::new(ROOT)))
        .map_err(render_error)?;
    for (name, text) in &fields {
        let element = writer.create_element(*name);
        if text.is_empty() {
            element.write_empty().map_err(render_error)?;
        } else {
            element
                .write_text_content(BytesText::from_escaped(partial_escape(text.as_str())))
                .map_err(render_error)?;
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(ROOT)))
        .map_err(render_error)?;

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|err| CentaurusError::Render(err.to_string()))
}

fn render_error(err: impl std::fmt::Display) -> CentaurusError {
    CentaurusError::Render(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MetadataRecord {
        MetadataRecord {
            title: "Inception".to_string(),
            year: "2010".to_string(),
            overview: "Dreams & heists".to_string(),
            imdb_id: Some("tt1375666".to_string()),
            tmdb_id: "27205".to_string(),
            genres: vec!["Action".to_string(), "Sci-Fi".to_string()],
            rating: "8.8".to_string(),
        }
    }

    #[test]
    fn renders_fields_in_order_with_four_space_indent() {
        let nfo = render_sidecar(&record()).unwrap();
        let expected = "<movie>\n    <title>Inception</title>\n    <year>2010</year>\n    <plot>Dreams &amp; heists</plot>\n    <imdb>https://www.imdb.com/title/tt1375666</imdb>\n    <tmdb>https://www.themoviedb.org/movie/27205</tmdb>\n    <genres>Action, Sci-Fi</genres>\n    <rating>8.8</rating>\n</movie>";
        assert_eq!(nfo, expected);
    }

    #[test]
    fn quotes_and_apostrophes_stay_literal() {
        let mut record = record();
        record.title = "Schindler's List".to_string();
        record.overview = "He said \"go\" & left <fast>".to_string();
        let nfo = render_sidecar(&record).unwrap();
        assert!(nfo.contains("<title>Schindler's List</title>"));
        assert!(nfo.contains("<plot>He said \"go\" &amp; left &lt;fast&gt;</plot>"));
    }

    #[test]
    fn missing_imdb_id_renders_empty_element() {
        let mut record = record();
        record.imdb_id = None;
        let nfo = render_sidecar(&record).unwrap();
        assert!(nfo.contains("    <imdb/>\n"));
        assert!(!nfo.starts_with("<?xml"));
    }
}
