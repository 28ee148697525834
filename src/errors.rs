//! Error types with rich diagnostics using miette
//!
//! Markup errors carry the offending markup as source so the report can point
//! at the exact character the XML parser rejected.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors raised while configuring, resolving or drawing points
#[derive(Error, Diagnostic, Debug)]
pub enum PointError {
    #[error("malformed point markup: {reason}")]
    #[diagnostic(
        code(pointmark::markup::malformed),
        help("inline point markup must be a single well-formed SVG element")
    )]
    MalformedMarkup {
        reason: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("parser stopped here")]
        span: SourceSpan,
    },

    #[error("point shape `{name}` is reserved but has no renderer")]
    #[diagnostic(
        code(pointmark::shape::unsupported),
        help("use `circle`, `rectangle`, a custom shape or inline SVG markup")
    )]
    UnsupportedShape { name: String },

    #[error("invalid point radius: {value}")]
    #[diagnostic(code(pointmark::config::invalid_radius))]
    InvalidRadius { value: f64 },

    #[error("point element has no bound datum")]
    #[diagnostic(
        code(pointmark::render::missing_datum),
        help("bind a `DataPoint` to the element before creating or updating its point")
    )]
    MissingDatum,

    #[error("cannot draw a point into an empty selection")]
    #[diagnostic(code(pointmark::render::empty_selection))]
    EmptySelection,
}

impl PointError {
    /// Build a markup error from a roxmltree failure, converting its
    /// row/column position into a byte span within `markup`.
    pub(crate) fn markup(markup: &str, err: &roxmltree::Error) -> Self {
        let pos = err.pos();
        let offset = byte_offset(markup, pos.row, pos.col);
        let len = markup[offset..].chars().next().map_or(0, char::len_utf8);

        PointError::MalformedMarkup {
            reason: err.to_string(),
            src: NamedSource::new("<point markup>", markup.to_string()),
            span: (offset, len).into(),
        }
    }
}

/// Byte offset of a 1-based row/column position, clamped to the input.
fn byte_offset(text: &str, row: u32, col: u32) -> usize {
    let mut offset = 0;
    for (i, line) in text.split_inclusive('\n').enumerate() {
        if i + 1 == row as usize {
            let col_offset = line
                .char_indices()
                .nth(col.saturating_sub(1) as usize)
                .map_or(line.len(), |(idx, _)| idx);
            return (offset + col_offset).min(text.len());
        }
        offset += line.len();
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_offset_first_line() {
        assert_eq!(byte_offset("<circle r=>", 1, 1), 0);
        assert_eq!(byte_offset("<circle r=>", 1, 11), 10);
    }

    #[test]
    fn byte_offset_later_line() {
        let text = "<g>\n  <rect/>\n</x>";
        assert_eq!(byte_offset(text, 3, 3), 16);
    }

    #[test]
    fn byte_offset_clamps_past_end() {
        assert_eq!(byte_offset("<a/>", 9, 9), 4);
    }

    #[test]
    fn markup_error_points_into_source() {
        let markup = "<polygon points='0,0'";
        let err = roxmltree::Document::parse(markup).unwrap_err();
        match PointError::markup(markup, &err) {
            PointError::MalformedMarkup { span, .. } => {
                assert!(span.offset() <= markup.len());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
