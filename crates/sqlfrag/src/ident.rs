//! Identifier quoting.
//!
//! This module provides [`IdentifierEscaper`], which quotes table and column
//! location references such as `db.table.column`. Each `.`-separated segment
//! is quoted on its own; `*` and empty segments are left as-is.
//!
//! # Example
//! ```ignore
//! use sqlfrag::{BacktickEscaper, IdentifierEscaper};
//!
//! let e = BacktickEscaper;
//! assert_eq!(e.escape_location_reference("shop.users.*"), "`shop`.`users`.*");
//! ```

/// Quotes identifiers for one SQL dialect.
///
/// Implementors only provide [`escape_identifier`](Self::escape_identifier);
/// dotted references are split and escaped segment by segment.
pub trait IdentifierEscaper {
    /// Quote a single identifier segment.
    fn escape_identifier(&self, segment: &str) -> String;

    /// Quote a dotted location reference (`db.table.col`, `table.*`, `*`).
    fn escape_location_reference(&self, reference: &str) -> String {
        let mut out = String::with_capacity(reference.len() + 4);
        for (i, segment) in reference.split('.').enumerate() {
            if i > 0 {
                out.push('.');
            }
            if segment.is_empty() || segment == "*" {
                out.push_str(segment);
            } else {
                out.push_str(&self.escape_identifier(segment));
            }
        }
        out
    }
}

/// MySQL/MariaDB style: `` `name` ``, embedded back-ticks doubled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BacktickEscaper;

impl IdentifierEscaper for BacktickEscaper {
    fn escape_identifier(&self, segment: &str) -> String {
        quote_with(segment, '`')
    }
}

/// ANSI/PostgreSQL style: `"name"`, embedded double quotes doubled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoubleQuoteEscaper;

impl IdentifierEscaper for DoubleQuoteEscaper {
    fn escape_identifier(&self, segment: &str) -> String {
        quote_with(segment, '"')
    }
}

fn quote_with(segment: &str, quote: char) -> String {
    let mut out = String::with_capacity(segment.len() + 2);
    out.push(quote);
    for ch in segment.chars() {
        if ch == quote {
            out.push(quote);
        }
        out.push(ch);
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_segment() {
        assert_eq!(BacktickEscaper.escape_location_reference("users"), "`users`");
    }

    #[test]
    fn dotted_segments() {
        assert_eq!(
            BacktickEscaper.escape_location_reference("shop.users.id"),
            "`shop`.`users`.`id`"
        );
    }

    #[test]
    fn wildcard_is_not_quoted() {
        assert_eq!(BacktickEscaper.escape_location_reference("*"), "*");
        assert_eq!(
            BacktickEscaper.escape_location_reference("table.*"),
            "`table`.*"
        );
    }

    #[test]
    fn wildcard_suffix_for_any_column_prefix() {
        for prefix in ["a", "orders", "shop.orders", "x_1"] {
            let escaped = BacktickEscaper.escape_location_reference(&format!("{prefix}.*"));
            let expected = format!("{}.*", BacktickEscaper.escape_location_reference(prefix));
            assert_eq!(escaped, expected);
        }
    }

    #[test]
    fn empty_segments_pass_through() {
        assert_eq!(BacktickEscaper.escape_location_reference(""), "");
        assert_eq!(BacktickEscaper.escape_location_reference("a..b"), "`a`..`b`");
    }

    #[test]
    fn embedded_quote_is_doubled() {
        assert_eq!(BacktickEscaper.escape_identifier("we`ird"), "`we``ird`");
        assert_eq!(DoubleQuoteEscaper.escape_identifier(r#"has"quote"#), r#""has""quote""#);
    }

    #[test]
    fn double_quote_dialect() {
        assert_eq!(
            DoubleQuoteEscaper.escape_location_reference("public.users.*"),
            r#""public"."users".*"#
        );
    }
}
