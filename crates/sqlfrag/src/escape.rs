//! Value and reference escaping for query fragments.
//!
//! [`QueryEscaper`] builds on an [`IdentifierEscaper`] and turns caller input
//! into SQL text that can be handed to the fragment builder. Every helper has a
//! `null_or_*` twin that short-circuits on a null input.
//!
//! # Example
//! ```ignore
//! use sqlfrag::QueryEscaper;
//!
//! let e: QueryEscaper = QueryEscaper::default();
//! assert_eq!(e.column("u.name", "utf8mb4_bin"), "`u`.`name` COLLATE utf8mb4_bin");
//! assert_eq!(e.result_column("u.id", "user_id"), "`u`.`id` AS `user_id`");
//! assert_eq!(e.list_value(&vec![1, 2, 3].into()), "(1,2,3)");
//! ```

use crate::error::FragResult;
use crate::ident::{BacktickEscaper, IdentifierEscaper};
use crate::value::Value;

/// Escapes columns, tables and values for one identifier dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEscaper<E = BacktickEscaper> {
    ident: E,
}

impl<E: IdentifierEscaper> QueryEscaper<E> {
    /// Create an escaper over the given identifier dialect.
    pub fn new(ident: E) -> Self {
        Self { ident }
    }

    /// The underlying identifier escaper.
    pub fn identifiers(&self) -> &E {
        &self.ident
    }

    pub fn escape_location_reference(&self, reference: &str) -> String {
        self.ident.escape_location_reference(reference)
    }

    /// Append `COLLATE collation` unless `collation` is empty.
    pub fn collate(&self, value: &str, collation: &str) -> String {
        if collation.is_empty() {
            value.to_string()
        } else {
            format!("{value} COLLATE {collation}")
        }
    }

    /// Escaped column reference with an optional collation.
    pub fn column(&self, name: &str, collation: &str) -> String {
        self.collate(&self.ident.escape_location_reference(name), collation)
    }

    /// Escaped result column with an optional alias.
    ///
    /// The wildcard `*` cannot be aliased; its alias is dropped.
    pub fn result_column(&self, name: &str, alias: &str) -> String {
        let escaped = self.ident.escape_location_reference(name);
        if name == "*" || alias.is_empty() {
            escaped
        } else {
            format!("{escaped} AS {}", self.ident.escape_identifier(alias))
        }
    }

    /// `HEX(column) AS alias`, where the alias defaults to the raw name.
    ///
    /// As with [`result_column`](Self::result_column), the wildcard `*` is
    /// never aliased and renders as `HEX(*)`.
    pub fn hex_result_column(&self, name: &str, alias: &str) -> String {
        if name == "*" {
            return "HEX(*)".to_string();
        }
        let alias = if alias.is_empty() { name } else { alias };
        format!(
            "HEX({}) AS {}",
            self.ident.escape_location_reference(name),
            self.ident.escape_identifier(alias)
        )
    }

    /// Escaped table reference with an optional alias.
    pub fn table(&self, name: &str, alias: &str) -> String {
        let escaped = self.ident.escape_location_reference(name);
        if alias.is_empty() {
            escaped
        } else {
            format!("{escaped} AS {}", self.ident.escape_identifier(alias))
        }
    }

    /// Integer coercion of `value`.
    ///
    /// Objects cannot be converted: a warning is emitted and 0 returned.
    pub fn intvalue(&self, value: &Value) -> i64 {
        match value.to_int() {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(
                    target: "sqlfrag.escape",
                    value_type = value.type_name(),
                    error = %err,
                    "could not convert value to int"
                );
                0
            }
        }
    }

    /// Integer coercion that reports objects as an error.
    pub fn try_intvalue(&self, value: &Value) -> FragResult<i64> {
        value.to_int()
    }

    /// Float coercion of `value`.
    ///
    /// Objects cannot be converted: a warning is emitted and 0.0 returned.
    pub fn floatvalue(&self, value: &Value) -> f64 {
        match value.to_float() {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(
                    target: "sqlfrag.escape",
                    value_type = value.type_name(),
                    error = %err,
                    "could not convert value to float"
                );
                0.0
            }
        }
    }

    /// Float coercion that reports objects as an error.
    pub fn try_floatvalue(&self, value: &Value) -> FragResult<f64> {
        value.to_float()
    }

    /// Wrap a sub-query in parentheses.
    pub fn query_value(&self, query: &str) -> String {
        format!("({query})")
    }

    /// `(a,b,c)` for a list; an empty string for anything else.
    ///
    /// Nested lists and objects inside the list are skipped.
    pub fn list_value(&self, values: &Value) -> String {
        list_value(values)
    }

    // ==================== Null-propagating variants ====================

    pub fn null_or_collate(&self, value: Option<&str>, collation: &str) -> Option<String> {
        value.map(|v| self.collate(v, collation))
    }

    pub fn null_or_column(&self, name: Option<&str>, collation: &str) -> Option<String> {
        name.map(|n| self.column(n, collation))
    }

    pub fn null_or_result_column(&self, name: Option<&str>, alias: &str) -> Option<String> {
        name.map(|n| self.result_column(n, alias))
    }

    pub fn null_or_hex_result_column(&self, name: Option<&str>, alias: &str) -> Option<String> {
        name.map(|n| self.hex_result_column(n, alias))
    }

    pub fn null_or_table(&self, name: Option<&str>, alias: &str) -> Option<String> {
        name.map(|n| self.table(n, alias))
    }

    pub fn null_or_intvalue(&self, value: &Value) -> Option<i64> {
        (!value.is_null()).then(|| self.intvalue(value))
    }

    pub fn null_or_floatvalue(&self, value: &Value) -> Option<f64> {
        (!value.is_null()).then(|| self.floatvalue(value))
    }

    pub fn null_or_query_value(&self, query: Option<&str>) -> Option<String> {
        query.map(|q| self.query_value(q))
    }

    pub fn null_or_list_value(&self, values: &Value) -> Option<String> {
        (!values.is_null()).then(|| self.list_value(values))
    }
}

/// `(a,b,c)` for a list; an empty string for anything else.
///
/// Independent of the identifier dialect, so the builder can render `IN`
/// lists without an escaper instance.
pub fn list_value(values: &Value) -> String {
    let Value::List(items) = values else {
        return String::new();
    };
    let parts: Vec<String> = items.iter().filter_map(Value::scalar_text).collect();
    format!("({})", parts.join(","))
}
