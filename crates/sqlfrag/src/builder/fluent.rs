//! Chainable front end over [`DmlFragments`].

use super::clauses::{Clause, DmlFragments};
use super::fragments::{ConditionKeyword, Connector, SelectTarget, SortDir};
use crate::error::FragResult;
use crate::escape::list_value;
use crate::value::Value;

/// Fluent DML query builder.
///
/// Arguments are SQL text that has already been escaped (see
/// [`QueryEscaper`](crate::QueryEscaper)); the builder only places them.
///
/// # Example
/// ```ignore
/// use sqlfrag::DmlQueryBuilder;
///
/// let mut q = DmlQueryBuilder::new();
/// q.select(["u.id", "r.name"])
///     .from("users u")
///     .join("roles r", "LEFT")
///     .on("u.role_id", "r.id")
///     .where_("u.active", "1")
///     .order_by("u.id", false)
///     .limit(10, None);
///
/// assert_eq!(
///     q.get_select_query(),
///     "SELECT u.id, r.name FROM users u LEFT JOIN roles r ON u.role_id = r.id \
///      WHERE u.active = 1 ORDER BY u.id DESC LIMIT 10"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct DmlQueryBuilder {
    fragments: DmlFragments,
}

impl DmlQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying fragment store.
    pub fn fragments(&self) -> &DmlFragments {
        &self.fragments
    }

    /// Mutable access for callers that need the raw `sql_*` mutators.
    pub fn fragments_mut(&mut self) -> &mut DmlFragments {
        &mut self.fragments
    }

    /// Rendered text of one clause slot.
    pub fn fragment(&self, clause: Clause) -> String {
        self.fragments.fragment(clause)
    }

    // ==================== SELECT ====================

    pub fn select<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for col in columns {
            self.fragments
                .sql_select(Some(col.as_ref()), SelectTarget::Select);
        }
        self
    }

    /// Select a literal `NULL`.
    pub fn select_null(&mut self) -> &mut Self {
        self.fragments.sql_select(None, SelectTarget::Select);
        self
    }

    /// Fill the RETURNING list; clears any selected columns.
    pub fn returning<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for col in columns {
            self.fragments
                .sql_select(Some(col.as_ref()), SelectTarget::Returning);
        }
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.select_mode("DISTINCT")
    }

    pub fn select_mode(&mut self, mode: &str) -> &mut Self {
        self.fragments.sql_select_mode(mode);
        self
    }

    pub fn group_by(&mut self, column: &str) -> &mut Self {
        self.fragments.sql_group_by(column);
        self
    }

    pub fn order_by(&mut self, column: &str, ascending: bool) -> &mut Self {
        let dir = if ascending { SortDir::Asc } else { SortDir::Desc };
        self.fragments.sql_order_by(column, dir);
        self
    }

    pub fn limit(&mut self, limit: u64, offset: Option<u64>) -> &mut Self {
        self.fragments.sql_limit(limit, offset);
        self
    }

    pub fn for_update(&mut self) -> &mut Self {
        self.fragments.sql_lock_mode("FOR UPDATE");
        self
    }

    pub fn lock_in_share_mode(&mut self) -> &mut Self {
        self.fragments.sql_lock_mode("LOCK IN SHARE MODE");
        self
    }

    // ==================== Compound / WITH ====================

    pub fn union(&mut self, query: &str, all: bool) -> &mut Self {
        let op = if all { "UNION ALL" } else { "UNION" };
        self.fragments.sql_compound(query, op);
        self
    }

    pub fn intersect(&mut self, query: &str) -> &mut Self {
        self.fragments.sql_compound(query, "INTERSECT");
        self
    }

    pub fn except(&mut self, query: &str) -> &mut Self {
        self.fragments.sql_compound(query, "EXCEPT");
        self
    }

    pub fn with(&mut self, alias: &str, body: &str, columns: &[&str]) -> &mut Self {
        self.fragments.sql_with(alias, body, "", "", columns);
        self
    }

    /// Add a recursive CTE: `alias AS ( anchor set_op recursive )`.
    pub fn with_recursive(
        &mut self,
        alias: &str,
        anchor: &str,
        recursive: &str,
        set_op: &str,
        columns: &[&str],
    ) -> &mut Self {
        self.fragments
            .sql_with(alias, anchor, recursive, set_op, columns);
        self
    }

    // ==================== FROM / JOIN ====================

    pub fn from(&mut self, table: &str) -> &mut Self {
        self.fragments.sql_from(table, &[]);
        self
    }

    pub fn from_with_hints(&mut self, table: &str, hints: &[Option<&str>]) -> &mut Self {
        self.fragments.sql_from(table, hints);
        self
    }

    /// Start a join; `join_type` is e.g. `""`, `"LEFT"`, `"NATURAL"`.
    pub fn join(&mut self, table: &str, join_type: &str) -> &mut Self {
        self.fragments.sql_join(table, join_type, &[]);
        self
    }

    pub fn join_with_hints(
        &mut self,
        table: &str,
        join_type: &str,
        hints: &[Option<&str>],
    ) -> &mut Self {
        self.fragments.sql_join(table, join_type, hints);
        self
    }

    pub fn using(&mut self, columns: &str) -> &mut Self {
        self.fragments.sql_using(columns);
        self
    }

    pub fn on(&mut self, left: &str, right: &str) -> &mut Self {
        self.on_op(left, "=", right)
    }

    pub fn on_op(&mut self, left: &str, operator: &str, right: &str) -> &mut Self {
        self.condition(ConditionKeyword::On, left, operator, right)
    }

    pub fn on_like(&mut self, left: &str, pattern: &str, negate: bool) -> &mut Self {
        self.like(ConditionKeyword::On, left, pattern, negate)
    }

    pub fn on_in(&mut self, left: &str, values: impl Into<Value>, negate: bool) -> &mut Self {
        self.in_list(ConditionKeyword::On, left, &values.into(), negate)
    }

    pub fn on_between(&mut self, left: &str, low: &str, high: &str, negate: bool) -> &mut Self {
        self.between(ConditionKeyword::On, left, low, high, negate)
    }

    pub fn start_on_group(&mut self) -> &mut Self {
        self.fragments.sql_group_start(ConditionKeyword::On);
        self
    }

    pub fn end_on_group(&mut self) -> &mut Self {
        self.fragments.sql_group_end(ConditionKeyword::On);
        self
    }

    // ==================== WHERE ====================

    pub fn where_(&mut self, left: &str, right: &str) -> &mut Self {
        self.where_op(left, "=", right)
    }

    pub fn where_op(&mut self, left: &str, operator: &str, right: &str) -> &mut Self {
        self.condition(ConditionKeyword::Where, left, operator, right)
    }

    pub fn where_like(&mut self, left: &str, pattern: &str, negate: bool) -> &mut Self {
        self.like(ConditionKeyword::Where, left, pattern, negate)
    }

    pub fn where_in(&mut self, left: &str, values: impl Into<Value>, negate: bool) -> &mut Self {
        self.in_list(ConditionKeyword::Where, left, &values.into(), negate)
    }

    pub fn where_between(&mut self, left: &str, low: &str, high: &str, negate: bool) -> &mut Self {
        self.between(ConditionKeyword::Where, left, low, high, negate)
    }

    /// `left IS NULL`, or `left IS NOT NULL` when negated.
    pub fn where_null(&mut self, left: &str, negate: bool) -> &mut Self {
        let op = if negate { "IS NOT" } else { "IS" };
        self.condition(ConditionKeyword::Where, left, op, "NULL")
    }

    pub fn start_where_group(&mut self) -> &mut Self {
        self.fragments.sql_group_start(ConditionKeyword::Where);
        self
    }

    pub fn end_where_group(&mut self) -> &mut Self {
        self.fragments.sql_group_end(ConditionKeyword::Where);
        self
    }

    // ==================== HAVING ====================

    pub fn having(&mut self, left: &str, right: &str) -> &mut Self {
        self.having_op(left, "=", right)
    }

    pub fn having_op(&mut self, left: &str, operator: &str, right: &str) -> &mut Self {
        self.condition(ConditionKeyword::Having, left, operator, right)
    }

    pub fn having_like(&mut self, left: &str, pattern: &str, negate: bool) -> &mut Self {
        self.like(ConditionKeyword::Having, left, pattern, negate)
    }

    pub fn having_in(&mut self, left: &str, values: impl Into<Value>, negate: bool) -> &mut Self {
        self.in_list(ConditionKeyword::Having, left, &values.into(), negate)
    }

    pub fn having_between(
        &mut self,
        left: &str,
        low: &str,
        high: &str,
        negate: bool,
    ) -> &mut Self {
        self.between(ConditionKeyword::Having, left, low, high, negate)
    }

    pub fn start_having_group(&mut self) -> &mut Self {
        self.fragments.sql_group_start(ConditionKeyword::Having);
        self
    }

    pub fn end_having_group(&mut self) -> &mut Self {
        self.fragments.sql_group_end(ConditionKeyword::Having);
        self
    }

    // ==================== Connector ====================

    /// Join subsequent predicates with `AND` until changed.
    pub fn sql_and(&mut self) -> &mut Self {
        self.fragments.sql_connector(Connector::And);
        self
    }

    /// Join subsequent predicates with `OR` until changed.
    pub fn sql_or(&mut self) -> &mut Self {
        self.fragments.sql_connector(Connector::Or);
        self
    }

    fn condition(
        &mut self,
        keyword: ConditionKeyword,
        left: &str,
        operator: &str,
        right: &str,
    ) -> &mut Self {
        self.fragments.sql_condition(left, right, operator, keyword);
        self
    }

    fn like(
        &mut self,
        keyword: ConditionKeyword,
        left: &str,
        pattern: &str,
        negate: bool,
    ) -> &mut Self {
        let op = if negate { "NOT LIKE" } else { "LIKE" };
        self.condition(keyword, left, op, pattern)
    }

    fn in_list(
        &mut self,
        keyword: ConditionKeyword,
        left: &str,
        values: &Value,
        negate: bool,
    ) -> &mut Self {
        let op = if negate { "NOT IN" } else { "IN" };
        self.condition(keyword, left, op, &list_value(values))
    }

    fn between(
        &mut self,
        keyword: ConditionKeyword,
        left: &str,
        low: &str,
        high: &str,
        negate: bool,
    ) -> &mut Self {
        let op = if negate { "NOT BETWEEN" } else { "BETWEEN" };
        self.condition(keyword, left, op, &format!("{low} AND {high}"))
    }

    // ==================== UPDATE / DELETE ====================

    pub fn update(&mut self, table: &str) -> &mut Self {
        self.fragments.sql_update(table);
        self
    }

    pub fn update_mode(&mut self, mode: &str) -> &mut Self {
        self.fragments.sql_update_mode(mode);
        self
    }

    /// Append `column = value` assignments; `None` values become `NULL`.
    pub fn set<I, K, V>(&mut self, assignments: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let assignments: Vec<(String, Option<String>)> = assignments
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.map(|v| v.as_ref().to_string())))
            .collect();
        self.fragments.sql_set(&assignments);
        self
    }

    pub fn delete(&mut self, table: &str) -> &mut Self {
        self.fragments.sql_delete(table);
        self
    }

    pub fn delete_mode(&mut self, mode: &str) -> &mut Self {
        self.fragments.sql_delete_mode(mode);
        self
    }

    // ==================== INSERT / REPLACE ====================

    /// Set the INSERT/REPLACE target (`INTO table`). The last call wins.
    pub fn into_table(&mut self, table: &str) -> &mut Self {
        self.fragments.sql_into(table);
        self
    }

    pub fn insert_mode(&mut self, mode: &str) -> &mut Self {
        self.fragments.sql_insert_mode(mode);
        self
    }

    pub fn column_names(&mut self, columns: &[&str]) -> &mut Self {
        self.fragments.sql_column_names(columns);
        self
    }

    /// Append value rows; `None` members become `NULL`.
    pub fn values<R, V>(&mut self, rows: impl IntoIterator<Item = R>) -> &mut Self
    where
        R: IntoIterator<Item = Option<V>>,
        V: AsRef<str>,
    {
        let rows: Vec<Vec<Option<String>>> = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|v| v.map(|v| v.as_ref().to_string()))
                    .collect()
            })
            .collect();
        self.fragments.sql_values(&rows);
        self
    }

    /// Use a sub-select as the insert body; non-SELECT text clears it.
    pub fn select_statement(&mut self, statement: &str) -> &mut Self {
        self.fragments.sql_select_statement(statement);
        self
    }

    /// `ON CONFLICT [target] action`; `target` is placed verbatim, e.g. `(id)`.
    pub fn on_conflict(&mut self, target: &str, action: &str) -> &mut Self {
        self.fragments.sql_upsert("ON CONFLICT", action, target);
        self
    }

    /// `ON DUPLICATE KEY UPDATE c1 = v1, c2 = v2`.
    pub fn on_duplicate_key_update<I, K, V>(&mut self, assignments: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let action: Vec<String> = assignments
            .into_iter()
            .map(|(k, v)| format!("{} = {}", k.as_ref(), v.as_ref()))
            .collect();
        self.fragments
            .sql_upsert("ON DUPLICATE KEY UPDATE", &action.join(", "), "");
        self
    }

    // ==================== Terminal ====================

    pub fn get_select_query(&self) -> String {
        self.fragments.get_select_query()
    }

    pub fn get_insert_query(&self) -> String {
        self.fragments.get_insert_query()
    }

    pub fn get_replace_query(&self) -> FragResult<String> {
        self.fragments.get_replace_query()
    }

    pub fn get_update_query(&self) -> String {
        self.fragments.get_update_query()
    }

    pub fn get_delete_query(&self) -> String {
        self.fragments.get_delete_query()
    }
}
