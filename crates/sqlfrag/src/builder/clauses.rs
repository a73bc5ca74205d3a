//! The fragment store: one slot per SQL clause, low-level `sql_*` mutators,
//! and the `get_*_query` assemblers.

use super::fragments::{
    Compound, ConditionKeyword, ConditionList, Connector, CteDefinition, ModeList, SelectTarget,
    SortDir, TableRef,
};
use super::join::{JoinAction, JoinClause, JoinEvent, JoinState, join_keyword, transition};
use crate::error::{FragError, FragResult};

/// Clause slots observable through [`DmlFragments::fragment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Select,
    SelectMode,
    From,
    Join,
    Where,
    Having,
    GroupBy,
    OrderBy,
    Limit,
    LockMode,
    Compound,
    With,
    Update,
    UpdateMode,
    Delete,
    DeleteMode,
    Into,
    InsertMode,
    ColumnNames,
    Values,
    Set,
    SelectStatement,
    Upsert,
    Returning,
}

/// Join the non-empty parts with single spaces.
pub fn implode_query(parts: &[&str]) -> String {
    let mut out = String::new();
    for part in parts.iter().filter(|p| !p.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}

/// Accumulated clause fragments of one statement.
///
/// Mutators never fail: input that cannot be applied in the current state is
/// ignored. Assembly reads the fragments without clearing them.
#[derive(Debug, Clone, Default)]
pub struct DmlFragments {
    select: Vec<String>,
    select_mode: ModeList,
    from: Vec<TableRef>,
    joins: Vec<JoinClause>,
    join_state: JoinState,
    where_conditions: ConditionList,
    having_conditions: ConditionList,
    group_by: Vec<String>,
    order_by: Vec<String>,
    limit: Option<String>,
    lock_mode: Option<String>,
    compound: Option<Compound>,
    with: Vec<CteDefinition>,
    is_recursive: bool,
    update: Vec<String>,
    update_mode: ModeList,
    delete: Vec<String>,
    delete_mode: ModeList,
    into: Option<String>,
    insert_mode: ModeList,
    column_names: Vec<String>,
    values: Vec<String>,
    set: Vec<String>,
    select_statement: Option<String>,
    upsert: Option<String>,
    returning: Vec<String>,
    connector: Connector,
}

impl DmlFragments {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== State inspection ====================

    pub fn join_state(&self) -> JoinState {
        self.join_state
    }

    pub fn is_unfinished_join(&self) -> bool {
        self.join_state.is_unfinished()
    }

    pub fn join_type(&self) -> &'static str {
        self.join_state.join_type()
    }

    pub fn connector(&self) -> Connector {
        self.connector
    }

    pub fn is_recursive(&self) -> bool {
        self.is_recursive
    }

    /// Render one clause slot as it would appear in a statement.
    pub fn fragment(&self, clause: Clause) -> String {
        match clause {
            Clause::Select => prefixed("SELECT", &self.select, ", "),
            Clause::SelectMode => self.select_mode.render(),
            Clause::From => {
                let tables: Vec<String> = self.from.iter().map(TableRef::render).collect();
                prefixed("FROM", &tables, ", ")
            }
            Clause::Join => {
                let joins: Vec<String> = self.joins.iter().map(JoinClause::render).collect();
                joins.join(" ")
            }
            Clause::Where => self.where_conditions.render(ConditionKeyword::Where.to_sql()),
            Clause::Having => self
                .having_conditions
                .render(ConditionKeyword::Having.to_sql()),
            Clause::GroupBy => prefixed("GROUP BY", &self.group_by, ", "),
            Clause::OrderBy => prefixed("ORDER BY", &self.order_by, ", "),
            Clause::Limit => self.limit.clone().unwrap_or_default(),
            Clause::LockMode => self.lock_mode.clone().unwrap_or_default(),
            Clause::Compound => self.compound.as_ref().map(Compound::render).unwrap_or_default(),
            Clause::With => {
                if self.with.is_empty() {
                    return String::new();
                }
                let defs: Vec<String> = self.with.iter().map(CteDefinition::render).collect();
                let keyword = if self.is_recursive { "WITH RECURSIVE" } else { "WITH" };
                format!("{keyword} {}", defs.join(", "))
            }
            Clause::Update => self.update.join(", "),
            Clause::UpdateMode => self.update_mode.render(),
            Clause::Delete => self.delete.join(", "),
            Clause::DeleteMode => self.delete_mode.render(),
            Clause::Into => self
                .into
                .as_ref()
                .map(|t| format!("INTO {t}"))
                .unwrap_or_default(),
            Clause::InsertMode => self.insert_mode.render(),
            Clause::ColumnNames => {
                if self.column_names.is_empty() {
                    String::new()
                } else {
                    format!("({})", self.column_names.join(", "))
                }
            }
            Clause::Values => prefixed("VALUES", &self.values, ", "),
            Clause::Set => prefixed("SET", &self.set, ", "),
            Clause::SelectStatement => self.select_statement.clone().unwrap_or_default(),
            Clause::Upsert => self.upsert.clone().unwrap_or_default(),
            Clause::Returning => prefixed("RETURNING", &self.returning, ", "),
        }
    }

    // ==================== SELECT family ====================

    /// Append a column (or `NULL`) to the select or returning list.
    ///
    /// The two lists are mutually exclusive: filling one clears the other.
    pub fn sql_select(&mut self, col: Option<&str>, target: SelectTarget) {
        let col = col.unwrap_or("NULL").to_string();
        match target {
            SelectTarget::Select => {
                self.returning.clear();
                self.select.push(col);
            }
            SelectTarget::Returning => {
                self.select.clear();
                self.returning.push(col);
            }
        }
    }

    pub fn sql_select_mode(&mut self, mode: &str) {
        self.select_mode.push(mode);
    }

    /// Set the compound operator; a later call replaces an earlier one.
    ///
    /// The query is stored bare. Both sides are parenthesized on render:
    /// `fragment(Clause::Compound)` is `operator (query)` and
    /// `get_select_query()` wraps the primary select as `(primary)`.
    pub fn sql_compound(&mut self, query: &str, operator: &str) {
        self.compound = Some(Compound {
            operator: operator.to_string(),
            query: query.to_string(),
        });
    }

    /// Add one CTE definition.
    ///
    /// A non-empty `recursive_body` makes the definition recursive and the
    /// whole WITH clause `WITH RECURSIVE`.
    pub fn sql_with(
        &mut self,
        alias: &str,
        body: &str,
        recursive_body: &str,
        set_op: &str,
        columns: &[&str],
    ) {
        let recursive = if recursive_body.is_empty() {
            None
        } else {
            self.is_recursive = true;
            Some((set_op.to_string(), recursive_body.to_string()))
        };
        self.with.push(CteDefinition {
            alias: alias.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            body: body.to_string(),
            recursive,
        });
    }

    pub fn sql_group_by(&mut self, col: &str) {
        self.group_by.push(col.to_string());
    }

    pub fn sql_order_by(&mut self, col: &str, dir: SortDir) {
        self.order_by.push(format!("{col} {}", dir.to_sql()));
    }

    /// Set LIMIT (and OFFSET); the last call wins.
    pub fn sql_limit(&mut self, limit: u64, offset: Option<u64>) {
        self.limit = Some(match offset {
            Some(offset) => format!("LIMIT {limit} OFFSET {offset}"),
            None => format!("LIMIT {limit}"),
        });
    }

    pub fn sql_lock_mode(&mut self, mode: &str) {
        self.lock_mode = (!mode.is_empty()).then(|| mode.to_string());
    }

    // ==================== FROM / JOIN ====================

    /// Add a table to FROM; repeated calls build a comma-separated list.
    pub fn sql_from(&mut self, table: &str, hints: &[Option<&str>]) {
        self.from.push(TableRef::new(table, hints));
    }

    /// Append a join clause and reset the join state.
    pub fn sql_join(&mut self, table: &str, join_type: &str, hints: &[Option<&str>]) {
        let clause = JoinClause::new(join_keyword(join_type), TableRef::new(table, hints));
        self.join_state = if clause.is_natural() {
            JoinState::Natural
        } else {
            JoinState::Unfinished
        };
        self.joins.push(clause);
    }

    /// Add `left operator right` to WHERE, HAVING or the current join's ON.
    pub fn sql_condition(
        &mut self,
        left: &str,
        right: &str,
        operator: &str,
        keyword: ConditionKeyword,
    ) {
        let predicate = format!("{left} {operator} {right}");
        let connector = self.connector;
        match keyword {
            ConditionKeyword::Where => self.where_conditions.push_predicate(predicate, connector),
            ConditionKeyword::Having => self.having_conditions.push_predicate(predicate, connector),
            ConditionKeyword::On => {
                let action = self.apply_join_event(JoinEvent::On);
                if matches!(action, JoinAction::OpenOn | JoinAction::ExtendOn) {
                    if let Some(list) = self.current_join_mut().and_then(JoinClause::on_list) {
                        list.push_predicate(predicate, connector);
                    }
                }
            }
        }
    }

    /// Key the current join by USING, or add columns to its USING list.
    pub fn sql_using(&mut self, columns: &str) {
        let action = self.apply_join_event(JoinEvent::Using);
        if matches!(action, JoinAction::OpenUsing | JoinAction::ExtendUsing) {
            if let Some(cols) = self.current_join_mut().and_then(JoinClause::using_list) {
                cols.push(columns.to_string());
            }
        }
    }

    pub fn sql_group_start(&mut self, keyword: ConditionKeyword) {
        let connector = self.connector;
        match keyword {
            ConditionKeyword::Where => self.where_conditions.open_group(connector),
            ConditionKeyword::Having => self.having_conditions.open_group(connector),
            ConditionKeyword::On => {
                let action = self.apply_join_event(JoinEvent::GroupStart);
                if matches!(action, JoinAction::OpenOnGroup | JoinAction::ExtendOnGroup) {
                    if let Some(list) = self.current_join_mut().and_then(JoinClause::on_list) {
                        list.open_group(connector);
                    }
                }
            }
        }
    }

    pub fn sql_group_end(&mut self, keyword: ConditionKeyword) {
        match keyword {
            ConditionKeyword::Where => self.where_conditions.close_group(),
            ConditionKeyword::Having => self.having_conditions.close_group(),
            ConditionKeyword::On => {
                if self.apply_join_event(JoinEvent::GroupEnd) == JoinAction::CloseOnGroup {
                    if let Some(list) = self.current_join_mut().and_then(JoinClause::on_list) {
                        list.close_group();
                    }
                }
            }
        }
    }

    /// Set the connector for subsequent predicates; it stays until changed.
    pub fn sql_connector(&mut self, connector: Connector) {
        self.connector = connector;
    }

    fn apply_join_event(&mut self, event: JoinEvent) -> JoinAction {
        let (action, next) = transition(self.join_state, event);
        self.join_state = next;
        action
    }

    fn current_join_mut(&mut self) -> Option<&mut JoinClause> {
        self.joins.last_mut()
    }

    // ==================== INSERT / REPLACE / UPDATE / DELETE ====================

    /// Set the INSERT/REPLACE target; the last call wins.
    pub fn sql_into(&mut self, table: &str) {
        self.into = Some(table.to_string());
    }

    pub fn sql_insert_mode(&mut self, mode: &str) {
        self.insert_mode.push(mode);
    }

    pub fn sql_column_names(&mut self, columns: &[&str]) {
        self.column_names = columns.iter().map(|c| c.to_string()).collect();
    }

    /// Append value tuples; `None` members render as `NULL`.
    pub fn sql_values(&mut self, rows: &[Vec<Option<String>>]) {
        for row in rows {
            let members: Vec<&str> = row.iter().map(|v| v.as_deref().unwrap_or("NULL")).collect();
            self.values.push(format!("({})", members.join(", ")));
        }
    }

    /// Store a sub-select; anything not starting with `SELECT` resets the slot.
    pub fn sql_select_statement(&mut self, statement: &str) {
        let accepted = statement
            .trim_start()
            .get(..6)
            .is_some_and(|head| head.eq_ignore_ascii_case("SELECT"));
        self.select_statement = accepted.then(|| statement.to_string());
    }

    /// Append `column = value` assignments; `None` renders as `NULL`.
    pub fn sql_set(&mut self, assignments: &[(String, Option<String>)]) {
        for (column, value) in assignments {
            self.set.push(format!(
                "{column} = {}",
                value.as_deref().unwrap_or("NULL")
            ));
        }
    }

    /// `keyword [target] action`, e.g. `ON CONFLICT (id) DO NOTHING`.
    pub fn sql_upsert(&mut self, keyword: &str, action: &str, target: &str) {
        self.upsert = Some(implode_query(&[keyword, target, action]));
    }

    pub fn sql_update(&mut self, table: &str) {
        self.update.push(table.to_string());
    }

    pub fn sql_update_mode(&mut self, mode: &str) {
        self.update_mode.push(mode);
    }

    pub fn sql_delete(&mut self, table: &str) {
        self.delete.push(table.to_string());
    }

    pub fn sql_delete_mode(&mut self, mode: &str) {
        self.delete_mode.push(mode);
    }

    // ==================== Assembly ====================

    fn select_head(&self) -> String {
        if !self.select.is_empty() {
            implode_query(&[
                "SELECT",
                &self.select_mode.render(),
                &self.select.join(", "),
            ])
        } else {
            self.fragment(Clause::Returning)
        }
    }

    /// Assemble the SELECT statement, or `""` when no column was selected.
    pub fn get_select_query(&self) -> String {
        let head = self.select_head();
        if head.is_empty() {
            return String::new();
        }
        let primary = implode_query(&[
            &head,
            &self.fragment(Clause::From),
            &self.fragment(Clause::Join),
            &self.fragment(Clause::Where),
            &self.fragment(Clause::GroupBy),
            &self.fragment(Clause::Having),
            &self.fragment(Clause::OrderBy),
            &self.fragment(Clause::Limit),
            &self.fragment(Clause::LockMode),
        ]);
        let with = self.fragment(Clause::With);
        match &self.compound {
            Some(compound) => {
                implode_query(&[&with, &format!("({primary})"), &compound.render()])
            }
            None => implode_query(&[&with, &primary]),
        }
    }

    /// Assemble the DELETE statement, or `""` without a FROM table.
    ///
    /// ORDER BY and LIMIT only apply to a single-table delete without
    /// explicit targets or joins; otherwise they are dropped.
    pub fn get_delete_query(&self) -> String {
        let from = self.fragment(Clause::From);
        if from.is_empty() {
            return String::new();
        }
        let head = implode_query(&["DELETE", &self.delete_mode.render()]);
        if self.delete.is_empty() && self.joins.is_empty() {
            implode_query(&[
                &head,
                &from,
                &self.fragment(Clause::Where),
                &self.fragment(Clause::OrderBy),
                &self.fragment(Clause::Limit),
                &self.fragment(Clause::Returning),
            ])
        } else {
            implode_query(&[
                &head,
                &self.fragment(Clause::Delete),
                &from,
                &self.fragment(Clause::Join),
                &self.fragment(Clause::Where),
                &self.fragment(Clause::Returning),
            ])
        }
    }

    fn insert_like(&self, keyword: &str) -> Option<String> {
        self.into.as_ref()?;
        let body = if !self.values.is_empty() {
            self.fragment(Clause::Values)
        } else if !self.set.is_empty() {
            self.fragment(Clause::Set)
        } else {
            self.fragment(Clause::SelectStatement)
        };
        Some(implode_query(&[
            keyword,
            &self.insert_mode.render(),
            &self.fragment(Clause::Into),
            &self.fragment(Clause::ColumnNames),
            &body,
            &self.fragment(Clause::Upsert),
            &self.fragment(Clause::Returning),
        ]))
    }

    /// Assemble the INSERT statement, or `""` without an INTO table.
    pub fn get_insert_query(&self) -> String {
        self.insert_like("INSERT").unwrap_or_default()
    }

    /// Assemble the REPLACE statement.
    ///
    /// Unlike INSERT, a missing INTO table is an error.
    pub fn get_replace_query(&self) -> FragResult<String> {
        self.insert_like("REPLACE")
            .ok_or_else(|| FragError::missing_table("No into() in replace query!"))
    }

    /// Assemble the UPDATE statement, or `""` without a target table.
    ///
    /// ORDER BY and LIMIT only apply to a single-table update without joins.
    pub fn get_update_query(&self) -> String {
        if self.update.is_empty() {
            return String::new();
        }
        let single_table = self.update.len() == 1 && self.joins.is_empty();
        let (order_by, limit) = if single_table {
            (self.fragment(Clause::OrderBy), self.fragment(Clause::Limit))
        } else {
            (String::new(), String::new())
        };
        implode_query(&[
            "UPDATE",
            &self.update_mode.render(),
            &self.fragment(Clause::Update),
            &self.fragment(Clause::Join),
            &self.fragment(Clause::Set),
            &self.fragment(Clause::Where),
            &order_by,
            &limit,
            &self.fragment(Clause::Returning),
        ])
    }
}

fn prefixed(keyword: &str, items: &[String], sep: &str) -> String {
    if items.is_empty() {
        String::new()
    } else {
        format!("{keyword} {}", items.join(sep))
    }
}
