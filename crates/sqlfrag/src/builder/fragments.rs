//! Typed clause nodes held by [`DmlFragments`](super::DmlFragments).
//!
//! Nodes are rendered to text only when a statement is assembled.

/// Logical operator splicing a new predicate onto an existing condition list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    pub fn to_sql(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Which list `sql_select` appends to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectTarget {
    #[default]
    Select,
    Returning,
}

/// The clause a condition or group marker is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKeyword {
    Where,
    Having,
    On,
}

impl ConditionKeyword {
    pub fn to_sql(self) -> &'static str {
        match self {
            ConditionKeyword::Where => "WHERE",
            ConditionKeyword::Having => "HAVING",
            ConditionKeyword::On => "ON",
        }
    }
}

/// Ordered keyword modifiers (`DISTINCT`, `IGNORE`, ...) for one statement type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeList {
    modes: Vec<String>,
}

impl ModeList {
    pub fn push(&mut self, mode: &str) {
        let mode = mode.trim();
        if !mode.is_empty() {
            self.modes.push(mode.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Space-joined modes; later duplicates are dropped.
    pub fn render(&self) -> String {
        let mut seen: Vec<&str> = Vec::with_capacity(self.modes.len());
        for mode in &self.modes {
            if !seen.contains(&mode.as_str()) {
                seen.push(mode.as_str());
            }
        }
        seen.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CondToken {
    Open { connector: Option<Connector> },
    Close,
    Predicate {
        connector: Option<Connector>,
        text: String,
    },
}

/// A WHERE / HAVING / ON predicate sequence with explicit grouping.
///
/// The connector of each token is fixed when it is pushed: the first token
/// and any token directly after an open paren get none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionList {
    tokens: Vec<CondToken>,
}

impl ConditionList {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True when the last token is an unclosed `(`.
    pub fn is_after_open(&self) -> bool {
        matches!(self.tokens.last(), Some(CondToken::Open { .. }))
    }

    fn lead(&self, connector: Connector) -> Option<Connector> {
        if self.tokens.is_empty() || self.is_after_open() {
            None
        } else {
            Some(connector)
        }
    }

    pub fn push_predicate(&mut self, text: String, connector: Connector) {
        let connector = self.lead(connector);
        self.tokens.push(CondToken::Predicate { connector, text });
    }

    pub fn open_group(&mut self, connector: Connector) {
        let connector = self.lead(connector);
        self.tokens.push(CondToken::Open { connector });
    }

    pub fn close_group(&mut self) {
        self.tokens.push(CondToken::Close);
    }

    /// `KEYWORD body`, or an empty string when there is nothing to render.
    pub fn render(&self, keyword: &str) -> String {
        if self.tokens.is_empty() {
            return String::new();
        }
        let mut out = String::from(keyword);
        out.push(' ');
        for token in &self.tokens {
            match token {
                CondToken::Open { connector } => {
                    if let Some(c) = connector {
                        out.push(' ');
                        out.push_str(c.to_sql());
                        out.push(' ');
                    }
                    out.push('(');
                }
                CondToken::Close => out.push(')'),
                CondToken::Predicate { connector, text } => {
                    if let Some(c) = connector {
                        out.push(' ');
                        out.push_str(c.to_sql());
                        out.push(' ');
                    }
                    out.push_str(text);
                }
            }
        }
        out
    }
}

/// A table reference with optional index hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub table: String,
    /// `None` hints render as empty tokens.
    pub hints: Vec<Option<String>>,
}

impl TableRef {
    pub fn new(table: &str, hints: &[Option<&str>]) -> Self {
        Self {
            table: table.to_string(),
            hints: hints.iter().map(|h| h.map(str::to_string)).collect(),
        }
    }

    pub fn render(&self) -> String {
        if self.hints.is_empty() {
            return self.table.clone();
        }
        let hints: Vec<&str> = self
            .hints
            .iter()
            .map(|h| h.as_deref().unwrap_or(""))
            .collect();
        format!("{} {}", self.table, hints.join(", "))
    }
}

/// One common table expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CteDefinition {
    pub alias: String,
    pub columns: Vec<String>,
    pub body: String,
    /// `(set_operator, recursive_query)` for recursive definitions.
    pub recursive: Option<(String, String)>,
}

impl CteDefinition {
    pub fn render(&self) -> String {
        let mut out = self.alias.clone();
        if !self.columns.is_empty() {
            out.push_str(" (");
            out.push_str(&self.columns.join(", "));
            out.push(')');
        }
        out.push_str(" AS ( ");
        out.push_str(&self.body);
        if let Some((set_op, recursive)) = &self.recursive {
            out.push(' ');
            out.push_str(set_op);
            out.push(' ');
            out.push_str(recursive);
        }
        out.push_str(" )");
        out
    }
}

/// A set operation applied to the primary SELECT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    pub operator: String,
    pub query: String,
}

impl Compound {
    pub fn render(&self) -> String {
        format!("{} ({})", self.operator, self.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_list_dedupes_keeping_first() {
        let mut modes = ModeList::default();
        modes.push("DISTINCT");
        modes.push("SQL_NO_CACHE");
        modes.push("DISTINCT");
        modes.push("  ");
        assert_eq!(modes.render(), "DISTINCT SQL_NO_CACHE");
    }

    #[test]
    fn condition_list_grouping() {
        let mut c = ConditionList::default();
        c.push_predicate("a = 1".into(), Connector::And);
        c.open_group(Connector::And);
        c.push_predicate("b = 2".into(), Connector::Or);
        c.push_predicate("c = 3".into(), Connector::Or);
        c.close_group();
        assert_eq!(c.render("WHERE"), "WHERE a = 1 AND (b = 2 OR c = 3)");
    }

    #[test]
    fn condition_list_leading_group() {
        let mut c = ConditionList::default();
        c.open_group(Connector::Or);
        c.open_group(Connector::Or);
        c.push_predicate("x".into(), Connector::Or);
        c.close_group();
        c.close_group();
        assert_eq!(c.render("HAVING"), "HAVING ((x))");
    }

    #[test]
    fn empty_condition_list_renders_nothing() {
        assert_eq!(ConditionList::default().render("WHERE"), "");
    }

    #[test]
    fn table_ref_hints() {
        assert_eq!(TableRef::new("t", &[]).render(), "t");
        assert_eq!(
            TableRef::new("t", &[Some("USE INDEX (a)"), None]).render(),
            "t USE INDEX (a), "
        );
    }

    #[test]
    fn cte_definition_forms() {
        let plain = CteDefinition {
            alias: "x".into(),
            columns: vec![],
            body: "SELECT 1".into(),
            recursive: None,
        };
        assert_eq!(plain.render(), "x AS ( SELECT 1 )");

        let recursive = CteDefinition {
            alias: "n".into(),
            columns: vec!["v".into()],
            body: "SELECT 1".into(),
            recursive: Some(("UNION ALL".into(), "SELECT v + 1 FROM n".into())),
        };
        assert_eq!(
            recursive.render(),
            "n (v) AS ( SELECT 1 UNION ALL SELECT v + 1 FROM n )"
        );
    }
}
