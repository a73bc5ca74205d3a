use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// The kind of statement about to be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Replace,
    Update,
    Delete,
    /// DDL, SET, CALL, ...
    Other,
}

impl QueryType {
    /// Detect the statement kind from its text.
    ///
    /// Leading comments and parentheses are skipped, so a compound
    /// `(SELECT ...) UNION (SELECT ...)` is a select. For `WITH ...` the
    /// statement following the CTE definitions decides.
    pub fn from_sql(sql: &str) -> Self {
        let trimmed = strip_sql_prefix(sql);
        if starts_with_keyword(trimmed, "WITH") {
            return Self::detect_cte_dml(trimmed);
        }
        Self::from_keyword(trimmed).unwrap_or(QueryType::Other)
    }

    fn from_keyword(sql: &str) -> Option<Self> {
        [
            ("SELECT", QueryType::Select),
            ("INSERT", QueryType::Insert),
            ("REPLACE", QueryType::Replace),
            ("UPDATE", QueryType::Update),
            ("DELETE", QueryType::Delete),
        ]
        .into_iter()
        .find(|(kw, _)| starts_with_keyword(sql, kw))
        .map(|(_, ty)| ty)
    }

    /// Find the statement after the last top-level `)` of the definitions.
    fn detect_cte_dml(sql: &str) -> Self {
        let bytes = sql.as_bytes();
        let mut depth: i32 = 0;
        let mut last_top_level = 0;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        last_top_level = i + 1;
                    }
                }
                b'\'' => {
                    i += 1;
                    while i < bytes.len() {
                        if bytes[i] == b'\'' {
                            if bytes.get(i + 1) == Some(&b'\'') {
                                i += 1;
                            } else {
                                break;
                            }
                        }
                        i += 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        let remainder = strip_sql_prefix(&sql[last_top_level..]);
        Self::from_keyword(remainder).unwrap_or(QueryType::Select)
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryType::Select => "select",
            QueryType::Insert => "insert",
            QueryType::Replace => "replace",
            QueryType::Update => "update",
            QueryType::Delete => "delete",
            QueryType::Other => "other",
        };
        f.write_str(name)
    }
}

fn strip_sql_prefix(sql: &str) -> &str {
    let mut s = sql;
    loop {
        s = s.trim_start();
        if let Some(rest) = s.strip_prefix("--") {
            match rest.find('\n') {
                Some(pos) => s = &rest[pos + 1..],
                None => return "",
            }
        } else if let Some(rest) = s.strip_prefix("/*") {
            match rest.find("*/") {
                Some(pos) => s = &rest[pos + 2..],
                None => return "",
            }
        } else if let Some(rest) = s.strip_prefix('(') {
            s = rest;
        } else {
            return s;
        }
    }
}

fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    let Some(head) = s.get(..keyword.len()) else {
        return false;
    };
    head.eq_ignore_ascii_case(keyword)
        && s[keyword.len()..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
}

/// Context of one statement handed to hooks.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// SQL as assembled by the caller; used as the log and metrics key.
    pub canonical_sql: String,
    /// SQL actually sent to the driver, possibly rewritten by a hook.
    pub exec_sql: String,
    pub query_type: QueryType,
    /// Optional query name.
    pub tag: Option<String>,
    /// 1 for the first attempt, incremented on every retry.
    pub attempt: u32,
    /// Low-cardinality structured fields.
    pub fields: BTreeMap<String, String>,
}

impl QueryContext {
    pub fn new(sql: &str) -> Self {
        Self {
            canonical_sql: sql.to_string(),
            exec_sql: sql.to_string(),
            query_type: QueryType::from_sql(sql),
            tag: None,
            attempt: 1,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

const MAX_ERROR_LEN: usize = 512;

/// Outcome of one statement, as reported to [`QueryHook::after_query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Affected(u64),
    /// Driver error message, truncated to 512 bytes.
    Error(String),
}

impl QueryResult {
    pub fn error(msg: String) -> Self {
        if msg.len() > MAX_ERROR_LEN {
            Self::Error(format!("{}...", super::truncate_sql_bytes(&msg, MAX_ERROR_LEN)))
        } else {
            Self::Error(msg)
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Affected(n) => write!(f, "{n} affected"),
            QueryResult::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Action to take after a hook inspected a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAction {
    Continue,
    /// Execute different SQL.
    ModifySql {
        exec_sql: String,
        /// Optional override for the canonical SQL.
        canonical_sql: Option<String>,
    },
    /// Refuse to execute; surfaces as [`FragError::Aborted`](crate::FragError::Aborted).
    Abort(String),
}

/// Hook into statement execution.
///
/// Hooks can inspect, rewrite or abort statements before they reach the
/// driver, and observe the outcome afterwards.
pub trait QueryHook: Send + Sync {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let _ = ctx;
        HookAction::Continue
    }

    /// Called once per attempt, after the driver returned.
    fn after_query(&self, _ctx: &QueryContext, _duration: Duration, _result: &QueryResult) {}
}
