use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
    Replace,
}

impl FromStr for QueryKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "select" => Ok(Self::Select),
            "insert" => Ok(Self::Insert),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "replace" => Ok(Self::Replace),
            _ => anyhow::bail!("unknown query kind: {s}"),
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Replace => "replace",
        })
    }
}

/// A literal from the query file, placed into the SQL as text.
///
/// Strings are taken verbatim, so `"'abc'"` and `"NOW()"` both work.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Literal {
    pub fn to_sql(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(true) => "TRUE".to_string(),
            Self::Bool(false) => "FALSE".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WithEntry {
    pub alias: String,
    pub body: String,
    #[serde(default)]
    pub columns: Vec<String>,
    pub recursive: Option<String>,
    #[serde(default = "default_set_operator")]
    pub set_operator: String,
}

fn default_set_operator() -> String {
    "UNION ALL".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FromEntry {
    Name(String),
    Table {
        table: String,
        #[serde(default)]
        hints: Vec<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinEntry {
    pub table: String,
    #[serde(default, rename = "type")]
    pub join_type: String,
    #[serde(default)]
    pub hints: Vec<String>,
    /// `[[left, right], ...]` equality pairs.
    #[serde(default)]
    pub on: Vec<(String, String)>,
    #[serde(default)]
    pub using: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionEntry {
    pub left: String,
    #[serde(default = "default_operator")]
    pub op: String,
    pub right: Literal,
    /// Join to the previous condition with OR instead of AND.
    #[serde(default)]
    pub or: bool,
}

fn default_operator() -> String {
    "=".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderEntry {
    Column(String),
    Spec {
        column: String,
        #[serde(default)]
        desc: bool,
    },
}

/// A statement described in TOML.
///
/// ```toml
/// kind = "select"
/// select = ["u.id", "r.name"]
/// from = ["users u"]
///
/// [[join]]
/// table = "roles r"
/// type = "left"
/// on = [["u.role_id", "r.id"]]
///
/// [[where]]
/// left = "u.active"
/// right = 1
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryFile {
    pub kind: Option<QueryKind>,
    #[serde(default)]
    pub with: Vec<WithEntry>,
    #[serde(default)]
    pub select: Vec<String>,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub from: Vec<FromEntry>,
    #[serde(default)]
    pub join: Vec<JoinEntry>,
    #[serde(default, rename = "where")]
    pub where_: Vec<ConditionEntry>,
    #[serde(default)]
    pub having: Vec<ConditionEntry>,
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub order_by: Vec<OrderEntry>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub union: Option<String>,
    pub union_all: Option<String>,
    pub into: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<Literal>>,
    #[serde(default)]
    pub set: BTreeMap<String, Literal>,
    #[serde(default)]
    pub update: Vec<String>,
    #[serde(default)]
    pub delete: Vec<String>,
    pub on_conflict: Option<String>,
    pub on_conflict_action: Option<String>,
    #[serde(default)]
    pub returning: Vec<String>,
}

impl QueryFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read query file {}: {e}", path.display()))?;
        Self::parse(&raw)
            .map_err(|e| anyhow::anyhow!("invalid query file {}: {e:#}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let file: QueryFile = toml::from_str(raw)?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.union.is_some() && self.union_all.is_some() {
            anyhow::bail!("`union` and `union_all` cannot both be set");
        }
        if self.offset.is_some() && self.limit.is_none() {
            anyhow::bail!("`offset` requires `limit`");
        }
        if self.on_conflict_action.is_some() && self.on_conflict.is_none() {
            anyhow::bail!("`on_conflict_action` requires `on_conflict`");
        }
        if !self.select.is_empty() && !self.returning.is_empty() {
            anyhow::bail!("`select` and `returning` cannot both be set");
        }
        for (i, row) in self.values.iter().enumerate() {
            if !self.columns.is_empty() && row.len() != self.columns.len() {
                anyhow::bail!(
                    "values row {i} has {} members but {} columns are named",
                    row.len(),
                    self.columns.len()
                );
            }
        }
        for join in &self.join {
            if !join.on.is_empty() && !join.using.is_empty() {
                anyhow::bail!("join `{}` cannot have both `on` and `using`", join.table);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_select() {
        let file = QueryFile::parse(
            r#"
kind = "select"
select = ["u.id", "r.name"]
distinct = true
from = ["users u", { table = "logins l", hints = ["USE INDEX (ix_user)"] }]
group_by = ["u.id"]
order_by = ["u.id", { column = "r.name", desc = true }]
limit = 10
offset = 20

[[join]]
table = "roles r"
type = "left"
on = [["u.role_id", "r.id"]]

[[where]]
left = "u.active"
right = 1

[[where]]
left = "u.name"
op = "LIKE"
right = "'a%'"
or = true
"#,
        )
        .unwrap();

        assert_eq!(file.kind, Some(QueryKind::Select));
        assert!(file.distinct);
        assert_eq!(file.from.len(), 2);
        assert!(matches!(&file.from[1], FromEntry::Table { hints, .. } if hints.len() == 1));
        assert_eq!(file.join[0].on, vec![("u.role_id".to_string(), "r.id".to_string())]);
        assert_eq!(file.where_[0].op, "=");
        assert_eq!(file.where_[0].right, Literal::Int(1));
        assert!(file.where_[1].or);
        assert!(matches!(&file.order_by[1], OrderEntry::Spec { desc: true, .. }));
    }

    #[test]
    fn literals_render_as_sql_text() {
        assert_eq!(Literal::Text("NOW()".into()).to_sql(), "NOW()");
        assert_eq!(Literal::Int(-3).to_sql(), "-3");
        assert_eq!(Literal::Float(1.5).to_sql(), "1.5");
        assert_eq!(Literal::Bool(true).to_sql(), "TRUE");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(QueryFile::parse("selekt = [\"a\"]").is_err());
    }

    #[test]
    fn validation_errors() {
        let err = QueryFile::parse("offset = 5").unwrap_err();
        assert_eq!(err.to_string(), "`offset` requires `limit`");

        let err = QueryFile::parse("union = \"SELECT 1\"\nunion_all = \"SELECT 2\"").unwrap_err();
        assert!(err.to_string().contains("cannot both be set"));

        let err =
            QueryFile::parse("columns = [\"a\", \"b\"]\nvalues = [[1]]").unwrap_err();
        assert_eq!(
            err.to_string(),
            "values row 0 has 1 members but 2 columns are named"
        );
    }

    #[test]
    fn query_kind_from_str() {
        assert_eq!("UPDATE".parse::<QueryKind>().unwrap(), QueryKind::Update);
        assert!("merge".parse::<QueryKind>().is_err());
        assert_eq!(QueryKind::default(), QueryKind::Select);
    }
}
