use crate::cli::RenderArgs;
use crate::config::{ConditionEntry, FromEntry, OrderEntry, QueryFile, QueryKind};
use anyhow::Context;
use sqlfrag::DmlQueryBuilder;

pub fn run(args: &RenderArgs) -> anyhow::Result<String> {
    let file = QueryFile::load(&args.file)?;
    let kind = args.kind.or(file.kind).unwrap_or_default();
    render(&file, kind)
}

/// Assemble `kind` from the replayed query file.
pub fn render(file: &QueryFile, kind: QueryKind) -> anyhow::Result<String> {
    let q = build(file);
    let sql = match kind {
        QueryKind::Select => q.get_select_query(),
        QueryKind::Insert => q.get_insert_query(),
        QueryKind::Update => q.get_update_query(),
        QueryKind::Delete => q.get_delete_query(),
        QueryKind::Replace => q
            .get_replace_query()
            .context("failed to assemble replace statement")?,
    };
    if sql.is_empty() {
        anyhow::bail!("query file does not describe a complete {kind} statement");
    }
    Ok(sql)
}

/// Replay every key of the query file through the fluent builder.
pub fn build(file: &QueryFile) -> DmlQueryBuilder {
    let mut q = DmlQueryBuilder::new();

    for cte in &file.with {
        let columns: Vec<&str> = cte.columns.iter().map(String::as_str).collect();
        match &cte.recursive {
            Some(recursive) => {
                q.with_recursive(&cte.alias, &cte.body, recursive, &cte.set_operator, &columns)
            }
            None => q.with(&cte.alias, &cte.body, &columns),
        };
    }

    if file.distinct {
        q.distinct();
    }
    q.select(&file.select);

    for from in &file.from {
        match from {
            FromEntry::Name(table) => q.from(table),
            FromEntry::Table { table, hints } => {
                let hints: Vec<Option<&str>> = hints.iter().map(|h| Some(h.as_str())).collect();
                q.from_with_hints(table, &hints)
            }
        };
    }

    for join in &file.join {
        let hints: Vec<Option<&str>> = join.hints.iter().map(|h| Some(h.as_str())).collect();
        q.join_with_hints(&join.table, &join.join_type, &hints);
        q.sql_and();
        for (left, right) in &join.on {
            q.on(left, right);
        }
        for column in &join.using {
            q.using(column);
        }
    }

    replay_conditions(&mut q, &file.where_, DmlQueryBuilder::where_op);
    for column in &file.group_by {
        q.group_by(column);
    }
    replay_conditions(&mut q, &file.having, DmlQueryBuilder::having_op);

    for order in &file.order_by {
        match order {
            OrderEntry::Column(column) => q.order_by(column, true),
            OrderEntry::Spec { column, desc } => q.order_by(column, !desc),
        };
    }
    if let Some(limit) = file.limit {
        q.limit(limit, file.offset);
    }

    if let Some(query) = &file.union {
        q.union(query, false);
    }
    if let Some(query) = &file.union_all {
        q.union(query, true);
    }

    for table in &file.update {
        q.update(table);
    }
    for table in &file.delete {
        q.delete(table);
    }

    if let Some(table) = &file.into {
        q.into_table(table);
    }
    if !file.columns.is_empty() {
        let columns: Vec<&str> = file.columns.iter().map(String::as_str).collect();
        q.column_names(&columns);
    }
    q.values(
        file.values
            .iter()
            .map(|row| row.iter().map(|v| Some(v.to_sql()))),
    );
    if !file.set.is_empty() {
        q.set(file.set.iter().map(|(k, v)| (k, Some(v.to_sql()))));
    }
    if let Some(target) = &file.on_conflict {
        let action = file.on_conflict_action.as_deref().unwrap_or("DO NOTHING");
        q.on_conflict(target, action);
    }

    q.returning(&file.returning);
    q
}

fn replay_conditions(
    q: &mut DmlQueryBuilder,
    conditions: &[ConditionEntry],
    add: for<'a> fn(&'a mut DmlQueryBuilder, &str, &str, &str) -> &'a mut DmlQueryBuilder,
) {
    for cond in conditions {
        if cond.or {
            q.sql_or();
        } else {
            q.sql_and();
        }
        add(q, &cond.left, &cond.op, &cond.right.to_sql());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_str(raw: &str) -> anyhow::Result<String> {
        let file = QueryFile::parse(raw)?;
        render(&file, file.kind.unwrap_or_default())
    }

    #[test]
    fn select_with_join_and_conditions() {
        let sql = render_str(
            r#"
select = ["u.id", "r.name"]
from = ["users u"]
order_by = [{ column = "u.id", desc = true }]
limit = 10

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
        assert_eq!(
            sql,
            "SELECT u.id, r.name FROM users u LEFT JOIN roles r ON u.role_id = r.id \
             WHERE u.active = 1 OR u.name LIKE 'a%' ORDER BY u.id DESC LIMIT 10"
        );
    }

    #[test]
    fn or_flag_does_not_leak_into_later_conditions() {
        let sql = render_str(
            r#"
select = ["*"]
from = ["t"]
where = [
  { left = "a", right = 1 },
  { left = "b", right = 2, or = true },
  { left = "c", right = 3 },
]
"#,
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = 1 OR b = 2 AND c = 3");
    }

    #[test]
    fn with_and_union() {
        let sql = render_str(
            r#"
select = ["*"]
from = ["alias"]
union_all = "SELECT * FROM other"

[[with]]
alias = "alias"
body = "q"
"#,
        )
        .unwrap();
        assert_eq!(
            sql,
            "WITH alias AS ( q ) (SELECT * FROM alias) UNION ALL (SELECT * FROM other)"
        );
    }

    #[test]
    fn recursive_cte() {
        let sql = render_str(
            r#"
select = ["n"]
from = ["seq"]

[[with]]
alias = "seq"
columns = ["n"]
body = "SELECT 1"
recursive = "SELECT n + 1 FROM seq WHERE n < 3"
"#,
        )
        .unwrap();
        assert_eq!(
            sql,
            "WITH RECURSIVE seq (n) AS ( SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < 3 ) \
             SELECT n FROM seq"
        );
    }

    #[test]
    fn insert_with_upsert() {
        let sql = render_str(
            r#"
kind = "insert"
into = "users"
columns = ["id", "name"]
values = [[1, "'ann'"], [2, "NULL"]]
on_conflict = "(id)"
returning = ["id"]
"#,
        )
        .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO users (id, name) VALUES (1, 'ann'), (2, NULL) \
             ON CONFLICT (id) DO NOTHING RETURNING id"
        );
    }

    #[test]
    fn update_and_delete() {
        let sql = render_str(
            r#"
kind = "update"
update = ["t"]
where = [{ left = "id", right = 7 }]

[set]
a = 1
b = "NOW()"
"#,
        )
        .unwrap();
        assert_eq!(sql, "UPDATE t SET a = 1, b = NOW() WHERE id = 7");

        let sql = render_str(
            r#"
kind = "delete"
from = ["t"]
order_by = ["id"]
limit = 5
"#,
        )
        .unwrap();
        assert_eq!(sql, "DELETE FROM t ORDER BY id ASC LIMIT 5");
    }

    #[test]
    fn kind_override_and_incomplete_statements() {
        let file = QueryFile::parse("from = [\"t\"]\nwhere = [{ left = \"a\", right = 1 }]").unwrap();
        assert_eq!(
            render(&file, QueryKind::Delete).unwrap(),
            "DELETE FROM t WHERE a = 1"
        );

        let err = render(&file, QueryKind::Select).unwrap_err();
        assert_eq!(
            err.to_string(),
            "query file does not describe a complete select statement"
        );

        let err = render(&file, QueryKind::Replace).unwrap_err();
        assert_eq!(
            format!("{err:#}"),
            "failed to assemble replace statement: Missing table reference: No into() in replace query!"
        );
    }
}
