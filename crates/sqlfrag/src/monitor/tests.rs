use super::*;
use std::sync::Mutex;
use std::time::Duration;

#[test]
fn test_query_type_detection() {
    assert_eq!(QueryType::from_sql("SELECT * FROM users"), QueryType::Select);
    assert_eq!(QueryType::from_sql("  select * FROM users"), QueryType::Select);
    assert_eq!(
        QueryType::from_sql("INSERT INTO users (name) VALUES ('a')"),
        QueryType::Insert
    );
    assert_eq!(
        QueryType::from_sql("REPLACE INTO users SET id = 1"),
        QueryType::Replace
    );
    assert_eq!(QueryType::from_sql("UPDATE users SET a = 1"), QueryType::Update);
    assert_eq!(
        QueryType::from_sql("DELETE FROM users WHERE id = 1"),
        QueryType::Delete
    );
    assert_eq!(
        QueryType::from_sql("CREATE TABLE users (id INT)"),
        QueryType::Other
    );
    assert_eq!(QueryType::from_sql("SELECTED"), QueryType::Other);
}

#[test]
fn query_type_skips_comments_and_parens() {
    assert_eq!(
        QueryType::from_sql("-- note\n/* x */ (SELECT a FROM t) UNION (SELECT a FROM u)"),
        QueryType::Select
    );
    assert_eq!(QueryType::from_sql("/* unterminated"), QueryType::Other);
}

#[test]
fn query_type_cte() {
    assert_eq!(
        QueryType::from_sql("WITH cte AS ( SELECT 1 ) SELECT * FROM cte"),
        QueryType::Select
    );
    assert_eq!(
        QueryType::from_sql("WITH cte AS (SELECT 1) INSERT INTO t SELECT * FROM cte"),
        QueryType::Insert
    );
    assert_eq!(
        QueryType::from_sql("WITH cte AS (SELECT ')') DELETE FROM t"),
        QueryType::Delete
    );
    assert_eq!(
        QueryType::from_sql(
            "WITH RECURSIVE n (v) AS ( SELECT 1 UNION ALL SELECT v + 1 FROM n ) SELECT v FROM n"
        ),
        QueryType::Select
    );
    assert_eq!(
        QueryType::from_sql("WITH x AS ( SELECT 1 ) (SELECT a FROM x) EXCEPT (SELECT 2)"),
        QueryType::Select
    );
}

#[test]
fn test_composite_hook_modify() {
    struct AddCommentHook;
    impl QueryHook for AddCommentHook {
        fn before_query(&self, ctx: &QueryContext) -> HookAction {
            HookAction::ModifySql {
                exec_sql: format!("/* instrumented */ {}", ctx.exec_sql),
                canonical_sql: None,
            }
        }
    }

    let hook = CompositeHook::new().add(AddCommentHook);
    let ctx = QueryContext::new("SELECT 1");

    match hook.before_query(&ctx) {
        HookAction::ModifySql {
            exec_sql,
            canonical_sql,
        } => {
            assert_eq!(exec_sql, "/* instrumented */ SELECT 1");
            assert!(canonical_sql.is_none());
        }
        other => panic!("Expected ModifySql, got {other:?}"),
    }
}

#[test]
fn composite_hook_chains_multiple_modifiers() {
    struct PrefixHook(&'static str);
    impl QueryHook for PrefixHook {
        fn before_query(&self, ctx: &QueryContext) -> HookAction {
            HookAction::ModifySql {
                exec_sql: format!("{}{}", self.0, ctx.exec_sql),
                canonical_sql: None,
            }
        }
    }

    let hook = CompositeHook::new()
        .add(PrefixHook("/* a */ "))
        .add(PrefixHook("/* b */ "));
    assert_eq!(hook.len(), 2);

    let ctx = QueryContext::new("SELECT 1");
    assert_eq!(
        hook.before_query(&ctx),
        HookAction::ModifySql {
            exec_sql: "/* b */ /* a */ SELECT 1".to_string(),
            canonical_sql: None,
        }
    );
}

#[test]
fn composite_hook_canonical_override_updates_type() {
    struct Rewrite;
    impl QueryHook for Rewrite {
        fn before_query(&self, _ctx: &QueryContext) -> HookAction {
            HookAction::ModifySql {
                exec_sql: "DELETE FROM t".to_string(),
                canonical_sql: Some("DELETE FROM t".to_string()),
            }
        }
    }
    struct BlockDelete;
    impl QueryHook for BlockDelete {
        fn before_query(&self, ctx: &QueryContext) -> HookAction {
            if ctx.query_type == QueryType::Delete {
                HookAction::Abort("DELETE not allowed".to_string())
            } else {
                HookAction::Continue
            }
        }
    }

    let hook = CompositeHook::new().add(Rewrite).add(BlockDelete);
    let ctx = QueryContext::new("SELECT 1");
    assert_eq!(
        hook.before_query(&ctx),
        HookAction::Abort("DELETE not allowed".to_string())
    );
}

#[test]
fn composite_hook_abort_stops_chain() {
    struct AbortHook;
    impl QueryHook for AbortHook {
        fn before_query(&self, _ctx: &QueryContext) -> HookAction {
            HookAction::Abort("blocked".to_string())
        }
    }
    struct PanicHook;
    impl QueryHook for PanicHook {
        fn before_query(&self, _ctx: &QueryContext) -> HookAction {
            panic!("should not be called");
        }
    }

    let hook = CompositeHook::new().add(AbortHook).add(PanicHook);
    let ctx = QueryContext::new("SELECT 1");
    assert_eq!(hook.before_query(&ctx), HookAction::Abort("blocked".to_string()));
}

#[test]
fn composite_hook_continue_only_returns_continue() {
    struct NoopHook;
    impl QueryHook for NoopHook {}

    let hook = CompositeHook::new().add(NoopHook).add(NoopHook);
    let ctx = QueryContext::new("SELECT 1");
    assert_eq!(hook.before_query(&ctx), HookAction::Continue);
}

#[test]
fn composite_hook_fans_out_after_query() {
    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);
    impl QueryHook for std::sync::Arc<Recorder> {
        fn after_query(&self, ctx: &QueryContext, _: Duration, result: &QueryResult) {
            self.0
                .lock()
                .unwrap()
                .push(format!("{} {result}", ctx.query_type));
        }
    }

    let recorder = std::sync::Arc::new(Recorder::default());
    let hook = CompositeHook::new()
        .add(recorder.clone())
        .add(recorder.clone());
    let ctx = QueryContext::new("UPDATE t SET a = 1").with_tag("bump");
    hook.after_query(&ctx, Duration::from_millis(1), &QueryResult::Affected(2));

    let seen = recorder.0.lock().unwrap();
    assert_eq!(*seen, vec!["update 2 affected", "update 2 affected"]);
}

#[test]
fn tracing_hook_truncation() {
    let hook = TracingSqlHook::new().max_sql_length(10);
    assert_eq!(hook.truncate_sql("SELECT * FROM users"), "SELECT * F...");
    assert_eq!(hook.truncate_sql("SELECT 1"), "SELECT 1");

    let hook = hook.no_truncate();
    assert_eq!(hook.truncate_sql("SELECT * FROM users"), "SELECT * FROM users");
}

#[test]
fn tracing_hook_never_rewrites() {
    let hook = TracingSqlHook::new().level(tracing::Level::INFO);
    let ctx = QueryContext::new("SELECT 1").with_field("route", "/users");
    assert_eq!(hook.before_query(&ctx), HookAction::Continue);
}

#[test]
fn truncation_respects_char_boundaries() {
    assert_eq!(truncate_sql_bytes("héllo", 2), "h");
    assert_eq!(truncate_sql_bytes("abc", 10), "abc");
}

#[test]
fn query_result_error_truncation() {
    assert_eq!(
        QueryResult::error("short error".to_string()),
        QueryResult::Error("short error".to_string())
    );

    match QueryResult::error("x".repeat(1000)) {
        QueryResult::Error(s) => {
            assert_eq!(s.len(), 515);
            assert!(s.ends_with("..."));
        }
        other => panic!("Expected Error, got {other:?}"),
    }
}

#[test]
fn query_result_display() {
    assert_eq!(QueryResult::Affected(3).to_string(), "3 affected");
    assert_eq!(QueryResult::Error("oops".to_string()).to_string(), "error: oops");
}
