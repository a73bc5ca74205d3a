use super::types::{HookAction, QueryContext, QueryHook, QueryResult, QueryType};
use std::sync::Arc;
use std::time::Duration;

/// Runs several hooks in order.
///
/// A rewrite by one hook is visible to the next; the first abort stops the
/// chain.
#[derive(Clone, Default)]
pub struct CompositeHook {
    hooks: Vec<Arc<dyn QueryHook>>,
}

impl CompositeHook {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn add_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }
}

impl std::fmt::Debug for CompositeHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeHook")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl QueryHook for CompositeHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let mut current = ctx.clone();
        for hook in &self.hooks {
            match hook.before_query(&current) {
                HookAction::Continue => {}
                HookAction::ModifySql {
                    exec_sql,
                    canonical_sql,
                } => {
                    current.exec_sql = exec_sql;
                    if let Some(canonical_sql) = canonical_sql {
                        current.canonical_sql = canonical_sql;
                    }
                    current.query_type = QueryType::from_sql(&current.canonical_sql);
                }
                action @ HookAction::Abort(_) => return action,
            }
        }
        if current.exec_sql != ctx.exec_sql || current.canonical_sql != ctx.canonical_sql {
            HookAction::ModifySql {
                exec_sql: current.exec_sql,
                canonical_sql: (current.canonical_sql != ctx.canonical_sql)
                    .then_some(current.canonical_sql),
            }
        } else {
            HookAction::Continue
        }
    }

    fn after_query(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        for hook in &self.hooks {
            hook.after_query(ctx, duration, result);
        }
    }
}
