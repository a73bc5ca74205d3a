use crate::cli::{EscapeArgs, EscapeKind};
use sqlfrag::{BacktickEscaper, DoubleQuoteEscaper, IdentifierEscaper, QueryEscaper, Value};

pub fn run(args: &EscapeArgs) -> String {
    if args.ansi {
        escape_with(&QueryEscaper::new(DoubleQuoteEscaper), args)
    } else {
        escape_with(&QueryEscaper::new(BacktickEscaper), args)
    }
}

fn escape_with<E: IdentifierEscaper>(e: &QueryEscaper<E>, args: &EscapeArgs) -> String {
    let value = args.value.as_str();
    let alias = args.alias.as_deref().unwrap_or("");
    match args.kind {
        EscapeKind::Column if args.alias.is_some() => e.result_column(value, alias),
        EscapeKind::Column => e.column(value, args.collation.as_deref().unwrap_or("")),
        EscapeKind::Table => e.table(value, alias),
        EscapeKind::Int => e.intvalue(&Value::from(value)).to_string(),
        EscapeKind::Float => e.floatvalue(&Value::from(value)).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(kind: EscapeKind, value: &str) -> EscapeArgs {
        EscapeArgs {
            kind,
            value: value.to_string(),
            alias: None,
            collation: None,
            ansi: false,
        }
    }

    #[test]
    fn identifiers() {
        assert_eq!(run(&args(EscapeKind::Column, "t.*")), "`t`.*");

        let mut a = args(EscapeKind::Column, "u.id");
        a.alias = Some("uid".to_string());
        assert_eq!(run(&a), "`u`.`id` AS `uid`");

        let mut a = args(EscapeKind::Table, "shop.orders");
        a.ansi = true;
        assert_eq!(run(&a), r#""shop"."orders""#);
    }

    #[test]
    fn collation() {
        let mut a = args(EscapeKind::Column, "name");
        a.collation = Some("utf8mb4_bin".to_string());
        assert_eq!(run(&a), "`name` COLLATE utf8mb4_bin");
    }

    #[test]
    fn numbers_use_loose_coercion() {
        assert_eq!(run(&args(EscapeKind::Int, "1e10")), "1");
        assert_eq!(run(&args(EscapeKind::Int, "abc")), "0");
        assert_eq!(run(&args(EscapeKind::Float, "1e3")), "1000");
        assert_eq!(run(&args(EscapeKind::Float, "2.5kg")), "2.5");
    }
}
