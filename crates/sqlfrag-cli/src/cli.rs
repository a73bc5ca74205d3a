use crate::config::QueryKind;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Render,
    Escape,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Render(RenderArgs),
    Escape(EscapeArgs),
}

#[derive(Debug, Clone)]
pub struct RenderArgs {
    pub file: PathBuf,
    /// Overrides the `kind` key of the query file.
    pub kind: Option<QueryKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeKind {
    Column,
    Table,
    Int,
    Float,
}

#[derive(Debug, Clone)]
pub struct EscapeArgs {
    pub kind: EscapeKind,
    pub value: String,
    pub alias: Option<String>,
    pub collation: Option<String>,
    /// Quote identifiers with `"` instead of back-ticks.
    pub ansi: bool,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" => Ok(Command::Help(HelpTopic::Root)),
        "render" => parse_render(it.map(|s| s.as_str())),
        "escape" => parse_escape(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

fn parse_render<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut file: Option<PathBuf> = None;
    let mut kind: Option<QueryKind> = None;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Render)),
            "--kind" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--kind requires a value");
                };
                kind = Some(v.parse()?);
            }
            _ if token.starts_with("--kind=") => {
                kind = Some(token.trim_start_matches("--kind=").parse()?);
            }
            _ if token.starts_with('-') => anyhow::bail!("unknown option: {token}"),
            _ => {
                if file.is_some() {
                    anyhow::bail!("unexpected argument: {token}");
                }
                file = Some(PathBuf::from(token));
            }
        }
    }

    let Some(file) = file else {
        anyhow::bail!("missing query file (see `sqlfrag render --help`)");
    };
    Ok(Command::Render(RenderArgs { file, kind }))
}

fn parse_escape<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut kind: Option<EscapeKind> = None;
    let mut value: Option<String> = None;
    let mut alias: Option<String> = None;
    let mut collation: Option<String> = None;
    let mut ansi = false;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Escape)),
            "--alias" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--alias requires a value");
                };
                alias = Some(v.to_string());
            }
            "--collation" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--collation requires a value");
                };
                collation = Some(v.to_string());
            }
            "--ansi" => ansi = true,
            "column" | "table" | "int" | "float" if kind.is_none() => {
                kind = Some(match token {
                    "column" => EscapeKind::Column,
                    "table" => EscapeKind::Table,
                    "int" => EscapeKind::Int,
                    _ => EscapeKind::Float,
                });
            }
            _ if kind.is_none() => anyhow::bail!("unknown escape kind: {token}"),
            _ if value.is_none() => value = Some(token.to_string()),
            _ => anyhow::bail!("unexpected argument: {token}"),
        }
    }

    let Some(kind) = kind else {
        anyhow::bail!("missing escape kind (column, table, int or float)");
    };
    let Some(value) = value else {
        anyhow::bail!("missing value to escape");
    };
    if collation.is_some() && kind != EscapeKind::Column {
        anyhow::bail!("--collation only applies to `escape column`");
    }
    if alias.is_some() && !matches!(kind, EscapeKind::Column | EscapeKind::Table) {
        anyhow::bail!("--alias only applies to `escape column` and `escape table`");
    }
    if collation.is_some() && alias.is_some() {
        anyhow::bail!("--alias and --collation cannot be combined");
    }

    Ok(Command::Escape(EscapeArgs {
        kind,
        value,
        alias,
        collation,
        ansi,
    }))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
sqlfrag - render DML statements from TOML query descriptions

USAGE:
  sqlfrag <COMMAND> [OPTIONS]

COMMANDS:
  render        Assemble the statement described by a query file
  escape        Escape a single identifier or value

Run `sqlfrag <command> --help` for more."
            );
        }
        HelpTopic::Render => {
            println!(
                "\
USAGE:
  sqlfrag render <FILE> [OPTIONS]

OPTIONS:
  --kind <KIND>         select, insert, update, delete or replace
                        (default: the file's `kind` key, else select)
  -h, --help            Print help"
            );
        }
        HelpTopic::Escape => {
            println!(
                "\
USAGE:
  sqlfrag escape <column|table|int|float> <VALUE> [OPTIONS]

OPTIONS:
  --alias <NAME>        Alias for a column or table
  --collation <NAME>    COLLATE clause for a column
  --ansi                Quote identifiers with \" instead of back-ticks
  -h, --help            Print help"
            );
        }
    }
}
