use sea_orm::{DbBackend, QuerySelect};
use sea_orm::sea_query::{BinOper, Expr, Func, LikeExpr, SimpleExpr};

/// Largest row count SQLite accepts as a `LIMIT`.
pub const UNBOUNDED_LIMIT: u64 = i64::MAX as u64;

/// Apply `OFFSET` and `LIMIT` to `query`.
///
/// SQLite only parses `OFFSET` after a `LIMIT`, so a skip without a take is paired
/// with [`UNBOUNDED_LIMIT`].
pub fn page<Q: QuerySelect>(mut query: Q, skip: u64, take: Option<u64>) -> Q {
    match take {
        Some(take) => query = query.limit(take),
        None if skip > 0 => query = query.limit(UNBOUNDED_LIMIT),
        None => {}
    }
    if skip > 0 {
        query = query.offset(skip);
    }
    query
}

/// Position of a needle inside a text column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    Contains,
    StartsWith,
    EndsWith,
}

impl TextMatch {
    fn wrap(self, escaped: &str, any: char) -> String {
        match self {
            Self::Contains => format!("{any}{escaped}{any}"),
            Self::StartsWith => format!("{escaped}{any}"),
            Self::EndsWith => format!("{any}{escaped}"),
        }
    }
}

/// Escape `%`, `_` and the escape character itself for a `LIKE … ESCAPE '\'` pattern.
pub fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape the SQLite `GLOB` metacharacters by wrapping them in a character class.
pub fn escape_glob(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        match c {
            '*' | '?' | '[' => {
                out.push('[');
                out.push(c);
                out.push(']');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Lowercase `needle` the way the backend's `LOWER()` lowercases the column.
///
/// SQLite's built-in `LOWER()` folds ASCII letters only, so the needle is folded the
/// same way there. Other backends fold the full Unicode range.
fn fold_case(needle: &str, backend: DbBackend) -> String {
    match backend {
        DbBackend::Sqlite => needle.to_ascii_lowercase(),
        _ => needle.to_lowercase(),
    }
}

/// Build a text predicate on `column`.
///
/// Case-insensitive matching lowercases both sides and uses `LIKE`. Case-sensitive
/// matching uses `LIKE` except on SQLite, whose `LIKE` ignores ASCII case; there `GLOB`
/// is used instead. On SQLite only ASCII letters compare case-insensitively.
pub fn text_match(
    column: SimpleExpr,
    kind: TextMatch,
    needle: &str,
    insensitive: bool,
    backend: DbBackend,
) -> SimpleExpr {
    if insensitive {
        let pattern = kind.wrap(&escape_like(&fold_case(needle, backend)), '%');
        return Expr::expr(Func::lower(column)).like(LikeExpr::new(pattern).escape('\\'));
    }
    match backend {
        DbBackend::Sqlite => {
            let pattern = kind.wrap(&escape_glob(needle), '*');
            Expr::expr(column).binary(BinOper::Custom("GLOB"), Expr::val(pattern))
        }
        _ => {
            let pattern = kind.wrap(&escape_like(needle), '%');
            Expr::expr(column).like(LikeExpr::new(pattern).escape('\\'))
        }
    }
}
