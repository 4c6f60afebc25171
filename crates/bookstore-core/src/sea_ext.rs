//! sea-orm helpers: case-insensitive substring matching and write-error classification.

use sea_orm::{
    DbErr, RuntimeErr, SqlErr,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};

const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Escape `%`, `_` and `\` so user input matches literally inside a LIKE pattern.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `LOWER(expr) LIKE '%term%'` with the term lower-cased and escaped.
pub fn contains_ci<E>(expr: E, term: &str) -> SimpleExpr
where
    E: Into<SimpleExpr>,
{
    let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
    Expr::expr(Func::lower(expr.into())).like(LikeExpr::new(pattern).escape('\\'))
}

/// A storage constraint a write ran into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// Unique index violated; carries the database message, which names the index.
    Unique(String),
    /// Referenced row missing.
    ForeignKey(String),
    /// Value wider than its column, or a number beyond the column's precision.
    OutOfRange(String),
}

impl ConstraintViolation {
    pub fn message(&self) -> &str {
        match self {
            Self::Unique(m) | Self::ForeignKey(m) | Self::OutOfRange(m) => m,
        }
    }

    /// True when the database message mentions `constraint`.
    pub fn names(&self, constraint: &str) -> bool {
        self.message().contains(constraint)
    }
}

pub fn constraint_violation(err: &DbErr) -> Option<ConstraintViolation> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => {
            return Some(ConstraintViolation::Unique(msg));
        }
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
            return Some(ConstraintViolation::ForeignKey(msg));
        }
        _ => {}
    }
    let db_err = match err {
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => {
            e.as_database_error()?
        }
        _ => return None,
    };
    match db_err.code().as_deref() {
        Some(STRING_DATA_RIGHT_TRUNCATION | NUMERIC_VALUE_OUT_OF_RANGE) => {
            Some(ConstraintViolation::OutOfRange(db_err.message().to_owned()))
        }
        _ => None,
    }
}
