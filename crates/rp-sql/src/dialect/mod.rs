//! Target dialect: operator table and output grammar

pub mod operators;
pub mod presto;
pub mod syntax;

pub use operators::{precedence, Arity, Lookup, OperatorEntry, OperatorTable, Piece, RenderRule, Template};
pub use presto::presto_operators;
pub use syntax::{PrestoSyntax, SqlSyntax};
