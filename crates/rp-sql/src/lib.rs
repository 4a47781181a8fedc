//! rp-sql: relational plan to Presto SQL
//!
//! [`RelToPrestoConverter`] walks a [`rp_plan::RelNode`] tree bottom-up,
//! translating each operator into a partially built query, merging
//! operators into one SELECT where the clause order allows and wrapping
//! the rest as derived tables. Function and operator differences between
//! the planner's vocabulary and Presto are resolved through a static
//! operator table.

pub mod alias;
pub mod config;
pub mod converter;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod fragment;
pub mod ident;
pub mod scope;
pub(crate) mod translator;

pub use config::ConverterConfig;
pub use converter::RelToPrestoConverter;
pub use dialect::{presto_operators, OperatorTable, PrestoSyntax, SqlSyntax};
pub use error::{ConvertError, ConvertResult};
pub use ident::IdentifierPolicy;
