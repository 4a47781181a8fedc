//! rp-plan: dialect-neutral relational plan model
//!
//! An immutable tree of relational operators whose expressions are typed
//! scalar trees. Produced by an upstream planner, consumed read-only by the
//! SQL converter in `rp-sql`.

pub mod error;
pub mod expr;
pub mod loader;
pub mod rel;
pub mod row_type;
pub mod types;

pub use error::{PlanError, PlanResult};
pub use expr::{CorrelationId, LiteralValue, ScalarExpr};
pub use loader::{load_plan, plan_from_json, plan_to_json};
pub use rel::{
    AggregateCall, Direction, JoinType, NullOrdering, ProjectItem, RelNode, SetOpKind, SortKey,
};
pub use row_type::{RowField, RowType};
pub use types::{parse_sql_type, FloatBitWidth, IntBitWidth, SqlType};
