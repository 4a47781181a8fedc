//! JSON wire form of the plan

use crate::error::{PlanError, PlanResult};
use crate::rel::RelNode;
use std::path::Path;

/// Parse a plan document
pub fn plan_from_json(json: &str) -> PlanResult<RelNode> {
    if json.trim().is_empty() {
        return Err(PlanError::Empty);
    }
    Ok(serde_json::from_str(json)?)
}

/// Serialize a plan as pretty-printed JSON
pub fn plan_to_json(plan: &RelNode) -> PlanResult<String> {
    Ok(serde_json::to_string_pretty(plan)?)
}

/// Read and parse a plan file
pub fn load_plan(path: &Path) -> PlanResult<RelNode> {
    let content = std::fs::read_to_string(path).map_err(|source| PlanError::Io {
        path: path.display().to_string(),
        source,
    })?;
    plan_from_json(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row_type::RowType;
    use crate::types::SqlType;
    use std::io::Write;

    #[test]
    fn test_empty_document() {
        assert!(matches!(plan_from_json("  \n"), Err(PlanError::Empty)));
    }

    #[test]
    fn test_invalid_document() {
        let err = plan_from_json("{\"kind\": \"teleport\"}").unwrap_err();
        assert!(matches!(err, PlanError::Json(_)));
        assert!(err.to_string().starts_with("[P002]"));
    }

    #[test]
    fn test_load_plan_from_file() {
        let plan = RelNode::scan("t", RowType::of([("a", SqlType::integer())]));
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(plan_to_json(&plan).unwrap().as_bytes())
            .unwrap();
        assert_eq!(load_plan(file.path()).unwrap(), plan);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_plan(Path::new("/nonexistent/plan.json")).unwrap_err();
        assert!(matches!(err, PlanError::Io { .. }));
    }

    #[test]
    fn test_hand_written_document() {
        let json = r#"{
            "kind": "filter",
            "input": {
                "kind": "table_scan",
                "table": ["table_one"],
                "row_type": [{"name": "icol", "type": "INTEGER"}]
            },
            "condition": {
                "kind": "call",
                "op": "<",
                "operands": [
                    {"kind": "field_ref", "index": 0, "type": "INTEGER"},
                    {"kind": "literal", "value": {"integer": 5}, "type": "INTEGER"}
                ],
                "type": "BOOLEAN"
            },
            "row_type": [{"name": "icol", "type": "INTEGER"}]
        }"#;
        let plan = plan_from_json(json).unwrap();
        assert_eq!(plan.kind_name(), "Filter");
        assert_eq!(plan.depth(), 2);
    }
}
