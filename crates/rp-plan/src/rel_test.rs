use super::*;

fn table_one() -> RelNode {
    RelNode::scan(
        "table_one",
        RowType::of([
            ("icol", SqlType::integer()),
            ("dcol", SqlType::double()),
            ("scol", SqlType::varchar()),
        ]),
    )
}

fn table_two() -> RelNode {
    RelNode::scan(
        "db.table_two",
        RowType::of([("ifield", SqlType::integer()), ("sfield", SqlType::varchar())]),
    )
}

#[test]
fn test_scan_splits_qualified_name() {
    if let RelNode::TableScan { table, .. } = table_two() {
        assert_eq!(table, vec!["db".to_string(), "table_two".to_string()]);
    } else {
        panic!("Expected TableScan");
    }
}

#[test]
fn test_project_derives_row_type() {
    let node = RelNode::project(
        table_one(),
        [
            (ScalarExpr::field(2, SqlType::varchar()), "s"),
            (ScalarExpr::int(1), "one"),
        ],
    );
    assert_eq!(node.row_type().names(), vec!["s", "one"]);
    assert_eq!(node.row_type().fields[1].ty, SqlType::integer());
    assert_eq!(node.kind_name(), "Project");
}

#[test]
fn test_aggregate_row_type_keys_then_calls() {
    let node = RelNode::aggregate(
        table_one(),
        vec![2],
        vec![AggregateCall::new("SUM", vec![0], "s", SqlType::bigint())],
    );
    assert_eq!(node.row_type().names(), vec!["scol", "s"]);
}

#[test]
fn test_join_renames_collisions() {
    let node = RelNode::join(table_one(), table_one(), JoinType::Inner, None);
    assert_eq!(
        node.row_type().names(),
        vec!["icol", "dcol", "scol", "icol0", "dcol0", "scol0"]
    );
    assert_eq!(node.inputs().len(), 2);
}

#[test]
fn test_depth_and_scanned_tables() {
    let plan = RelNode::filter(
        RelNode::join(table_one(), table_two(), JoinType::Cross, None),
        ScalarExpr::boolean(true),
    );
    assert_eq!(plan.depth(), 3);
    assert_eq!(plan.scanned_tables(), vec!["table_one", "table_two"]);
}

#[test]
fn test_tree_walks_visit_every_branch() {
    let left_deep = RelNode::join(
        RelNode::join(table_two(), table_one(), JoinType::Cross, None),
        table_two(),
        JoinType::Cross,
        None,
    );
    let plan = RelNode::set_op(SetOpKind::Union, true, vec![table_one(), table_one()]);
    assert_eq!(left_deep.depth(), 3);
    assert_eq!(
        left_deep.scanned_tables(),
        vec!["table_two", "table_one", "table_two"]
    );
    assert_eq!(plan.depth(), 2);
    assert_eq!(plan.scanned_tables(), vec!["table_one", "table_one"]);
}

#[test]
fn test_set_op_takes_first_row_type() {
    let node = RelNode::set_op(
        SetOpKind::Union,
        false,
        vec![
            RelNode::project(table_one(), [(ScalarExpr::field(0, SqlType::integer()), "icol")]),
            RelNode::project(table_two(), [(ScalarExpr::field(0, SqlType::integer()), "ifield")]),
        ],
    );
    assert_eq!(node.row_type().names(), vec!["icol"]);
}

#[test]
fn test_json_round_trip() {
    let plan = RelNode::sort(
        RelNode::filter(
            table_one(),
            ScalarExpr::predicate(
                ">",
                vec![
                    ScalarExpr::field(1, SqlType::double()),
                    ScalarExpr::decimal("3.0"),
                ],
            ),
        ),
        vec![SortKey::desc(0)],
        None,
        Some(10),
    );
    let json = serde_json::to_string(&plan).unwrap();
    let back: RelNode = serde_json::from_str(&json).unwrap();
    assert_eq!(back, plan);
}

#[test]
fn test_join_type_display() {
    assert_eq!(JoinType::Left.to_string(), "LEFT");
    assert_eq!(JoinType::Cross.to_string(), "CROSS");
    assert_eq!(SetOpKind::Except.to_string(), "EXCEPT");
}
