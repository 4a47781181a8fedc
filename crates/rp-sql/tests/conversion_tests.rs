//! End-to-end conversion of decorrelated plan shapes into Presto text

use chrono::NaiveDate;
use rp_plan::{
    AggregateCall, JoinType, LiteralValue, NullOrdering, RelNode, RowType, ScalarExpr, SetOpKind,
    SortKey, SqlType,
};
use rp_sql::RelToPrestoConverter;

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
        "table_two",
        RowType::of([
            ("ifield", SqlType::integer()),
            ("dfield", SqlType::decimal(10, 2)),
            ("sfield", SqlType::varchar()),
        ]),
    )
}

fn table_arr() -> RelNode {
    RelNode::scan(
        "table_arr",
        RowType::of([
            ("icol", SqlType::integer()),
            ("acol", SqlType::Array(Box::new(SqlType::varchar()))),
        ]),
    )
}

fn int(i: usize) -> ScalarExpr {
    ScalarExpr::field(i, SqlType::integer())
}

fn convert(plan: &RelNode) -> String {
    RelToPrestoConverter::new()
        .convert(plan)
        .unwrap_or_else(|e| panic!("conversion failed: {e}"))
}

/// `MIN(TRUE)` marker aggregate over table_two rows with dfield > 32.00
fn exists_marker() -> RelNode {
    let filtered = RelNode::filter(
        table_two(),
        ScalarExpr::predicate(
            ">",
            vec![
                ScalarExpr::field(1, SqlType::decimal(10, 2)),
                ScalarExpr::decimal("32.00"),
            ],
        ),
    );
    let marked = RelNode::project(filtered, [(ScalarExpr::boolean(true), "$f0")]);
    RelNode::aggregate(
        marked,
        vec![],
        vec![AggregateCall::new("MIN", vec![0], "$f0", SqlType::Boolean)],
    )
}

#[test]
fn test_exists_subquery() {
    let joined = RelNode::join(
        table_one(),
        exists_marker(),
        JoinType::Left,
        Some(ScalarExpr::boolean(true)),
    );
    let filtered = RelNode::filter(
        joined,
        ScalarExpr::predicate("IS NOT NULL", vec![ScalarExpr::field(3, SqlType::Boolean)]),
    );
    let plan = RelNode::project(filtered, [(int(0), "icol")]);
    assert_eq!(
        convert(&plan),
        "SELECT table_one.icol AS icol\n\
         FROM table_one\n\
         LEFT JOIN (SELECT MIN(TRUE) AS \"$f0\"\n\
         FROM table_two\n\
         WHERE dfield > 32.00) AS \"t0\" ON TRUE\n\
         WHERE \"t0\".\"$f0\" IS NOT NULL"
    );
}

#[test]
fn test_not_exists_subquery() {
    let joined = RelNode::join(table_one(), exists_marker(), JoinType::Left, None);
    let filtered = RelNode::filter(
        joined,
        ScalarExpr::predicate(
            "NOT",
            vec![ScalarExpr::predicate(
                "IS NOT NULL",
                vec![ScalarExpr::field(3, SqlType::Boolean)],
            )],
        ),
    );
    let plan = RelNode::project(filtered, [(int(0), "icol")]);
    let sql = convert(&plan);
    assert!(sql.ends_with("WHERE NOT \"t0\".\"$f0\" IS NOT NULL"), "{sql}");
}

#[test]
fn test_in_subquery() {
    let keys = RelNode::aggregate(
        RelNode::project(
            RelNode::filter(
                table_two(),
                ScalarExpr::predicate("<", vec![int(0), ScalarExpr::int(10)]),
            ),
            [(int(0), "ifield")],
        ),
        vec![0],
        vec![],
    );
    let joined = RelNode::join(
        table_one(),
        keys,
        JoinType::Inner,
        Some(ScalarExpr::predicate("=", vec![int(0), int(3)])),
    );
    let plan = RelNode::project(joined, [(ScalarExpr::field(2, SqlType::varchar()), "scol")]);
    assert_eq!(
        convert(&plan),
        "SELECT table_one.scol AS scol\n\
         FROM table_one\n\
         INNER JOIN (SELECT ifield AS ifield\n\
         FROM table_two\n\
         WHERE ifield < 10\n\
         GROUP BY ifield) AS \"t0\" ON table_one.icol = \"t0\".\"IFIELD\""
    );
}

#[test]
fn test_not_in_subquery() {
    let keys = RelNode::aggregate(
        RelNode::project(table_two(), [(int(0), "ifield")]),
        vec![0],
        vec![],
    );
    let joined = RelNode::join(
        table_one(),
        keys,
        JoinType::Inner,
        Some(ScalarExpr::predicate("<>", vec![int(0), int(3)])),
    );
    let plan = RelNode::project(joined, [(ScalarExpr::field(2, SqlType::varchar()), "scol")]);
    assert_eq!(
        convert(&plan),
        "SELECT table_one.scol AS scol\n\
         FROM table_one\n\
         INNER JOIN (SELECT ifield AS ifield\n\
         FROM table_two\n\
         GROUP BY ifield) AS \"t0\" ON table_one.icol <> \"t0\".\"IFIELD\""
    );
}

#[test]
fn test_union() {
    let left = RelNode::project(table_one(), [(int(0), "icol")]);
    let right = RelNode::project(
        RelNode::filter(
            table_two(),
            ScalarExpr::predicate(
                "=",
                vec![
                    ScalarExpr::field(2, SqlType::varchar()),
                    ScalarExpr::string("abc"),
                ],
            ),
        ),
        [(int(0), "ifield")],
    );
    let plan = RelNode::set_op(SetOpKind::Union, false, vec![left, right]);
    assert_eq!(
        convert(&plan),
        "SELECT icol AS icol\n\
         FROM table_one\n\
         UNION\n\
         SELECT ifield AS ifield\n\
         FROM table_two\n\
         WHERE sfield = 'abc'"
    );
}

#[test]
fn test_nested_set_operations_keep_grouping() {
    let a = RelNode::project(table_one(), [(int(0), "icol")]);
    let b = RelNode::project(table_two(), [(int(0), "ifield")]);
    let c = RelNode::project(table_arr(), [(int(0), "icol")]);
    let plan = RelNode::set_op(
        SetOpKind::Union,
        true,
        vec![
            a,
            RelNode::set_op(SetOpKind::Intersect, false, vec![b, c]),
        ],
    );
    assert_eq!(
        convert(&plan),
        "SELECT icol AS icol\n\
         FROM table_one\n\
         UNION ALL\n\
         (SELECT ifield AS ifield\n\
         FROM table_two\n\
         INTERSECT\n\
         SELECT icol AS icol\n\
         FROM table_arr)"
    );
}

#[test]
fn test_random_functions() {
    let plan = RelNode::project(
        table_one(),
        [
            (int(0), "icol"),
            (ScalarExpr::call("RAND", vec![], SqlType::double()), "EXPR$1"),
        ],
    );
    assert_eq!(
        convert(&plan),
        "SELECT icol AS icol, RANDOM() AS \"EXPR$1\"\nFROM table_one"
    );

    let bounded = RelNode::project(
        table_one(),
        [(
            ScalarExpr::call(
                "RAND_INTEGER",
                vec![ScalarExpr::int(1), ScalarExpr::int(10)],
                SqlType::integer(),
            ),
            "EXPR$0",
        )],
    );
    assert_eq!(
        convert(&bounded),
        "SELECT RANDOM(10) AS \"EXPR$0\"\nFROM table_one"
    );
}

#[test]
fn test_rewritten_functions() {
    let plan = RelNode::project(
        table_one(),
        [
            (
                ScalarExpr::call(
                    "TRUNCATE",
                    vec![ScalarExpr::field(1, SqlType::double()), ScalarExpr::int(2)],
                    SqlType::double(),
                ),
                "t",
            ),
            (
                ScalarExpr::call(
                    "SUBSTRING",
                    vec![
                        ScalarExpr::field(2, SqlType::varchar()),
                        ScalarExpr::int(1),
                        ScalarExpr::int(3),
                    ],
                    SqlType::varchar(),
                ),
                "s",
            ),
            (
                ScalarExpr::call(
                    "CAST",
                    vec![ScalarExpr::field(1, SqlType::double())],
                    SqlType::integer(),
                ),
                "c",
            ),
        ],
    );
    assert_eq!(
        convert(&plan),
        "SELECT TRUNCATE(dcol * POWER(10, 2)) / POWER(10, 2) AS t, \
         SUBSTR(scol, 1, 3) AS s, CAST(dcol AS INTEGER) AS c\n\
         FROM table_one"
    );
}

#[test]
fn test_arithmetic_precedence() {
    let arith = |op: &str, a: ScalarExpr, b: ScalarExpr| {
        ScalarExpr::call(op, vec![a, b], SqlType::integer())
    };
    let flat = arith(
        "+",
        ScalarExpr::int(5),
        arith(
            "/",
            arith("*", ScalarExpr::int(2), ScalarExpr::int(10)),
            ScalarExpr::int(4),
        ),
    );
    let grouped = arith(
        "*",
        arith("+", int(0), ScalarExpr::int(1)),
        ScalarExpr::int(2),
    );
    let plan = RelNode::project(table_one(), [(flat, "EXPR$0"), (grouped, "EXPR$1")]);
    assert_eq!(
        convert(&plan),
        "SELECT 5 + 2 * 10 / 4 AS \"EXPR$0\", (icol + 1) * 2 AS \"EXPR$1\"\nFROM table_one"
    );
}

#[test]
fn test_sort_uses_output_aliases() {
    let projected = RelNode::project(
        table_one(),
        [(int(0), "icol"), (ScalarExpr::field(2, SqlType::varchar()), "scol")],
    );
    let plan = RelNode::sort(projected, vec![SortKey::desc(1)], None, Some(10));
    assert_eq!(
        convert(&plan),
        "SELECT icol AS icol, scol AS scol\n\
         FROM table_one\n\
         ORDER BY scol DESC\n\
         FETCH NEXT 10 ROWS ONLY"
    );
}

#[test]
fn test_sort_over_scan_with_null_ordering() {
    let mut key = SortKey::asc(0);
    key.nulls = Some(NullOrdering::Last);
    let plan = RelNode::sort(table_one(), vec![key], Some(5), None);
    assert_eq!(
        convert(&plan),
        "SELECT *\nFROM table_one\nORDER BY icol NULLS LAST\nOFFSET 5 ROWS"
    );
}

#[test]
fn test_projection_over_limit_wraps() {
    let sorted = RelNode::sort(table_one(), vec![SortKey::asc(0)], None, Some(3));
    let plan = RelNode::project(sorted, [(int(0), "icol")]);
    assert_eq!(
        convert(&plan),
        "SELECT \"icol\" AS icol\n\
         FROM (SELECT *\n\
         FROM table_one\n\
         ORDER BY icol\n\
         FETCH NEXT 3 ROWS ONLY) AS \"t0\""
    );
}

#[test]
fn test_sort_without_keys_is_a_no_op() {
    let plan = RelNode::sort(table_one(), vec![], None, None);
    assert_eq!(convert(&plan), "SELECT *\nFROM table_one");
}

#[test]
fn test_unnest_of_constant_array() {
    let pair = SqlType::Row(vec![
        ("a".to_string(), SqlType::integer()),
        ("b".to_string(), SqlType::integer()),
    ]);
    let rows = (1..=3)
        .map(|i| LiteralValue::Row(vec![LiteralValue::Integer(i), LiteralValue::Integer(i)]))
        .collect();
    let unnest = RelNode::unnest(
        vec![ScalarExpr::literal(
            LiteralValue::Array(rows),
            SqlType::Array(Box::new(pair)),
        )],
        false,
        RowType::of([("a", SqlType::integer()), ("b", SqlType::integer())]),
    );
    let plan = RelNode::project(
        unnest,
        [(
            ScalarExpr::call("+", vec![int(0), ScalarExpr::int(2)], SqlType::integer()),
            "EXPR$0",
        )],
    );
    assert_eq!(
        convert(&plan),
        "SELECT \"col_0\" + 2 AS \"EXPR$0\"\n\
         FROM UNNEST(ARRAY[ROW(1, 1), ROW(2, 2), ROW(3, 3)]) AS \"t0\" (\"col_0\", \"col_1\")"
    );
}

#[test]
fn test_unnest_with_ordinality() {
    let unnest = RelNode::unnest(
        vec![ScalarExpr::literal(
            LiteralValue::Array(vec![LiteralValue::String("x".into())]),
            SqlType::Array(Box::new(SqlType::varchar())),
        )],
        true,
        RowType::of([("v", SqlType::varchar()), ("ord", SqlType::bigint())]),
    );
    assert_eq!(
        convert(&unnest),
        "SELECT \"col_0\" AS v, \"col_1\" AS ord\n\
         FROM UNNEST(ARRAY['x']) WITH ORDINALITY AS \"t0\" (\"col_0\", \"col_1\")"
    );
}

#[test]
fn test_lateral_unnest_of_correlated_column() {
    let unnest = RelNode::unnest(
        vec![ScalarExpr::correl(
            "$cor0",
            "acol",
            SqlType::Array(Box::new(SqlType::varchar())),
        )],
        false,
        RowType::of([("elem", SqlType::varchar())]),
    );
    let correlated = RelNode::correlate(table_arr(), unnest, "$cor0", JoinType::Inner);
    let plan = RelNode::project(
        correlated,
        [(int(0), "icol"), (ScalarExpr::field(2, SqlType::varchar()), "elem")],
    );
    assert_eq!(
        convert(&plan),
        "SELECT \"$cor0\".icol AS icol, \"t0\".\"col_0\" AS elem\n\
         FROM table_arr AS \"$cor0\"\n\
         CROSS JOIN UNNEST(\"$cor0\".\"acol\") AS \"t0\" (\"col_0\")"
    );
}

#[test]
fn test_correlated_aggregate_joins_laterally() {
    let counted = RelNode::aggregate(
        RelNode::filter(
            table_two(),
            ScalarExpr::predicate(
                "=",
                vec![int(0), ScalarExpr::correl("$cor7", "icol", SqlType::integer())],
            ),
        ),
        vec![],
        vec![AggregateCall::new("COUNT", vec![], "c", SqlType::bigint())],
    );
    let correlated = RelNode::correlate(table_one(), counted, "$cor7", JoinType::Left);
    let plan = RelNode::project(correlated, [(int(0), "icol"), (ScalarExpr::field(3, SqlType::bigint()), "c")]);
    assert_eq!(
        convert(&plan),
        "SELECT \"$cor0\".icol AS icol, \"t0\".\"c\" AS c\n\
         FROM table_one AS \"$cor0\"\n\
         LEFT JOIN LATERAL (SELECT COUNT(*) AS c\n\
         FROM table_two\n\
         WHERE ifield = \"$cor0\".\"icol\") AS \"t0\" ON TRUE"
    );
}

#[test]
fn test_values() {
    let rows = RelNode::values(
        vec![
            vec![LiteralValue::Integer(1), LiteralValue::String("a".into())],
            vec![LiteralValue::Integer(2), LiteralValue::String("b".into())],
        ],
        RowType::of([("id", SqlType::integer()), ("name", SqlType::varchar())]),
    );
    assert_eq!(
        convert(&rows),
        "SELECT *\nFROM (VALUES (1, 'a'), (2, 'b')) AS \"t0\" (id, name)"
    );
}

#[test]
fn test_empty_values() {
    let rows = RelNode::values(
        vec![],
        RowType::of([("id", SqlType::integer()), ("name", SqlType::varchar())]),
    );
    assert_eq!(
        convert(&rows),
        "SELECT *\n\
         FROM (VALUES (CAST(NULL AS INTEGER), CAST(NULL AS VARCHAR))) AS \"t0\" (id, name)\n\
         WHERE FALSE"
    );
}

#[test]
fn test_self_join_gets_distinct_alias() {
    let plan = RelNode::join(
        table_one(),
        table_one(),
        JoinType::Inner,
        Some(ScalarExpr::predicate("=", vec![int(0), int(3)])),
    );
    assert_eq!(
        convert(&plan),
        "SELECT table_one.icol AS icol, table_one.dcol AS dcol, table_one.scol AS scol, \
         \"t0\".icol AS icol0, \"t0\".dcol AS dcol0, \"t0\".scol AS scol0\n\
         FROM table_one\n\
         INNER JOIN table_one AS \"t0\" ON table_one.icol = \"t0\".icol"
    );
}

#[test]
fn test_cross_join() {
    let plan = RelNode::join(table_one(), table_two(), JoinType::Cross, None);
    let sql = convert(&plan);
    assert!(sql.ends_with("FROM table_one\nCROSS JOIN table_two"), "{sql}");
}

#[test]
fn test_group_by_and_having() {
    let grouped = RelNode::aggregate(
        table_one(),
        vec![2],
        vec![
            AggregateCall::new("COUNT", vec![], "cnt", SqlType::bigint()),
            AggregateCall::new("SUM", vec![0], "total", SqlType::bigint()),
        ],
    );
    assert_eq!(
        convert(&grouped),
        "SELECT scol AS scol, COUNT(*) AS cnt, SUM(icol) AS total\n\
         FROM table_one\n\
         GROUP BY scol"
    );

    let having = RelNode::filter(
        grouped,
        ScalarExpr::predicate(
            ">",
            vec![ScalarExpr::field(1, SqlType::bigint()), ScalarExpr::int(5)],
        ),
    );
    assert_eq!(
        convert(&having),
        "SELECT scol AS scol, COUNT(*) AS cnt, SUM(icol) AS total\n\
         FROM table_one\n\
         GROUP BY scol\n\
         HAVING COUNT(*) > 5"
    );
}

fn random_per_group() -> RelNode {
    let grouped = RelNode::aggregate(
        table_one(),
        vec![2],
        vec![AggregateCall::new("SUM", vec![0], "total", SqlType::bigint())],
    );
    RelNode::project(
        grouped,
        [(ScalarExpr::call("RAND", vec![], SqlType::double()), "r")],
    )
}

#[test]
fn test_projection_reads_row_level_value_over_aggregate_once() {
    let r = || ScalarExpr::field(0, SqlType::double());
    let plan = RelNode::project(random_per_group(), [(r(), "a"), (r(), "b")]);
    assert_eq!(
        convert(&plan),
        "SELECT \"r\" AS a, \"r\" AS b\n\
         FROM (SELECT RANDOM() AS r\n\
         FROM table_one\n\
         GROUP BY scol) AS \"t0\""
    );
}

#[test]
fn test_filter_reads_row_level_value_over_aggregate_once() {
    let plan = RelNode::filter(
        random_per_group(),
        ScalarExpr::predicate(
            ">",
            vec![ScalarExpr::field(0, SqlType::double()), ScalarExpr::decimal("0.5")],
        ),
    );
    assert_eq!(
        convert(&plan),
        "SELECT *\n\
         FROM (SELECT RANDOM() AS r\n\
         FROM table_one\n\
         GROUP BY scol) AS \"t0\"\n\
         WHERE \"r\" > 0.5"
    );
}

#[test]
fn test_projection_and_filter_over_aggregate_outputs_merge() {
    let grouped = RelNode::aggregate(
        table_one(),
        vec![2],
        vec![AggregateCall::new("SUM", vec![0], "total", SqlType::bigint())],
    );
    let reordered = RelNode::project(
        grouped,
        [
            (ScalarExpr::field(1, SqlType::bigint()), "total"),
            (ScalarExpr::field(0, SqlType::varchar()), "scol"),
        ],
    );
    let plan = RelNode::filter(
        reordered,
        ScalarExpr::predicate(
            ">",
            vec![ScalarExpr::field(0, SqlType::bigint()), ScalarExpr::int(5)],
        ),
    );
    assert_eq!(
        convert(&plan),
        "SELECT SUM(icol) AS total, scol AS scol\n\
         FROM table_one\n\
         GROUP BY scol\n\
         HAVING SUM(icol) > 5"
    );
}

#[test]
fn test_distinct_aggregate() {
    let mut call = AggregateCall::new("COUNT", vec![0], "n", SqlType::bigint());
    call.distinct = true;
    let plan = RelNode::aggregate(table_one(), vec![], vec![call]);
    assert_eq!(
        convert(&plan),
        "SELECT COUNT(DISTINCT icol) AS n\nFROM table_one"
    );
}

#[test]
fn test_filter_over_computed_projection_wraps() {
    let projected = RelNode::project(
        table_one(),
        [(
            ScalarExpr::call("+", vec![int(0), ScalarExpr::int(1)], SqlType::integer()),
            "next_icol",
        )],
    );
    let plan = RelNode::filter(
        projected,
        ScalarExpr::predicate(">", vec![int(0), ScalarExpr::int(3)]),
    );
    assert_eq!(
        convert(&plan),
        "SELECT *\n\
         FROM (SELECT icol + 1 AS next_icol\n\
         FROM table_one) AS \"t0\"\n\
         WHERE \"next_icol\" > 3"
    );
}

#[test]
fn test_typed_literals() {
    let plan = RelNode::project(
        table_one(),
        [
            (
                ScalarExpr::literal(
                    LiteralValue::Date(NaiveDate::from_ymd_opt(2017, 10, 21).unwrap()),
                    SqlType::Date,
                ),
                "d",
            ),
            (
                ScalarExpr::literal(
                    LiteralValue::Array(vec![
                        LiteralValue::Integer(1),
                        LiteralValue::Integer(2),
                        LiteralValue::Integer(3),
                    ]),
                    SqlType::Array(Box::new(SqlType::integer())),
                ),
                "a",
            ),
        ],
    );
    assert_eq!(
        convert(&plan),
        "SELECT DATE '2017-10-21' AS d, ARRAY[1, 2, 3] AS a\nFROM table_one"
    );
}

#[test]
fn test_qualified_table_and_quoted_names() {
    let scan = RelNode::scan(
        "hive.default.Events",
        RowType::of([("EventId", SqlType::bigint()), ("select", SqlType::varchar())]),
    );
    let plan = RelNode::filter(
        scan,
        ScalarExpr::predicate(
            "=",
            vec![
                ScalarExpr::field(1, SqlType::varchar()),
                ScalarExpr::string("x"),
            ],
        ),
    );
    assert_eq!(
        convert(&plan),
        "SELECT *\nFROM hive.default.\"Events\"\nWHERE \"select\" = 'x'"
    );
}
