//! Integration tests for decision-table compilation.

mod helpers;

use bkflow_converter::config::DecisionTableSettings;
use bkflow_converter::decision_table::{DecisionTableError, DecisionTableParser, InputRow};
use serde_json::json;

fn cells(row: &InputRow) -> String {
    match row {
        InputRow::Cells(cells) => cells.join(" | "),
        InputRow::Expression(expr) => panic!("expected cells, got expression {}", expr),
    }
}

fn expression(row: &InputRow) -> &str {
    match row {
        InputRow::Expression(expr) => expr,
        InputRow::Cells(cells) => panic!("expected an expression, got cells {:?}", cells),
    }
}

#[test]
fn all_types_table_compiles_each_dialect() {
    let table = helpers::compile("all types", helpers::all_types_table());
    let ids: Vec<&str> = table.inputs.cols.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["dc724138", "1bb803c6", "cd333b63"]);
    assert_eq!(table.inputs.cols[1].name, "数值类型");

    let rows = &table.inputs.rows;
    insta::assert_snapshot!(cells(&rows[0]), @r#""option_65bc3d3d" | 123 | "abc""#);
    insta::assert_snapshot!(
        cells(&rows[1]),
        @r#"dc724138!="option_6044a034" | 1bb803c6!=213 | cd333b63!="abc""#
    );
    insta::assert_snapshot!(
        expression(&rows[2]),
        @r#"(1bb803c6=1 or dc724138!=null) and (contains(cd333b63,"23"))"#
    );
}

#[test]
fn common_rows_compile_to_bare_cells() {
    let table = helpers::compile("simple", helpers::simple_table());
    assert_eq!(
        serde_json::to_value(&table.inputs.rows).unwrap(),
        json!([
            ["\"a\"", "0", "\"value1\""],
            ["\"b\"", "1", "\"value1\""]
        ])
    );
}

#[test]
fn outputs_follow_field_order_and_type() {
    let table = helpers::compile("all types", helpers::all_types_table());
    let ids: Vec<&str> = table.outputs.cols.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["7d587535", "09db5d38", "d1b87697"]);
    assert_eq!(
        table.outputs.rows,
        vec![
            vec![json!("\"deg\""), json!("34"), json!("\"output1\"")],
            vec![json!("\"abc\""), json!("324"), json!("\"output1\"")],
            vec![json!("\"213\""), json!("432"), json!("\"\"")],
        ]
    );
}

#[test]
fn or_and_groups_are_parenthesised() {
    let table = helpers::compile("or and", helpers::or_and_condition_table());
    let rows: Vec<&str> = table.inputs.rows.iter().map(expression).collect();
    assert_eq!(rows[0], r#"(text_area="2")"#);
    assert_eq!(
        rows[1],
        r#"(text_area="1") and (int_area=1) and (select_area="option1")"#
    );
    assert_eq!(rows[2], r#"(contains(text_area,"123")) or (int_area>5)"#);
    assert_eq!(
        rows[3],
        r#"(text_area="4" and int_area>4) or (int_area>4 and list contains("['option1']", select_area))"#
    );
}

#[test]
fn expression_records_pass_through() {
    let table = helpers::compile("expression", helpers::expression_table());
    assert_eq!(table.inputs.rows, vec![InputRow::Expression("int_area=2".into())]);
    assert_eq!(table.outputs.rows, vec![vec![json!("\"2\"")]]);
}

#[test]
fn compiling_twice_is_stable() {
    let parser = DecisionTableParser::new("stable", helpers::all_types_table(), "Unique", true)
        .unwrap();
    let first = parser.parse().unwrap();
    let second = parser.parse().unwrap();
    assert_eq!(first, second);
}

#[test]
fn compiled_table_serializes_rows_untagged() {
    let table = helpers::compile("expression", helpers::expression_table());
    let value = serde_json::to_value(&table).unwrap();
    assert_eq!(value["hit_policy"], json!("Unique"));
    assert_eq!(value["inputs"]["rows"], json!(["int_area=2"]));
    assert_eq!(value["inputs"]["cols"][0]["id"], json!("int_area"));
}

#[test]
fn schema_violation_is_reported_with_path() {
    let mut table = helpers::simple_table();
    table["inputs"][0]["id"] = json!(5);
    let err = DecisionTableParser::new("broken", table, "Unique", true).unwrap_err();
    let DecisionTableError::Schema { path, .. } = &err else {
        panic!("expected a schema error, got {:?}", err);
    };
    assert_eq!(path, "/inputs/0/id");
}

#[test]
fn validation_can_be_skipped_by_settings() {
    let mut table = helpers::simple_table();
    table["inputs"][0]["id"] = json!(5);
    let settings = DecisionTableSettings {
        hit_policy: "First".into(),
        validate_schema: false,
    };
    let parser = DecisionTableParser::from_settings("lenient", table, &settings);
    assert!(parser.is_ok());
}

#[test]
fn missing_output_value_is_an_error() {
    let mut table = helpers::simple_table();
    table["records"][1]["outputs"] = json!({});
    let err = DecisionTableParser::new("missing", table, "Unique", false)
        .unwrap()
        .parse()
        .unwrap_err();
    assert_eq!(
        err,
        DecisionTableError::MissingOutput {
            record: 1,
            field: "output_area".into()
        }
    );
}
