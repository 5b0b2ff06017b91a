use serde_json::json;

use super::*;
use crate::field::{CategoricalField, NumericalField};
use crate::model::{Metrics, attribute};

fn search_results() -> Value {
    json!({
        "old system": {
            "fruit": [
                { "id": "53", "name": "Orange", "price": 1.00, "category": "fruit" },
                { "id": "813", "name": "Fruitcake", "price": 3.15, "category": "cake" }
            ],
            "empty": []
        },
        "new system": {
            "fruit": [
                { "id": "53", "name": "Orange", "price": 1.00, "category": "fruit" },
                { "id": "17", "name": "Apple", "price": 0.80, "category": "fruit" }
            ],
            "empty": [
                { "id": "99", "name": "Water", "price": 0.10, "category": "drink" }
            ]
        }
    })
}

fn result_table() -> ResultTable {
    ResultTable::from_json(
        &search_results(),
        None,
        vec![Field::numerical("price"), Field::categorical("category")],
        DEFAULT_DEPTH,
    )
    .expect("result table should build")
}

fn assert_close(actual: MetricValue, expected: f64) {
    let actual = actual.expect("value should be defined");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// Mock field with a sum and a product over the `value` attribute.
struct MockField;

impl MetricField for MockField {
    fn name(&self) -> &str {
        "mock"
    }

    fn at_k(&self, ranked: &[Item], k: Option<usize>) -> Result<Metrics> {
        let values: Vec<f64> = crate::model::top_k(ranked, k)
            .iter()
            .filter_map(|item| attribute(item, "value").as_f64())
            .collect();
        let mut metrics = Metrics::new();
        metrics.insert("metric_sum", Some(values.iter().sum()));
        metrics.insert("metric_product", Some(values.iter().product()));
        Ok(metrics)
    }
}

#[test]
fn custom_metric_fields_share_compute_metrics() {
    let corpus = ResultCorpus::from_json(
        &json!({
            "system A": {
                "query 1": [{ "value": 5 }, { "value": 2 }, { "value": 1 }],
                "query 2": [{ "value": 1 }, { "value": 3 }],
            },
            "system B": {
                "query 1": [{ "value": 8 }, { "value": 3 }],
                "query 2": [{ "value": 4 }, { "value": 1 }],
            }
        }),
        None,
    )
    .expect("corpus should build");

    let table = MockField
        .compute_metrics(&corpus, Some(10))
        .expect("metrics should compute");
    assert_eq!(table.columns(), ["metric_sum", "metric_product"]);
    assert_eq!(table.value("system A", "query 1", "metric_sum"), Some(Some(8.0)));
    assert_eq!(table.value("system A", "query 1", "metric_product"), Some(Some(10.0)));
    assert_eq!(table.value("system B", "query 2", "metric_product"), Some(Some(4.0)));
}

#[test]
fn query_metric_frame_slices_one_system() {
    let table = result_table();
    let frame = table
        .query_metric_frame("price", "new system")
        .expect("frame should build");

    assert_eq!(frame.index_name(), "query");
    assert_eq!(frame.index(), ["fruit", "empty"]);
    assert_eq!(
        frame.columns(),
        [
            "1-percentile",
            "25-percentile",
            "50-percentile",
            "75-percentile",
            "99-percentile",
            "total",
            "mean"
        ]
    );
    assert_close(frame.get("fruit", "1-percentile").flatten(), 0.802);
    assert_close(frame.get("fruit", "25-percentile").flatten(), 0.85);
    assert_close(frame.get("fruit", "99-percentile").flatten(), 0.998);
    assert_close(frame.get("fruit", "total").flatten(), 1.8);
    assert_close(frame.get("fruit", "mean").flatten(), 0.9);
    assert_close(frame.get("empty", "total").flatten(), 0.1);
}

#[test]
fn system_metric_frame_slices_one_query() {
    let table = result_table();
    let frame = table
        .system_metric_frame("price", "empty")
        .expect("frame should build");

    assert_eq!(frame.index_name(), "system");
    assert_eq!(frame.index(), ["old system", "new system"]);
    assert_eq!(frame.get("old system", "mean"), Some(None));
    assert_close(frame.get("new system", "mean").flatten(), 0.1);

    let frame = table
        .system_metric_frame("category", "fruit")
        .expect("frame should build");
    assert_eq!(frame.columns(), ["cake", "drink", "fruit", "unique_count"]);
    assert_close(frame.get("old system", "cake").flatten(), 0.5);
    assert_close(frame.get("new system", "fruit").flatten(), 1.0);
    assert_close(frame.get("new system", "unique_count").flatten(), 1.0);
}

#[test]
fn system_query_frame_pivots_one_metric() {
    let table = result_table();
    let frame = table
        .system_query_frame("price", "mean")
        .expect("frame should build");

    assert_eq!(frame.index(), ["old system", "new system"]);
    assert_eq!(frame.columns(), ["fruit", "empty"]);
    assert_close(frame.get("old system", "fruit").flatten(), 2.075);
    assert_close(frame.get("new system", "fruit").flatten(), 0.9);
    assert_eq!(frame.get("old system", "empty"), Some(None));
}

#[test]
fn unknown_names_are_lookup_errors() {
    let table = result_table();

    let cases = [
        table.query_metric_frame("wrong_field", "old system"),
        table.query_metric_frame("price", "wrong_system"),
        table.system_metric_frame("wrong_field", "fruit"),
        table.system_metric_frame("price", "wrong_query"),
        table.system_query_frame("wrong_field", "mean"),
        table.system_query_frame("price", "wrong_metric"),
    ];
    for result in cases {
        let error = result.expect_err("unknown name should fail");
        assert_eq!(error.kind(), "lookup", "{error}");
    }
}

#[test]
fn add_fields_rejects_duplicates_unless_replacing() {
    let mut table = result_table();

    let error = table
        .add_fields(vec![Field::numerical("price")], 1, false)
        .expect_err("duplicate field should fail");
    assert_eq!(error.kind(), "config");
    assert_close(
        table
            .summary("price")
            .expect("price summary should exist")
            .value("old system", "fruit", "total")
            .flatten(),
        4.15,
    );

    let shallow = NumericalField::new("price")
        .with_percentiles(vec![50.0])
        .expect("percentiles should be valid");
    table
        .add_fields(vec![shallow.into()], 1, true)
        .expect("replacement should succeed");

    assert_eq!(table.field_names(), vec!["price", "category"]);
    let summary = table.summary("price").expect("price summary should exist");
    assert_eq!(summary.columns(), ["50-percentile", "total", "mean"]);
    assert_close(summary.value("old system", "fruit", "total").flatten(), 1.0);
}

#[test]
fn add_fields_appends_new_fields_and_rejects_repeats_within_a_batch() {
    let mut table = result_table();
    table
        .add_fields(
            vec![CategoricalField::new("name").with_labels(["Orange"]).into()],
            DEFAULT_DEPTH,
            false,
        )
        .expect("new field should be added");
    assert_eq!(table.field_names(), vec!["price", "category", "name"]);
    assert_close(
        table
            .summary("name")
            .expect("name summary should exist")
            .value("new system", "fruit", "Orange")
            .flatten(),
        1.0,
    );

    let error = table
        .add_fields(vec![Field::numerical("id_rank"), Field::numerical("id_rank")], 1, false)
        .expect_err("repeated field should fail");
    assert_eq!(error.kind(), "config");
    assert!(table.summary("id_rank").is_err());
}

#[test]
fn failing_field_leaves_table_unchanged() {
    let mut table = result_table();
    let error = table
        .add_fields(vec![Field::numerical("weight"), Field::numerical("name")], 10, false)
        .expect_err("string attribute should not compute as numerical");
    assert_eq!(error.kind(), "type");
    assert_eq!(table.field_names(), vec!["price", "category"]);
}

#[test]
fn rank_biased_overlap_compares_named_systems() {
    let table = result_table();
    let frame = table
        .rank_biased_overlap("id", &["old system", "new system"], 0.9)
        .expect("rbo should compute");

    assert_eq!(frame.index(), ["fruit", "empty"]);
    assert_eq!(frame.columns(), ["rbo_min", "rbo_res", "rbo_ext"]);
    assert_close(frame.get("fruit", "rbo_min").flatten(), 0.255_842_788_110_449_5);
    assert_close(frame.get("fruit", "rbo_res").flatten(), 0.699_157_211_889_550_6);
    assert_close(frame.get("fruit", "rbo_ext").flatten(), 0.55);
    assert_eq!(frame.row("empty"), Some(&[None, None, None][..]));

    let default_pair = table
        .rank_biased_overlap(DEFAULT_IDENTIFIER, &[], DEFAULT_PERSISTENCE)
        .expect("rbo should compute");
    assert_eq!(default_pair, frame);
}

#[test]
fn rank_biased_overlap_argument_errors() {
    let table = result_table();

    let error = table
        .rank_biased_overlap("id", &["old system"], 0.9)
        .expect_err("one system should fail");
    assert_eq!(error.kind(), "value");

    let error = table
        .rank_biased_overlap("id", &["old system", "new system", "old system"], 0.9)
        .expect_err("three systems should fail");
    assert_eq!(error.kind(), "value");

    let error = table
        .rank_biased_overlap("id", &["old system", "missing system"], 0.9)
        .expect_err("unknown system should fail");
    assert_eq!(error.kind(), "lookup");

    let error = table
        .rank_biased_overlap("id", &[], 1.0)
        .expect_err("persistence of 1 should fail");
    assert_eq!(error.kind(), "value");
}

#[test]
fn rank_biased_overlap_requires_the_identifier_on_every_item() {
    let table = ResultTable::from_json(
        &json!({
            "left": { "q": [{ "id": 1 }, { "id": 2 }, { "id": 3 }] },
            "right": { "q": [{ "id": 7 }, { "id": 8 }, { "id": 9 }] }
        }),
        None,
        Vec::new(),
        DEFAULT_DEPTH,
    )
    .expect("result table should build");

    let frame = table
        .rank_biased_overlap("id", &[], 0.9)
        .expect("rbo should compute");
    assert_eq!(frame.get("q", "rbo_min"), Some(Some(0.0)));
    assert_eq!(frame.get("q", "rbo_ext"), Some(Some(0.0)));

    let error = table
        .rank_biased_overlap("ID", &[], 0.9)
        .expect_err("misspelled identifier should fail");
    assert_eq!(error.kind(), "lookup");
    let message = error.to_string();
    assert!(message.contains("rank 1 of `left` / `q`"), "{message}");
}

#[test]
fn explicit_null_identifiers_still_compare() {
    let table = ResultTable::from_json(
        &json!({
            "left": { "q": [{ "id": null }, { "id": 2 }] },
            "right": { "q": [{ "id": null }, { "id": 2 }] }
        }),
        None,
        Vec::new(),
        DEFAULT_DEPTH,
    )
    .expect("result table should build");
    let frame = table
        .rank_biased_overlap("id", &[], 0.9)
        .expect("rbo should compute");
    assert_close(frame.get("q", "rbo_ext").flatten(), 1.0);
}

#[test]
fn zero_depth_keeps_whole_lists() {
    let table = ResultTable::from_json(
        &search_results(),
        None,
        vec![Field::numerical("price")],
        0,
    )
    .expect("result table should build");
    let summary = table.summary("price").expect("price summary should exist");
    assert_close(summary.value("old system", "fruit", "total").flatten(), 4.15);
    assert_close(summary.value("new system", "fruit", "mean").flatten(), 0.9);
}

#[test]
fn system_query_frame_follows_corpus_order_for_many_cells() {
    let mut results = serde_json::Map::new();
    for system in 0..4 {
        let mut lists = serde_json::Map::new();
        for query in 0..5 {
            let price = f64::from(system * 10 + query);
            lists.insert(format!("q{query}"), json!([{ "price": price }]));
        }
        results.insert(format!("s{system}"), Value::Object(lists));
    }
    let table = ResultTable::from_json(
        &Value::Object(results),
        None,
        vec![Field::numerical("price")],
        DEFAULT_DEPTH,
    )
    .expect("result table should build");

    let frame = table
        .system_query_frame("price", "total")
        .expect("frame should build");
    assert_eq!(frame.index(), ["s0", "s1", "s2", "s3"]);
    assert_eq!(frame.columns(), ["q0", "q1", "q2", "q3", "q4"]);
    assert_eq!(frame.get("s2", "q3"), Some(Some(23.0)));
    assert_eq!(frame.get("s3", "q0"), Some(Some(30.0)));
}

#[test]
fn rank_biased_overlap_needs_two_systems() {
    let table = ResultTable::from_json(
        &json!({ "solo": { "q": [{ "id": 1 }] } }),
        None,
        Vec::new(),
        DEFAULT_DEPTH,
    )
    .expect("result table should build");

    let error = table
        .rank_biased_overlap("id", &[], 0.9)
        .expect_err("single system should fail");
    assert_eq!(error.kind(), "state");
}

#[test]
fn parse_system_names_checks_shape() {
    assert!(
        parse_system_names(&Value::Null)
            .expect("null should mean default pair")
            .is_empty()
    );
    assert_eq!(
        parse_system_names(&json!(["a", "b"])).expect("names should parse"),
        vec!["a", "b"]
    );
    assert_eq!(
        parse_system_names(&json!("a"))
            .expect_err("bare string should fail")
            .kind(),
        "type"
    );
    assert_eq!(
        parse_system_names(&json!(["a", 2]))
            .expect_err("numeric entry should fail")
            .kind(),
        "type"
    );
}

#[test]
fn duplicate_initial_fields_are_rejected() {
    let error = ResultTable::from_json(
        &search_results(),
        None,
        vec![Field::numerical("price"), Field::numerical("price")],
        DEFAULT_DEPTH,
    )
    .expect_err("duplicate fields should fail");
    assert_eq!(error.kind(), "config");
}

#[test]
fn depth_limits_every_field() {
    let table = ResultTable::from_json(
        &search_results(),
        None,
        vec![Field::numerical("price")],
        1,
    )
    .expect("result table should build");
    assert_eq!(table.depth(), 1);
    let summary = table.summary("price").expect("price summary should exist");
    assert_close(summary.value("old system", "fruit", "total").flatten(), 1.0);
}
