#![allow(dead_code)]

use letxbe::model::{LabelPrediction, ResultMap, ResultNode, Value};
use letxbe::SaverArg;
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use serde_json::{json, Value as JsonValue};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_key() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,7}"
}

pub fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e9f64..1.0e9).prop_map(Value::Float),
        "[ -~]{0,16}".prop_map(Value::Str),
    ]
}

pub fn arb_label() -> impl Strategy<Value = LabelPrediction> {
    (
        "[a-z0-9]{12}",
        proptest::option::of(arb_value()),
        proptest::option::of(0.0f64..=100.0),
    )
        .prop_map(|(lid, value, score)| {
            let label = match value {
                Some(value) => LabelPrediction::new(value),
                None => LabelPrediction::absent(),
            }
            .with_lid(lid);
            match score {
                Some(score) => label.with_score(score).expect("score in range"),
                None => label,
            }
        })
}

/// Result nodes respecting the two-level list cap, empty lists included.
pub fn arb_result_node() -> BoxedStrategy<ResultNode<LabelPrediction>> {
    let leaf = prop_oneof![
        arb_label().prop_map(ResultNode::Label),
        vec(arb_label(), 0..4).prop_map(ResultNode::Labels),
        vec(vec(arb_label(), 0..3), 0..3).prop_map(ResultNode::LabelGrid),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            btree_map(arb_key(), inner.clone(), 0..4)
                .prop_map(|map| ResultNode::Nested(map.into_iter().collect())),
            vec(btree_map(arb_key(), inner, 0..3), 0..3).prop_map(|maps| {
                ResultNode::NestedList(maps.into_iter().map(|m| m.into_iter().collect()).collect())
            }),
        ]
    })
    .boxed()
}

pub fn arb_result_map() -> impl Strategy<Value = ResultMap<LabelPrediction>> {
    btree_map(arb_key(), arb_result_node(), 0..5).prop_map(|map| map.into_iter().collect())
}

/// Shape of one saved element: `None` for a single object, `Some(n)` for a list of `n`.
pub fn arb_saver_shape() -> impl Strategy<Value = Vec<Option<usize>>> {
    vec(prop_oneof![Just(None), (0usize..45).prop_map(Some)], 1..5)
}

pub fn saver_data(shape: &[Option<usize>]) -> Vec<SaverArg> {
    shape
        .iter()
        .enumerate()
        .map(|(position, len)| match len {
            None => SaverArg::Json(json!({"position": position})),
            Some(len) => SaverArg::Json(JsonValue::Array(
                (0..*len)
                    .map(|index| json!({"position": position, "index": index}))
                    .collect(),
            )),
        })
        .collect()
}
