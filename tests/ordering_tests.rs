//! Ordering and concurrency: the handle dependency chain is the only
//! mechanism serializing mutation before reads.

use std::collections::HashMap;
use std::sync::Arc;

use kvgraph_core::config::EngineConfig;
use kvgraph_core::dtype::ElementType;
use kvgraph_core::error::Error;
use kvgraph_core::value::{Scalar, Tensor, TensorMeta};
use kvgraph_exec::{Engine, ExecError};
use kvgraph_ops::find::TableFind;
use kvgraph_ops::Operator;
use kvgraph_plan::GraphBuilder;
use kvgraph_table::{TableArena, TableSpec};

fn utf8_to_i64() -> TableSpec {
    TableSpec::new(ElementType::Utf8, ElementType::Int64).expect("spec")
}

#[test]
fn a_lookup_downstream_of_chained_imports_sees_every_mutation() {
    let spec = utf8_to_i64();
    let mut g = GraphBuilder::new();
    let table = g.create_table(spec).expect("create");
    let k1 = g.constant(Tensor::from_utf8(["a"])).expect("k1");
    let v1 = g.constant(Tensor::from_i64([1])).expect("v1");
    let table = g.import_pairs(table, k1, v1, spec).expect("first import");
    let k2 = g.constant(Tensor::from_utf8(["b"])).expect("k2");
    let v2 = g.constant(Tensor::from_i64([2])).expect("v2");
    let table = g.import_pairs(table, k2, v2, spec).expect("second import");
    let queries = g.constant(Tensor::from_utf8(["a", "b"])).expect("queries");
    let default = g.constant(Tensor::scalar(Scalar::I64(-1))).expect("default");
    let out = g.find(table, queries, default, spec).expect("find");
    let program = g.build();

    let engine = Engine::new(EngineConfig::default());
    let result = engine.run(&program, &HashMap::new(), &[out]).expect("run");
    assert_eq!(result.tensors[0], Tensor::from_i64([1, 2]));
}

#[test]
fn a_mutator_re_emits_a_handle_for_the_same_table() {
    let spec = utf8_to_i64();
    let mut g = GraphBuilder::new();
    let created = g.create_table(spec).expect("create");
    let keys = g.constant(Tensor::from_utf8(["a"])).expect("keys");
    let values = g.constant(Tensor::from_i64([1])).expect("values");
    let imported = g.import_pairs(created, keys, values, spec).expect("import");
    assert_ne!(created, imported, "the post-mutation handle is a new node");
    let program = g.build();

    let engine = Engine::new(EngineConfig::default());
    let result = engine
        .run(&program, &HashMap::new(), &[created, imported])
        .expect("run");
    let before = result.tensors[0].as_handle().expect("before");
    let after = result.tensors[1].as_handle().expect("after");
    // same table, later version: aliasing is intentional
    assert_eq!(before, after);
}

#[test]
fn lookups_fan_out_from_one_populated_handle() {
    let spec = utf8_to_i64();
    let mut g = GraphBuilder::new();
    let table = g.create_table(spec).expect("create");
    let keys = g.constant(Tensor::from_utf8(["a", "b"])).expect("keys");
    let values = g.constant(Tensor::from_i64([1, 2])).expect("values");
    let table = g.import_pairs(table, keys, values, spec).expect("import");
    let q1 = g.constant(Tensor::from_utf8(["a"])).expect("q1");
    let d1 = g.constant(Tensor::scalar(Scalar::I64(-1))).expect("d1");
    let first = g.find(table, q1, d1, spec).expect("first find");
    let q2 = g.constant(Tensor::from_utf8(["b"])).expect("q2");
    let d2 = g.constant(Tensor::scalar(Scalar::I64(-1))).expect("d2");
    let second = g.find(table, q2, d2, spec).expect("second find");
    let program = g.build();

    let engine = Engine::new(EngineConfig::default());
    let result = engine
        .run(&program, &HashMap::new(), &[first, second])
        .expect("run");
    assert_eq!(result.tensors[0], Tensor::from_i64([1]));
    assert_eq!(result.tensors[1], Tensor::from_i64([2]));
}

#[test]
fn concurrent_lookups_with_disjoint_queries_are_independent() {
    let spec = utf8_to_i64();
    let arena = Arc::new(TableArena::new());
    let handle = arena.create(spec);
    let table = arena.resolve(handle).expect("resolve");

    let keys = Tensor::from_utf8((0..100).map(|i| format!("k{i}")));
    let values = Tensor::from_i64((0..100).map(i64::from));
    table.import(&keys, &values).expect("import");

    let op = Arc::new(TableFind::new(spec));
    let mut workers = Vec::new();
    for t in 0..4i64 {
        let arena = Arc::clone(&arena);
        let op = Arc::clone(&op);
        workers.push(std::thread::spawn(move || {
            let queries = Tensor::from_utf8((0..25).map(|i| format!("k{}", t * 25 + i)));
            let default = Tensor::scalar(Scalar::I64(-1));
            let out = op
                .eval(&[Tensor::handle(handle), queries, default], &arena)
                .expect("find");
            let expected = Tensor::from_i64((0..25).map(|i| t * 25 + i));
            assert_eq!(out, expected);
        }));
    }
    for w in workers {
        w.join().expect("join");
    }
}

#[test]
fn input_fed_queries_run_against_the_populated_table() {
    let spec = utf8_to_i64();
    let mut g = GraphBuilder::new();
    let table = g.create_table(spec).expect("create");
    let keys = g.constant(Tensor::from_utf8(["a", "b"])).expect("keys");
    let values = g.constant(Tensor::from_i64([1, 2])).expect("values");
    let table = g.import_pairs(table, keys, values, spec).expect("import");
    let queries = g
        .input("queries", TensorMeta::new(ElementType::Utf8, vec![2]))
        .expect("input");
    let default = g.constant(Tensor::scalar(Scalar::I64(-1))).expect("default");
    let out = g.find(table, queries, default, spec).expect("find");
    let program = g.build();

    let engine = Engine::new(EngineConfig::default());

    let mut feeds = HashMap::new();
    feeds.insert("queries".to_string(), Tensor::from_utf8(["a", "z"]));
    let result = engine.run(&program, &feeds, &[out]).expect("first run");
    assert_eq!(result.tensors[0], Tensor::from_i64([1, -1]));

    feeds.insert("queries".to_string(), Tensor::from_utf8(["b", "a"]));
    let result = engine.run(&program, &feeds, &[out]).expect("second run");
    assert_eq!(result.tensors[0], Tensor::from_i64([2, 1]));
}

#[test]
fn a_feed_with_the_wrong_dtype_is_rejected_before_the_lookup_runs() {
    let spec = utf8_to_i64();
    let mut g = GraphBuilder::new();
    let table = g.create_table(spec).expect("create");
    let queries = g
        .input("queries", TensorMeta::new(ElementType::Utf8, vec![1]))
        .expect("input");
    let default = g.constant(Tensor::scalar(Scalar::I64(-1))).expect("default");
    let out = g.find(table, queries, default, spec).expect("find");
    let program = g.build();

    let engine = Engine::new(EngineConfig::default());
    let mut feeds = HashMap::new();
    feeds.insert("queries".to_string(), Tensor::from_i64([7]));
    let err = engine.run(&program, &feeds, &[out]).unwrap_err();
    assert!(
        matches!(err, ExecError::Operator(Error::TypeMismatch(_))),
        "got {err:?}"
    );
}

#[test]
fn a_missing_feed_fails_the_run() {
    let spec = utf8_to_i64();
    let mut g = GraphBuilder::new();
    let _table = g.create_table(spec).expect("create");
    let queries = g
        .input("queries", TensorMeta::new(ElementType::Utf8, vec![1]))
        .expect("input");
    let program = g.build();

    let engine = Engine::new(EngineConfig::default());
    let err = engine
        .run(&program, &HashMap::new(), &[queries])
        .unwrap_err();
    assert!(matches!(err, ExecError::Invalid(_)), "got {err:?}");
}
