//! End-to-end round-trip tests for the table operator protocol.

use std::collections::HashMap;

use kvgraph_core::config::EngineConfig;
use kvgraph_core::dtype::ElementType;
use kvgraph_core::value::{Scalar, Tensor};
use kvgraph_exec::Engine;
use kvgraph_plan::GraphBuilder;
use kvgraph_table::TableSpec;

fn utf8_to_i64() -> TableSpec {
    TableSpec::new(ElementType::Utf8, ElementType::Int64).expect("spec")
}

#[test]
fn lookup_on_fresh_table_returns_defaults() {
    let spec = utf8_to_i64();
    let mut g = GraphBuilder::new();
    let table = g.create_table(spec).expect("create");
    let keys = g.constant(Tensor::from_utf8(["a", "b"])).expect("keys");
    let default = g.constant(Tensor::scalar(Scalar::I64(-1))).expect("default");
    let out = g.find(table, keys, default, spec).expect("find");
    let program = g.build();

    let engine = Engine::new(EngineConfig::default());
    let result = engine.run(&program, &HashMap::new(), &[out]).expect("run");
    assert_eq!(result.tensors[0], Tensor::from_i64([-1, -1]));
}

#[test]
fn bulk_import_round_trips() {
    let spec = utf8_to_i64();
    let mut g = GraphBuilder::new();
    let table = g.create_table(spec).expect("create");
    let keys = g.constant(Tensor::from_utf8(["a", "b", "c"])).expect("keys");
    let values = g.constant(Tensor::from_i64([1, 2, 3])).expect("values");
    let table = g.import_pairs(table, keys, values, spec).expect("import");
    let queries = g.constant(Tensor::from_utf8(["a", "b", "c"])).expect("queries");
    let default = g.constant(Tensor::scalar(Scalar::I64(-1))).expect("default");
    let out = g.find(table, queries, default, spec).expect("find");
    let program = g.build();

    let engine = Engine::new(EngineConfig::default());
    let result = engine.run(&program, &HashMap::new(), &[out]).expect("run");
    assert_eq!(result.tensors[0], Tensor::from_i64([1, 2, 3]));
}

#[test]
fn lookup_output_mirrors_query_order_and_shape() {
    let spec = utf8_to_i64();
    let mut g = GraphBuilder::new();
    let table = g.create_table(spec).expect("create");
    let keys = g.constant(Tensor::from_utf8(["a", "b", "c"])).expect("keys");
    let values = g.constant(Tensor::from_i64([1, 2, 3])).expect("values");
    let table = g.import_pairs(table, keys, values, spec).expect("import");
    // out-of-insertion-order queries with a miss in the middle
    let queries = g.constant(Tensor::from_utf8(["b", "z", "a"])).expect("queries");
    let default = g.constant(Tensor::scalar(Scalar::I64(-1))).expect("default");
    let out = g.find(table, queries, default, spec).expect("find");
    let program = g.build();

    let engine = Engine::new(EngineConfig::default());
    let result = engine.run(&program, &HashMap::new(), &[out]).expect("run");
    let found = &result.tensors[0];
    assert_eq!(found.shape(), &[3]);
    assert_eq!(found, &Tensor::from_i64([2, -1, 1]));
}

#[test]
fn later_import_overwrites_earlier_value() {
    let spec = utf8_to_i64();
    let mut g = GraphBuilder::new();
    let table = g.create_table(spec).expect("create");
    let k1 = g.constant(Tensor::from_utf8(["k"])).expect("k1");
    let v1 = g.constant(Tensor::from_i64([1])).expect("v1");
    let table = g.import_pairs(table, k1, v1, spec).expect("first import");
    let k2 = g.constant(Tensor::from_utf8(["k"])).expect("k2");
    let v2 = g.constant(Tensor::from_i64([2])).expect("v2");
    let table = g.import_pairs(table, k2, v2, spec).expect("second import");
    let queries = g.constant(Tensor::from_utf8(["k"])).expect("queries");
    let default = g.constant(Tensor::scalar(Scalar::I64(-1))).expect("default");
    let out = g.find(table, queries, default, spec).expect("find");
    let program = g.build();

    let engine = Engine::new(EngineConfig::default());
    let result = engine.run(&program, &HashMap::new(), &[out]).expect("run");
    assert_eq!(result.tensors[0], Tensor::from_i64([2]));
}

#[test]
fn duplicate_key_within_one_batch_takes_the_last_value() {
    let spec = utf8_to_i64();
    let mut g = GraphBuilder::new();
    let table = g.create_table(spec).expect("create");
    let keys = g.constant(Tensor::from_utf8(["k", "k"])).expect("keys");
    let values = g.constant(Tensor::from_i64([1, 2])).expect("values");
    let table = g.import_pairs(table, keys, values, spec).expect("import");
    let queries = g.constant(Tensor::from_utf8(["k"])).expect("queries");
    let default = g.constant(Tensor::scalar(Scalar::I64(-1))).expect("default");
    let out = g.find(table, queries, default, spec).expect("find");
    let program = g.build();

    let engine = Engine::new(EngineConfig::default());
    let result = engine.run(&program, &HashMap::new(), &[out]).expect("run");
    assert_eq!(result.tensors[0], Tensor::from_i64([2]));
}

#[test]
fn importing_the_same_batch_twice_is_idempotent() {
    let spec = utf8_to_i64();
    let mut g = GraphBuilder::new();
    let table = g.create_table(spec).expect("create");
    let keys = g.constant(Tensor::from_utf8(["a", "b", "c"])).expect("keys");
    let values = g.constant(Tensor::from_i64([1, 2, 3])).expect("values");
    let table = g.import_pairs(table, keys, values, spec).expect("first import");
    let keys2 = g.constant(Tensor::from_utf8(["a", "b", "c"])).expect("keys2");
    let values2 = g.constant(Tensor::from_i64([1, 2, 3])).expect("values2");
    let table = g.import_pairs(table, keys2, values2, spec).expect("second import");
    let queries = g.constant(Tensor::from_utf8(["a", "b", "c"])).expect("queries");
    let default = g.constant(Tensor::scalar(Scalar::I64(-1))).expect("default");
    let out = g.find(table, queries, default, spec).expect("find");
    let program = g.build();

    let engine = Engine::new(EngineConfig::default());
    let result = engine
        .run(&program, &HashMap::new(), &[table, out])
        .expect("run");
    assert_eq!(result.tensors[1], Tensor::from_i64([1, 2, 3]));

    // entry count is unchanged by the repeat import
    let handle = result.tensors[0].as_handle().expect("handle");
    let live = engine.arena().resolve(handle).expect("resolve");
    assert_eq!(live.len(), 3);
}

#[test]
fn each_create_allocates_a_distinct_table() {
    let spec = utf8_to_i64();
    let mut g = GraphBuilder::new();
    let t1 = g.create_table(spec).expect("create t1");
    let t2 = g.create_table(spec).expect("create t2");
    let keys = g.constant(Tensor::from_utf8(["k"])).expect("keys");
    let values = g.constant(Tensor::from_i64([7])).expect("values");
    let t1 = g.import_pairs(t1, keys, values, spec).expect("import t1");
    // t2 is never populated; a lookup must fall through to the default
    let queries = g.constant(Tensor::from_utf8(["k"])).expect("queries");
    let default = g.constant(Tensor::scalar(Scalar::I64(-1))).expect("default");
    let hit = g.find(t1, queries, default, spec).expect("find t1");
    let queries2 = g.constant(Tensor::from_utf8(["k"])).expect("queries2");
    let default2 = g.constant(Tensor::scalar(Scalar::I64(-1))).expect("default2");
    let miss = g.find(t2, queries2, default2, spec).expect("find t2");
    let program = g.build();

    let engine = Engine::new(EngineConfig::default());
    let result = engine
        .run(&program, &HashMap::new(), &[t1, t2, hit, miss])
        .expect("run");
    let h1 = result.tensors[0].as_handle().expect("h1");
    let h2 = result.tensors[1].as_handle().expect("h2");
    assert_ne!(h1, h2);
    assert_eq!(result.tensors[2], Tensor::from_i64([7]));
    assert_eq!(result.tensors[3], Tensor::from_i64([-1]));
}

#[test]
fn int64_keyed_table_round_trips() {
    let spec = TableSpec::new(ElementType::Int64, ElementType::Utf8).expect("spec");
    let mut g = GraphBuilder::new();
    let table = g.create_table(spec).expect("create");
    let keys = g.constant(Tensor::from_i64([4, 5, 6])).expect("keys");
    let values = g.constant(Tensor::from_utf8(["x", "y", "z"])).expect("values");
    let table = g.import_pairs(table, keys, values, spec).expect("import");
    let queries = g.constant(Tensor::from_i64([6, 4, 9])).expect("queries");
    let default = g
        .constant(Tensor::scalar(Scalar::Str(" ".to_string())))
        .expect("default");
    let out = g.find(table, queries, default, spec).expect("find");
    let program = g.build();

    let engine = Engine::new(EngineConfig::default());
    let result = engine.run(&program, &HashMap::new(), &[out]).expect("run");
    assert_eq!(result.tensors[0], Tensor::from_utf8(["z", "x", " "]));
}

#[test]
fn run_emits_a_manifest_with_a_stable_program_hash() {
    let spec = utf8_to_i64();
    let mut g = GraphBuilder::new();
    let table = g.create_table(spec).expect("create");
    let program = g.build();

    let engine = Engine::new(EngineConfig::default());
    let a = engine
        .run(&program, &HashMap::new(), &[table])
        .expect("first run");
    let b = engine
        .run(&program, &HashMap::new(), &[table])
        .expect("second run");
    assert_eq!(a.manifest.plan_hash, b.manifest.plan_hash);
    assert!(a.manifest.started_ms <= a.manifest.finished_ms);
}
