// Copyright 2026 The lca-engine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashMap;

use float_cmp::approx_eq;
use rand::Rng;

use lca_engine::{
    Activity, ActivityKey, Amount, DatabaseKind, ErrorCode, Exchange, InMemoryDatabase, Method,
    ParamDefinition, ParamRegistry, ParamValue, Project, TableSolver, build_expression,
};

fn key(db: &str, code: &str) -> ActivityKey {
    ActivityKey::new(db, code)
}

fn gwp() -> Method {
    Method::new("ReCiPe 2016", "climate change", "GWP100")
}

fn water() -> Method {
    Method::new("ReCiPe 2016", "water use", "AWARE")
}

/// root consumes 0.5 units of bg1 directly and 2 units of a foreground
/// sub-activity that consumes 1 unit of bg2.
fn fixture_db() -> InMemoryDatabase {
    let mut db = InMemoryDatabase::new();
    db.register_database("model", DatabaseKind::Foreground);
    db.register_database("ei", DatabaseKind::Background);
    db.register_database("biosphere3", DatabaseKind::Biosphere);

    db.add_activity(Activity::new(
        key("ei", "bg1"),
        "electricity mix",
        "kilowatt hour",
        vec![],
    ))
    .unwrap();
    db.add_activity(Activity::new(
        key("ei", "bg2"),
        "steel production",
        "kilogram",
        vec![],
    ))
    .unwrap();
    db.add_activity(Activity::new(
        key("model", "sub"),
        "frame",
        "unit",
        vec![Exchange::new(key("ei", "bg2"), Amount::Literal(1.0))],
    ))
    .unwrap();
    db.add_activity(Activity::new(
        key("model", "root"),
        "pv system",
        "kilowatt hour",
        vec![
            Exchange::new(key("ei", "bg1"), Amount::Literal(0.5)),
            Exchange::new(key("model", "sub"), Amount::Literal(2.0)),
        ],
    ))
    .unwrap();
    db
}

fn fixture_solver() -> TableSolver {
    let mut solver = TableSolver::new();
    solver.set_score(key("ei", "bg1"), gwp(), 10.0);
    solver.set_score(key("ei", "bg2"), gwp(), 4.0);
    solver.set_score(key("ei", "bg1"), water(), 0.5);
    solver.set_score(key("ei", "bg2"), water(), 0.25);
    solver
}

fn fixture_project(db: InMemoryDatabase) -> Project {
    let mut registry = ParamRegistry::new();
    registry.register(ParamDefinition::float("p", 3.0));
    registry.register(ParamDefinition::float("q", 1.0));
    Project::new(Box::new(db), registry, Box::new(fixture_solver()))
}

#[test]
fn constant_model_folds_background_scores() {
    let mut project = fixture_project(fixture_db());
    let results = project
        .compute_model(&key("model", "root"), &[gwp()], &HashMap::new())
        .unwrap();

    // 0.5 * 10 + 2 * (1 * 4)
    assert_eq!(Some(13.0), results.value(0, "climate change - GWP100"));
    assert_eq!(vec!["pv system"], results.row_labels().to_vec());
}

#[test]
fn each_method_gets_its_own_column() {
    let mut project = fixture_project(fixture_db());
    let results = project
        .compute_model(&key("model", "root"), &[gwp(), water()], &HashMap::new())
        .unwrap();

    assert_eq!(Some(13.0), results.value(0, "climate change - GWP100"));
    // 0.5 * 0.5 + 2 * 0.25
    assert_eq!(Some(0.75), results.value(0, "water use - AWARE"));
}

#[test]
fn self_loop_output_amount_normalizes_impacts() {
    let mut db = fixture_db();
    db.add_activity(Activity::new(
        key("model", "doubled"),
        "doubled output",
        "unit",
        vec![
            Exchange::new(key("model", "doubled"), Amount::Literal(2.0)),
            Exchange::new(key("ei", "bg1"), Amount::Literal(1.0)),
        ],
    ))
    .unwrap();

    let mut project = fixture_project(db);
    let results = project
        .compute_model(&key("model", "doubled"), &[gwp()], &HashMap::new())
        .unwrap();

    // per unit of output: (1 * 10) / 2
    assert_eq!(Some(5.0), results.value(0, "climate change - GWP100"));
}

#[test]
fn formula_amounts_stay_parametric() {
    let mut db = fixture_db();
    db.add_activity(Activity::new(
        key("model", "parametric"),
        "parametric model",
        "unit",
        vec![
            Exchange::new(key("ei", "bg1"), Amount::Formula("p * 0.5".to_string())),
            Exchange::new(key("ei", "bg2"), Amount::Formula("1 - q".to_string())),
        ],
    ))
    .unwrap();

    let mut project = fixture_project(db);
    let params: HashMap<String, ParamValue> = [
        ("p".to_string(), ParamValue::Scalar(2.0)),
        ("q".to_string(), ParamValue::Scalar(0.25)),
    ]
    .into_iter()
    .collect();
    let results = project
        .compute_model(&key("model", "parametric"), &[gwp()], &params)
        .unwrap();

    // 2 * 0.5 * 10 + (1 - 0.25) * 4
    assert_eq!(Some(13.0), results.value(0, "climate change - GWP100"));
}

#[test]
fn batch_evaluation_matches_scalar_runs() {
    let mut db = fixture_db();
    db.add_activity(Activity::new(
        key("model", "parametric"),
        "parametric model",
        "unit",
        vec![Exchange::new(
            key("ei", "bg1"),
            Amount::Formula("p ^ 2 - q".to_string()),
        )],
    ))
    .unwrap();

    let mut project = fixture_project(db);
    let methods = vec![gwp()];
    let prepared = project.prepare(&key("model", "parametric"), &methods).unwrap();

    let p_samples = vec![0.5, 1.0, 1.5, 2.0, 2.5];
    let q_samples = vec![0.1, 0.2, 0.3, 0.4, 0.5];
    let batch: HashMap<String, ParamValue> = [
        ("p".to_string(), ParamValue::Series(p_samples.clone())),
        ("q".to_string(), ParamValue::Series(q_samples.clone())),
    ]
    .into_iter()
    .collect();
    let batched = project.evaluate(&prepared, &batch, 1.0).unwrap();
    assert_eq!(5, batched.n_rows());

    for i in 0..5 {
        let scalar: HashMap<String, ParamValue> = [
            ("p".to_string(), ParamValue::Scalar(p_samples[i])),
            ("q".to_string(), ParamValue::Scalar(q_samples[i])),
        ]
        .into_iter()
        .collect();
        let single = project.evaluate(&prepared, &scalar, 1.0).unwrap();
        assert!(approx_eq!(
            f64,
            single.value(0, "climate change - GWP100").unwrap(),
            batched.value(i, "climate change - GWP100").unwrap()
        ));
    }
}

#[test]
fn missing_param_uses_registry_default() {
    let mut db = fixture_db();
    db.add_activity(Activity::new(
        key("model", "parametric"),
        "parametric model",
        "unit",
        vec![Exchange::new(
            key("ei", "bg1"),
            Amount::Formula("p".to_string()),
        )],
    ))
    .unwrap();

    let mut project = fixture_project(db);
    let methods = vec![gwp()];
    let prepared = project.prepare(&key("model", "parametric"), &methods).unwrap();

    let defaulted = project.evaluate(&prepared, &HashMap::new(), 1.0).unwrap();
    let explicit_params: HashMap<String, ParamValue> =
        [("p".to_string(), ParamValue::Scalar(3.0))].into_iter().collect();
    let explicit = project.evaluate(&prepared, &explicit_params, 1.0).unwrap();

    assert_eq!(
        explicit.value(0, "climate change - GWP100"),
        defaulted.value(0, "climate change - GWP100")
    );
    assert_eq!(1, defaulted.diagnostics.len());
    assert_eq!(ErrorCode::MissingParameter, defaulted.diagnostics[0].code);
    assert!(explicit.diagnostics.is_empty());
}

#[test]
fn unused_param_is_reported_not_fatal() {
    let mut project = fixture_project(fixture_db());
    let params: HashMap<String, ParamValue> =
        [("q".to_string(), ParamValue::Scalar(7.0))].into_iter().collect();
    let results = project
        .compute_model(&key("model", "root"), &[gwp()], &params)
        .unwrap();

    assert_eq!(Some(13.0), results.value(0, "climate change - GWP100"));
    assert!(
        results
            .diagnostics
            .iter()
            .any(|d| d.code == ErrorCode::UnusedParameter)
    );
}

#[test]
fn mismatched_series_lengths_fail_before_evaluation() {
    let mut db = fixture_db();
    db.add_activity(Activity::new(
        key("model", "parametric"),
        "parametric model",
        "unit",
        vec![Exchange::new(
            key("ei", "bg1"),
            Amount::Formula("p + q".to_string()),
        )],
    ))
    .unwrap();

    let mut project = fixture_project(db);
    let params: HashMap<String, ParamValue> = [
        ("p".to_string(), ParamValue::Series(vec![1.0, 2.0, 3.0])),
        ("q".to_string(), ParamValue::Series(vec![1.0, 2.0])),
    ]
    .into_iter()
    .collect();
    let err = project
        .compute_model(&key("model", "parametric"), &[gwp()], &params)
        .unwrap_err();
    assert_eq!(ErrorCode::ShapeMismatch, err.code);

    // a length-1 series supplied first must not pass as a broadcastable
    // scalar
    let params: HashMap<String, ParamValue> = [
        ("p".to_string(), ParamValue::Series(vec![5.0])),
        ("q".to_string(), ParamValue::Series(vec![1.0, 2.0, 3.0])),
    ]
    .into_iter()
    .collect();
    let err = project
        .compute_model(&key("model", "parametric"), &[gwp()], &params)
        .unwrap_err();
    assert_eq!(ErrorCode::ShapeMismatch, err.code);
}

#[test]
fn enum_param_selects_background_share() {
    let mut db = fixture_db();
    db.add_activity(Activity::new(
        key("model", "grid"),
        "grid mix",
        "kilowatt hour",
        vec![
            Exchange::new(key("ei", "bg1"), Amount::Formula("grid_fr".to_string())),
            Exchange::new(key("ei", "bg2"), Amount::Formula("grid_de".to_string())),
        ],
    ))
    .unwrap();

    let mut registry = ParamRegistry::new();
    registry.register(ParamDefinition::enumerated("grid", &["fr", "de"], "fr"));
    let mut project = Project::new(Box::new(db), registry, Box::new(fixture_solver()));

    // default selection: fr indicator is 1, de is 0
    let results = project
        .compute_model(&key("model", "grid"), &[gwp()], &HashMap::new())
        .unwrap();
    assert_eq!(Some(10.0), results.value(0, "climate change - GWP100"));

    let params: HashMap<String, ParamValue> = [
        ("grid_fr".to_string(), ParamValue::Scalar(0.0)),
        ("grid_de".to_string(), ParamValue::Scalar(1.0)),
    ]
    .into_iter()
    .collect();
    let results = project
        .compute_model(&key("model", "grid"), &[gwp()], &params)
        .unwrap();
    assert_eq!(Some(4.0), results.value(0, "climate change - GWP100"));
}

#[test]
fn biosphere_flow_scored_through_proxy() {
    let mut db = fixture_db();
    db.add_activity(Activity::new(
        key("biosphere3", "co2"),
        "Carbon dioxide, fossil",
        "kilogram",
        vec![],
    ))
    .unwrap();
    db.add_activity(Activity::new(
        key("model", "emitter"),
        "direct emitter",
        "unit",
        vec![Exchange::new(key("biosphere3", "co2"), Amount::Literal(3.0))],
    ))
    .unwrap();

    let mut solver = fixture_solver();
    solver.set_score(key("model", "co2#asTech"), gwp(), 1.0);

    let registry = ParamRegistry::new();
    let mut project = Project::new(Box::new(db), registry, Box::new(solver));

    let methods = vec![gwp()];
    let prepared = project.prepare(&key("model", "emitter"), &methods).unwrap();
    let results = project.evaluate(&prepared, &HashMap::new(), 1.0).unwrap();
    assert_eq!(Some(3.0), results.value(0, "climate change - GWP100"));

    // preparing again must reuse the proxy, not duplicate it
    project.prepare(&key("model", "emitter"), &methods).unwrap();
}

#[test]
fn symbols_are_exactly_the_background_leaves() {
    let mut db = fixture_db();
    let built = build_expression(&mut db, &key("model", "root")).unwrap();

    let mut activities = built.symbols.activities();
    activities.sort();
    assert_eq!(vec![key("ei", "bg1"), key("ei", "bg2")], activities);
    // the foreground sub-activity was inlined, not symbolized
    assert_eq!(2, built.symbols.len());
}

#[test]
fn stacked_models_keep_rows_and_params_separate() {
    let mut db = fixture_db();
    db.add_activity(Activity::new(
        key("model", "a"),
        "model a",
        "unit",
        vec![Exchange::new(
            key("ei", "bg1"),
            Amount::Formula("p".to_string()),
        )],
    ))
    .unwrap();
    db.add_activity(Activity::new(
        key("model", "b"),
        "model b",
        "unit",
        vec![Exchange::new(
            key("ei", "bg2"),
            Amount::Formula("q".to_string()),
        )],
    ))
    .unwrap();

    let mut project = fixture_project(db);
    let params: HashMap<String, ParamValue> = [
        ("p".to_string(), ParamValue::Scalar(2.0)),
        ("q".to_string(), ParamValue::Scalar(5.0)),
    ]
    .into_iter()
    .collect();
    let results = project
        .compute_models(
            &[(key("model", "a"), 1.0), (key("model", "b"), 2.0)],
            &[gwp()],
            &params,
        )
        .unwrap();

    assert_eq!(2, results.n_rows());
    assert_eq!(vec!["model a", "model b"], results.row_labels().to_vec());
    assert_eq!(Some(20.0), results.value(0, "climate change - GWP100"));
    // q * 4, scaled by 2
    assert_eq!(Some(40.0), results.value(1, "climate change - GWP100"));
}

#[test]
fn stacked_batch_rows_are_labeled_per_model() {
    let mut db = fixture_db();
    db.add_activity(Activity::new(
        key("model", "a"),
        "model a",
        "unit",
        vec![Exchange::new(
            key("ei", "bg1"),
            Amount::Formula("p".to_string()),
        )],
    ))
    .unwrap();

    let mut project = fixture_project(db);
    let params: HashMap<String, ParamValue> =
        [("p".to_string(), ParamValue::Series(vec![1.0, 2.0]))].into_iter().collect();
    let results = project
        .compute_models(
            &[(key("model", "a"), 1.0), (key("model", "root"), 1.0)],
            &[gwp()],
            &params,
        )
        .unwrap();

    assert_eq!(
        vec!["model a[0]", "model a[1]", "pv system"],
        results.row_labels().to_vec()
    );
}

#[test]
fn random_batch_matches_scalar_loop() {
    let mut db = fixture_db();
    db.add_activity(Activity::new(
        key("model", "parametric"),
        "parametric model",
        "unit",
        vec![
            Exchange::new(
                key("ei", "bg1"),
                Amount::Formula("0.3 * p + q / 2".to_string()),
            ),
            Exchange::new(key("ei", "bg2"), Amount::Formula("-p * q".to_string())),
        ],
    ))
    .unwrap();

    let mut project = fixture_project(db);
    let methods = vec![gwp(), water()];
    let prepared = project.prepare(&key("model", "parametric"), &methods).unwrap();

    let mut rng = rand::rng();
    let n = 100;
    let p_samples: Vec<f64> = (0..n).map(|_| rng.random_range(0.0..10.0)).collect();
    let q_samples: Vec<f64> = (0..n).map(|_| rng.random_range(-1.0..1.0)).collect();

    let batch: HashMap<String, ParamValue> = [
        ("p".to_string(), ParamValue::Series(p_samples.clone())),
        ("q".to_string(), ParamValue::Series(q_samples.clone())),
    ]
    .into_iter()
    .collect();
    let batched = project.evaluate(&prepared, &batch, 1.0).unwrap();

    for i in 0..n {
        let scalar: HashMap<String, ParamValue> = [
            ("p".to_string(), ParamValue::Scalar(p_samples[i])),
            ("q".to_string(), ParamValue::Scalar(q_samples[i])),
        ]
        .into_iter()
        .collect();
        let single = project.evaluate(&prepared, &scalar, 1.0).unwrap();
        for method in ["climate change - GWP100", "water use - AWARE"] {
            assert!(approx_eq!(
                f64,
                single.value(0, method).unwrap(),
                batched.value(i, method).unwrap(),
                ulps = 4
            ));
        }
    }
}
