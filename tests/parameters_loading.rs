use std::io::Write;

use noesis::{NoesisError, Parameters};
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn defaults_are_valid() {
    let params = Parameters::default();
    params.validate().expect("defaults validate");
    assert_eq!(params.seed, 42);
    assert_eq!(params.bag.levels, 100);
    assert_eq!(params.belief_capacity, 7);
    assert_eq!(params.defaults.judgment_priority, 0.8);
}

#[test]
fn concepts_forget_slower_than_task_links() {
    let bag = Parameters::default().bag;
    assert!(bag.concept_forget_rate > bag.task_link_forget_rate);
}

#[test]
fn file_overrides_defaults() {
    let file = config_file(
        r#"
seed = 7
belief_capacity = 3

[bag]
levels = 50
concept_capacity = 200
"#,
    );
    let params = Parameters::load(Some(file.path())).expect("loads");
    assert_eq!(params.seed, 7);
    assert_eq!(params.belief_capacity, 3);
    assert_eq!(params.bag.levels, 50);
    assert_eq!(params.bag.concept_capacity, 200);
    // untouched keys keep their defaults
    assert_eq!(params.bag.task_link_capacity, 20);
    assert_eq!(params.question_capacity, 5);
    assert_eq!(params.defaults.confidence, 0.9);
}

#[test]
fn out_of_range_values_are_refused() {
    let file = config_file("budget_threshold = 1.5\n");
    match Parameters::load(Some(file.path())) {
        Err(NoesisError::Config(message)) => assert!(message.contains("budget_threshold")),
        other => panic!("unexpected {:?}", other.map(|p| p.seed)),
    }
}

#[test]
fn zero_capacity_is_refused() {
    let file = config_file("[bag]\nterm_link_capacity = 0\n");
    assert!(matches!(Parameters::load(Some(file.path())), Err(NoesisError::Config(_))));
}

#[test]
fn malformed_file_is_a_config_error() {
    let file = config_file("seed = [not a number\n");
    assert!(matches!(Parameters::load(Some(file.path())), Err(NoesisError::Config(_))));
}

#[test]
fn missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.toml");
    assert!(matches!(Parameters::load(Some(&path)), Err(NoesisError::Config(_))));
}
