use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Value, json};
use storyscript::semantics::{CapabilityRegistry, ServiceSignature};
use storyscript::{Bundle, CompileOptions};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("storyscript-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn failures_are_attributed_to_their_story() {
    let bundle = Bundle::from_map([
        ("first.story", "a = 1\n"),
        ("second.story", "b = \n"),
        ("third.story", "c = 3\n"),
    ]);
    let result = bundle.compile(&CompileOptions::new());

    assert!(result.story("first.story").unwrap().is_success());
    assert!(result.story("third.story").unwrap().is_success());
    let err = result.check_success().unwrap_err();
    assert_eq!(err.story(), "second.story");
    assert_eq!(err.code_str(), "E0007");
    assert!(err.message().contains("in second.story at line 1"), "{}", err.message());
}

#[test]
fn results_do_not_depend_on_scheduling() {
    let sources: Vec<(String, String)> = (0..16)
        .map(|i| (format!("s{i}.story"), format!("x = {i}\ny = x + undefined_{i}\n")))
        .collect();
    let options = CompileOptions::new();
    let first = Bundle::from_map(sources.clone()).compile(&options);
    let second = Bundle::from_map(sources).compile(&options);
    for (name, story) in &first.stories {
        let other = second.story(name).unwrap();
        assert_eq!(story.diagnostics(), other.diagnostics());
        assert_eq!(story.errors()[0].story(), name.as_str());
    }
}

#[derive(Debug)]
struct Exploding;

impl CapabilityRegistry for Exploding {
    fn lookup(&self, _service: &str) -> Option<&ServiceSignature> {
        panic!("hub unreachable")
    }
}

#[test]
fn internal_errors_stay_opaque() {
    let bundle = Bundle::from_map([("ok.story", "a = 1\n"), ("svc.story", "http fetch\n")]);
    let options = CompileOptions::new().with_registry(Arc::new(Exploding));
    let result = bundle.compile(&options);

    assert!(result.story("ok.story").unwrap().is_success());
    let errors = result.story("svc.story").unwrap().errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code_str(), "E0001");
    assert!(!errors[0].message().contains("hub unreachable"));
}

#[test]
fn bundle_document() {
    let bundle = Bundle::from_map([
        ("empty.story", "// nothing\n"),
        ("calls.story", "x = slack send\ny = http fetch\n"),
        ("broken.story", "z = \n"),
    ]);
    let document = bundle.compile(&CompileOptions::new()).result(false).unwrap();

    assert_eq!(document["services"], json!(["http", "slack"]));
    assert_eq!(document["entrypoint"], json!(["calls.story", "empty.story"]));
    assert_eq!(document["stories"]["empty.story"]["script"], json!({}));
    assert_eq!(document["stories"]["empty.story"]["entrypoint"], Value::Null);
    assert!(document["stories"].get("broken.story").is_none());
}

#[test]
fn concise_bundle_document() {
    let bundle = Bundle::from_map([("a.story", "a = 0\n"), ("b.story", "// nothing\n")]);
    let options = CompileOptions::new().concise(true);
    let document = bundle.compile(&options).output(&options).unwrap();

    assert!(document.get("services").is_none());
    assert_eq!(document["stories"]["a.story"]["script"]["1"]["args"][0]["int"], 0);
    assert!(document["stories"]["a.story"]["script"]["1"].get("next").is_none());
    assert!(document["stories"]["b.story"].get("script").is_none());
}

#[test]
fn first_story_of_a_single_bundle() {
    let options = CompileOptions::new();
    let result = Bundle::from_string("a = 1\n").compile(&options);
    let story = result.first().unwrap();
    assert_eq!(story.story, "story");
    assert!(story.is_success());

    assert!(Bundle::new().compile(&options).first().is_none());
}

#[test]
fn reading_files() {
    let dir = scratch_dir("read");
    let good = dir.join("good.story");
    fs::write(&good, "a = 1\n").unwrap();
    let missing = dir.join("missing.story");

    let bundle = Bundle::read([&good, &missing]);
    assert_eq!(bundle.len(), 2);
    let result = bundle.compile(&CompileOptions::new());

    let missing_name = missing.display().to_string();
    let errors = result.story(&missing_name).unwrap().errors();
    assert_eq!(errors[0].code_str(), "E0046");
    assert_eq!(errors[0].story(), missing_name);
    assert_eq!(result.errors().len(), 1);

    fs::remove_dir_all(&dir).unwrap();
}
