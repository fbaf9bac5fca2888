//! Steps exercised one at a time, and in arbitrary order.

use fs_err as fs;
use pbxpatch_domain::{MigrationStep, Migrator, builtin_steps};
use pbxpatch_edit::{Document, EditError, EditResult, GraphDecoder, OpenStepDecoder};
use pbxpatch_types::integration::PackageIntegration;
use pbxpatch_types::report::StepStatus;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::Value;
use std::path::PathBuf;

fn fixture(name: &str, file: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../tests/fixtures")
        .join(name)
        .join(file);
    fs::read_to_string(path).expect("read fixture")
}

fn step<'a>(steps: &'a [Box<dyn MigrationStep>], key: &str) -> &'a dyn MigrationStep {
    steps
        .iter()
        .find(|s| s.key() == key)
        .map(|s| s.as_ref())
        .unwrap_or_else(|| panic!("no step {key}"))
}

fn apply_one(doc: &mut Document, step: &dyn MigrationStep) -> usize {
    let snapshot = doc.snapshot().expect("snapshot");
    if step.is_satisfied(&snapshot).expect("predicate") {
        return 0;
    }
    step.apply(doc, &snapshot).expect("apply")
}

#[test]
fn builtin_steps_have_a_fixed_order() {
    let steps = builtin_steps(&PackageIntegration::default());
    let keys: Vec<&str> = steps.iter().map(|s| s.key()).collect();
    assert_eq!(
        keys,
        vec![
            "build-file",
            "frameworks-phase",
            "package-reference",
            "product-dependency",
            "frameworks-phase-link",
            "frameworks-file",
            "project-package-reference",
            "target-product-dependency",
        ]
    );
    assert!(steps.iter().all(|s| !s.describe().is_empty()));
}

#[test]
fn each_step_alone_changes_only_its_own_predicate() {
    let project = fixture("pre_migration", "project.pbxproj");
    let steps = builtin_steps(&PackageIntegration::default());
    let migrator = Migrator::new(&PackageIntegration::default());
    let pending_before = migrator.pending(&Document::from_text(&project)).expect("pending");
    assert_eq!(pending_before.len(), 6);

    for key in pending_before.clone() {
        let mut doc = Document::from_text(&project);
        let inserted = apply_one(&mut doc, step(&steps, key));
        assert!(inserted > 0, "{key} inserted nothing");

        let pending = migrator.pending(&doc).expect("pending");
        let expected: Vec<&str> = pending_before.iter().copied().filter(|k| *k != key).collect();
        assert_eq!(pending, expected, "after applying {key}");

        // Idempotent on its own.
        assert_eq!(apply_one(&mut doc, step(&steps, key)), 0);
    }
}

#[test]
fn one_step_already_applied_leaves_five_and_keeps_its_lines() {
    let project = fixture("pre_migration", "project.pbxproj");
    let expected = fixture("pre_migration", "expected.pbxproj");
    let steps = builtin_steps(&PackageIntegration::default());

    let mut doc = Document::from_text(&project);
    apply_one(&mut doc, step(&steps, "product-dependency"));
    let partial = doc.clone();

    let migrator = Migrator::new(&PackageIntegration::default());
    let results = migrator.apply(&mut doc).expect("apply");
    let applied: Vec<&str> = results
        .iter()
        .filter(|r| r.status == StepStatus::Applied)
        .map(|r| r.step.as_str())
        .collect();
    assert_eq!(applied.len(), 5);
    assert!(!applied.contains(&"product-dependency"));
    assert_eq!(doc.to_text(), expected);

    let block: Vec<String> = partial
        .lines()
        .iter()
        .skip_while(|l| !l.starts_with("/* Begin XCSwiftPackageProductDependency"))
        .take(6)
        .cloned()
        .collect();
    let start = doc
        .lines()
        .iter()
        .position(|l| l == &block[0])
        .expect("section kept");
    assert_eq!(&doc.lines()[start..start + block.len()], block.as_slice());
}

#[test]
fn missing_target_is_record_not_found() {
    let project = fixture("pre_migration", "project.pbxproj");
    let integration = PackageIntegration {
        target_name: "Missing".to_string(),
        ..PackageIntegration::default()
    };
    let migrator = Migrator::new(&integration);
    let mut doc = Document::from_text(&project);
    let err = migrator.apply(&mut doc).unwrap_err();
    assert_eq!(
        err,
        EditError::RecordNotFound {
            section: "PBXNativeTarget".to_string(),
            id: "Missing".to_string(),
        }
    );
}

#[test]
fn link_step_alone_links_a_declared_phase() {
    let project = fixture("no_frameworks_phase", "project.pbxproj");
    let steps = builtin_steps(&PackageIntegration::default());

    let mut doc = Document::from_text(&project);
    let snapshot = doc.snapshot().expect("snapshot");
    let err = step(&steps, "frameworks-file")
        .apply(&mut doc, &snapshot)
        .unwrap_err();
    assert!(matches!(err, EditError::RecordNotFound { .. }), "{err:?}");

    apply_one(&mut doc, step(&steps, "frameworks-phase"));
    apply_one(&mut doc, step(&steps, "frameworks-phase-link"));
    let snapshot = doc.snapshot().expect("snapshot");
    let graph = snapshot.graph();
    let target = graph.native_target_named("Runner").expect("target");
    let phase = graph.frameworks_phase_of(target).expect("linked");
    assert_eq!(phase.id.as_str(), "78DABEA22ED26510000E7860");
}

/// Hides one record from the object graph so the two views disagree.
struct DroppingDecoder(&'static str);

impl GraphDecoder for DroppingDecoder {
    fn decode(&self, text: &str) -> EditResult<Value> {
        let mut tree = OpenStepDecoder.decode(text)?;
        if let Some(objects) = tree.get_mut("objects").and_then(Value::as_object_mut) {
            objects.remove(self.0);
        }
        Ok(tree)
    }
}

#[test]
fn disagreeing_views_abort_before_any_step() {
    let project = fixture("pre_migration", "project.pbxproj");
    let migrator = Migrator::new(&PackageIntegration::default())
        .with_decoder(Box::new(DroppingDecoder("97C146EB1CF9000F007C117D")));

    let mut doc = Document::from_text(&project);
    let err = migrator.apply(&mut doc).unwrap_err();
    assert!(
        matches!(err, EditError::LocatorMismatch { ref id, .. } if id == "97C146EB1CF9000F007C117D"),
        "{err:?}"
    );
    assert_eq!(doc.to_text(), project);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_subset_in_any_order_converges(
        order in Just((0..8usize).collect::<Vec<_>>()).prop_shuffle(),
        take in 0..=8usize,
    ) {
        let project = fixture("pre_migration", "project.pbxproj");
        let expected = fixture("pre_migration", "expected.pbxproj");
        let steps = builtin_steps(&PackageIntegration::default());

        let mut doc = Document::from_text(&project);
        for &i in order.iter().take(take) {
            apply_one(&mut doc, steps[i].as_ref());
        }

        let migrator = Migrator::new(&PackageIntegration::default());
        migrator.apply(&mut doc).expect("apply");
        prop_assert_eq!(doc.to_text(), expected);
    }
}
