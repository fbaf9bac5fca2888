use pbxpatch_types::integration::PackageIntegration;
use pbxpatch_types::isa::Isa;
use pbxpatch_types::record::{ObjectId, Record};
use pbxpatch_types::report::{
    MigrationReport, MigrationState, MigrationStatus, StepResult, StepStatus,
};
use pretty_assertions::assert_eq;

#[test]
fn migration_status_serializes_snake_case() {
    let no_op = serde_json::to_value(MigrationStatus::NoOp).expect("serialize");
    let migrated = serde_json::to_value(MigrationStatus::Migrated).expect("serialize");
    let undone = serde_json::to_value(MigrationStatus::Undone).expect("serialize");
    let dry_run = serde_json::to_value(MigrationStatus::DryRun).expect("serialize");

    assert_eq!(no_op, serde_json::json!("no_op"));
    assert_eq!(migrated, serde_json::json!("migrated"));
    assert_eq!(undone, serde_json::json!("undone"));
    assert_eq!(dry_run, serde_json::json!("dry_run"));
}

#[test]
fn migration_state_serializes_snake_case() {
    let value = serde_json::to_value(MigrationState::StepsApplied).expect("serialize");
    assert_eq!(value, serde_json::json!("steps_applied"));
}

#[test]
fn report_new_sets_schema_and_omits_optional_fields() {
    let report = MigrationReport::new("ios/Runner.xcodeproj/project.pbxproj", "abc");
    assert_eq!(report.schema, pbxpatch_types::schema::PBXPATCH_REPORT_V1);
    assert_eq!(report.status, MigrationStatus::NoOp);
    assert_eq!(report.state, MigrationState::NotStarted);

    let value = serde_json::to_value(&report).expect("serialize report");
    assert!(value.get("backup_path").is_none());
    assert!(value.get("sha256_after").is_none());
    assert!(value.get("ended_at").is_none());
    assert_eq!(value["sha256_before"], serde_json::json!("abc"));
}

#[test]
fn report_counts_only_changed_steps() {
    let mut report = MigrationReport::new("project.pbxproj", "abc");
    report.steps = vec![
        StepResult {
            step: "build-file".to_string(),
            status: StepStatus::Applied,
            lines: 1,
        },
        StepResult {
            step: "frameworks-phase".to_string(),
            status: StepStatus::AlreadySatisfied,
            lines: 0,
        },
        StepResult {
            step: "target-product-dependency".to_string(),
            status: StepStatus::Applied,
            lines: 3,
        },
    ];

    let applied: Vec<&str> = report.applied_steps().map(|s| s.step.as_str()).collect();
    assert_eq!(applied, vec!["build-file", "target-product-dependency"]);
    assert_eq!(report.lines_changed(), 4);
}

#[test]
fn record_serializes_isa_as_tag_name() {
    let record = Record {
        id: ObjectId::from("97C146ED1CF9000F007C117D"),
        isa: Isa::NativeTarget,
        fields: [("name".to_string(), serde_json::json!("Runner"))]
            .into_iter()
            .collect(),
    };
    let value = serde_json::to_value(&record).expect("serialize record");
    assert_eq!(value["isa"], serde_json::json!("PBXNativeTarget"));
    assert_eq!(value["id"], serde_json::json!("97C146ED1CF9000F007C117D"));

    let back: Record = serde_json::from_value(value).expect("deserialize record");
    assert_eq!(back, record);
}

#[test]
fn integration_fills_missing_fields_with_defaults() {
    let ids: PackageIntegration = serde_json::from_value(serde_json::json!({
        "target_name": "App",
    }))
    .expect("deserialize integration");
    assert_eq!(ids.target_name, "App");
    assert_eq!(ids.product_name, PackageIntegration::default().product_name);
}
