use pbxpatch_edit::{Document, EditError, EditResult, Snapshot};
use pbxpatch_types::integration::PackageIntegration;
use pbxpatch_types::isa::Isa;
use pbxpatch_types::record::Record;

mod build_file;
mod frameworks;
mod package_reference;
mod product_dependency;

/// One atomic, independently idempotent transformation toward the migrated
/// state.
pub trait MigrationStep {
    /// Stable kebab-case key, used in reports and on the command line.
    fn key(&self) -> &'static str;

    fn describe(&self) -> String;

    /// Whether the step's target state already holds in `snapshot`.
    fn is_satisfied(&self, snapshot: &Snapshot) -> EditResult<bool>;

    /// Mutate `doc` so the step holds. `snapshot` must describe `doc` as it is
    /// now. Returns the number of lines inserted.
    fn apply(&self, doc: &mut Document, snapshot: &Snapshot) -> EditResult<usize>;

    /// Literal line runs this step may have inserted, largest first.
    fn undo_fragments(&self) -> Vec<Vec<String>>;

    /// Section this step may have created.
    fn owned_section(&self) -> Option<Isa> {
        None
    }
}

/// The migration steps in application order: declarations first, then the
/// hierarchy, build phase, project and target entries that point at them.
pub fn builtin_steps(integration: &PackageIntegration) -> Vec<Box<dyn MigrationStep>> {
    vec![
        Box::new(build_file::BuildFileStep::new(integration)),
        Box::new(frameworks::FrameworksPhaseStep::new(integration)),
        Box::new(package_reference::PackageReferenceStep::new(integration)),
        Box::new(product_dependency::ProductDependencyStep::new(integration)),
        Box::new(frameworks::FrameworksPhaseLinkStep::new(integration)),
        Box::new(frameworks::FrameworksFileStep::new(integration)),
        Box::new(package_reference::ProjectPackageReferenceStep::new(integration)),
        Box::new(product_dependency::TargetProductDependencyStep::new(integration)),
    ]
}

pub(crate) fn target<'a>(snapshot: &'a Snapshot, name: &str) -> EditResult<&'a Record> {
    snapshot
        .graph()
        .native_target_named(name)
        .ok_or_else(|| EditError::RecordNotFound {
            section: Isa::NativeTarget.to_string(),
            id: name.to_string(),
        })
}

pub(crate) fn project(snapshot: &Snapshot) -> EditResult<&Record> {
    snapshot
        .graph()
        .project()
        .ok_or_else(|| EditError::RecordNotFound {
            section: Isa::Project.to_string(),
            id: snapshot
                .graph()
                .root_object
                .as_ref()
                .map_or_else(|| "rootObject".to_string(), ToString::to_string),
        })
}

/// `field = (`, the entry, `);` as inserted for an absent list, then the
/// entry alone as inserted into an existing one.
pub(crate) fn reference_fragments(field: &str, entry: String) -> Vec<Vec<String>> {
    vec![
        vec![format!("{field} = ("), entry.clone(), ");".to_string()],
        vec![entry],
    ]
}
