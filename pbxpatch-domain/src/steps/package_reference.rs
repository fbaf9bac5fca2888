use crate::steps::{MigrationStep, project, reference_fragments};
use pbxpatch_edit::{
    Document, EditResult, Snapshot, insert_record, insert_reference, reference_text,
};
use pbxpatch_types::integration::PackageIntegration;
use pbxpatch_types::isa::Isa;
use pbxpatch_types::record::ObjectId;

fn comment(package_path: &str) -> String {
    format!("XCLocalSwiftPackageReference \"{package_path}\"")
}

/// Declares the `XCLocalSwiftPackageReference` for the package directory.
pub struct PackageReferenceStep {
    id: ObjectId,
    block: Vec<String>,
}

impl PackageReferenceStep {
    const KEY: &'static str = "package-reference";

    pub fn new(integration: &PackageIntegration) -> Self {
        let id = integration.package_reference_id.clone();
        let path = &integration.package_path;
        let block = vec![
            format!("\t\t{id} /* {} */ = {{", comment(path)),
            "\t\t\tisa = XCLocalSwiftPackageReference;".to_string(),
            format!("\t\t\trelativePath = {path};"),
            "\t\t};".to_string(),
        ];
        Self { id, block }
    }
}

impl MigrationStep for PackageReferenceStep {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn describe(&self) -> String {
        format!("declare XCLocalSwiftPackageReference {}", self.id)
    }

    fn is_satisfied(&self, snapshot: &Snapshot) -> EditResult<bool> {
        Ok(snapshot
            .graph()
            .contains(&self.id, &Isa::LocalSwiftPackageReference))
    }

    fn apply(&self, doc: &mut Document, snapshot: &Snapshot) -> EditResult<usize> {
        insert_record(doc, snapshot, &Isa::LocalSwiftPackageReference, &self.id, &self.block)
    }

    fn undo_fragments(&self) -> Vec<Vec<String>> {
        vec![self.block.clone()]
    }

    fn owned_section(&self) -> Option<Isa> {
        Some(Isa::LocalSwiftPackageReference)
    }
}

/// Lists the package reference in the root project's `packageReferences`.
pub struct ProjectPackageReferenceStep {
    id: ObjectId,
    comment: String,
}

impl ProjectPackageReferenceStep {
    const KEY: &'static str = "project-package-reference";
    const FIELD: &'static str = "packageReferences";

    pub fn new(integration: &PackageIntegration) -> Self {
        Self {
            id: integration.package_reference_id.clone(),
            comment: comment(&integration.package_path),
        }
    }
}

impl MigrationStep for ProjectPackageReferenceStep {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn describe(&self) -> String {
        format!("add {} to the root project ({})", self.id, Self::FIELD)
    }

    fn is_satisfied(&self, snapshot: &Snapshot) -> EditResult<bool> {
        Ok(project(snapshot)?.references(Self::FIELD, &self.id))
    }

    fn apply(&self, doc: &mut Document, snapshot: &Snapshot) -> EditResult<usize> {
        let project = project(snapshot)?;
        insert_reference(
            doc,
            snapshot,
            &Isa::Project,
            &project.id,
            Self::FIELD,
            &self.id,
            &self.comment,
        )
    }

    fn undo_fragments(&self) -> Vec<Vec<String>> {
        reference_fragments(Self::FIELD, reference_text(&self.id, &self.comment))
    }
}
