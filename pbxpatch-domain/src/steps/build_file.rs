use crate::steps::MigrationStep;
use pbxpatch_edit::{Document, EditResult, Snapshot, insert_record};
use pbxpatch_types::integration::PackageIntegration;
use pbxpatch_types::isa::Isa;
use pbxpatch_types::record::ObjectId;

/// Declares the `PBXBuildFile` that links the package product.
pub struct BuildFileStep {
    id: ObjectId,
    line: String,
}

impl BuildFileStep {
    const KEY: &'static str = "build-file";

    pub fn new(integration: &PackageIntegration) -> Self {
        let product = &integration.product_name;
        Self {
            id: integration.build_file_id.clone(),
            line: format!(
                "\t\t{} /* {product} in Frameworks */ = {{isa = PBXBuildFile; productRef = {} /* {product} */; }};",
                integration.build_file_id, integration.product_dependency_id
            ),
        }
    }
}

impl MigrationStep for BuildFileStep {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn describe(&self) -> String {
        format!("declare PBXBuildFile {}", self.id)
    }

    fn is_satisfied(&self, snapshot: &Snapshot) -> EditResult<bool> {
        Ok(snapshot.graph().contains(&self.id, &Isa::BuildFile))
    }

    fn apply(&self, doc: &mut Document, snapshot: &Snapshot) -> EditResult<usize> {
        insert_record(doc, snapshot, &Isa::BuildFile, &self.id, &[self.line.clone()])
    }

    fn undo_fragments(&self) -> Vec<Vec<String>> {
        vec![vec![self.line.clone()]]
    }

    fn owned_section(&self) -> Option<Isa> {
        Some(Isa::BuildFile)
    }
}
