//! Frameworks build phase steps: declare a phase when the target has none,
//! link it from the target, and list the package's build file in it.

use crate::steps::{MigrationStep, target};
use pbxpatch_edit::{
    Document, EditError, EditResult, Snapshot, insert_record, insert_reference, reference_text,
};
use pbxpatch_types::integration::PackageIntegration;
use pbxpatch_types::isa::Isa;
use pbxpatch_types::record::ObjectId;

pub struct FrameworksPhaseStep {
    target_name: String,
    id: ObjectId,
    block: Vec<String>,
}

impl FrameworksPhaseStep {
    const KEY: &'static str = "frameworks-phase";

    pub fn new(integration: &PackageIntegration) -> Self {
        let id = integration.frameworks_phase_id.clone();
        let block = vec![
            format!("\t\t{id} /* Frameworks */ = {{"),
            "\t\t\tisa = PBXFrameworksBuildPhase;".to_string(),
            "\t\t\tbuildActionMask = 2147483647;".to_string(),
            "\t\t\tfiles = (".to_string(),
            "\t\t\t);".to_string(),
            "\t\t\trunOnlyForDeploymentPostprocessing = 0;".to_string(),
            "\t\t};".to_string(),
        ];
        Self {
            target_name: integration.target_name.clone(),
            id,
            block,
        }
    }
}

impl MigrationStep for FrameworksPhaseStep {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn describe(&self) -> String {
        format!(
            "declare PBXFrameworksBuildPhase {} unless target `{}` already has one",
            self.id, self.target_name
        )
    }

    fn is_satisfied(&self, snapshot: &Snapshot) -> EditResult<bool> {
        let graph = snapshot.graph();
        let target = target(snapshot, &self.target_name)?;
        Ok(graph.frameworks_phase_of(target).is_some()
            || graph.contains(&self.id, &Isa::FrameworksBuildPhase))
    }

    fn apply(&self, doc: &mut Document, snapshot: &Snapshot) -> EditResult<usize> {
        insert_record(doc, snapshot, &Isa::FrameworksBuildPhase, &self.id, &self.block)
    }

    fn undo_fragments(&self) -> Vec<Vec<String>> {
        vec![self.block.clone()]
    }

    fn owned_section(&self) -> Option<Isa> {
        Some(Isa::FrameworksBuildPhase)
    }
}

pub struct FrameworksPhaseLinkStep {
    target_name: String,
    phase_id: ObjectId,
}

impl FrameworksPhaseLinkStep {
    const KEY: &'static str = "frameworks-phase-link";
    const COMMENT: &'static str = "Frameworks";

    pub fn new(integration: &PackageIntegration) -> Self {
        Self {
            target_name: integration.target_name.clone(),
            phase_id: integration.frameworks_phase_id.clone(),
        }
    }
}

impl MigrationStep for FrameworksPhaseLinkStep {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn describe(&self) -> String {
        format!(
            "link a frameworks build phase from target `{}` (buildPhases)",
            self.target_name
        )
    }

    fn is_satisfied(&self, snapshot: &Snapshot) -> EditResult<bool> {
        let target = target(snapshot, &self.target_name)?;
        Ok(snapshot.graph().frameworks_phase_of(target).is_some())
    }

    fn apply(&self, doc: &mut Document, snapshot: &Snapshot) -> EditResult<usize> {
        let target = target(snapshot, &self.target_name)?;
        insert_reference(
            doc,
            snapshot,
            &Isa::NativeTarget,
            &target.id,
            "buildPhases",
            &self.phase_id,
            Self::COMMENT,
        )
    }

    fn undo_fragments(&self) -> Vec<Vec<String>> {
        vec![vec![reference_text(&self.phase_id, Self::COMMENT)]]
    }
}

pub struct FrameworksFileStep {
    target_name: String,
    build_file_id: ObjectId,
    comment: String,
}

impl FrameworksFileStep {
    const KEY: &'static str = "frameworks-file";

    pub fn new(integration: &PackageIntegration) -> Self {
        Self {
            target_name: integration.target_name.clone(),
            build_file_id: integration.build_file_id.clone(),
            comment: format!("{} in Frameworks", integration.product_name),
        }
    }
}

impl MigrationStep for FrameworksFileStep {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn describe(&self) -> String {
        format!(
            "add {} to the frameworks build phase of target `{}` (files)",
            self.build_file_id, self.target_name
        )
    }

    fn is_satisfied(&self, snapshot: &Snapshot) -> EditResult<bool> {
        let target = target(snapshot, &self.target_name)?;
        Ok(snapshot
            .graph()
            .frameworks_phase_of(target)
            .is_some_and(|phase| phase.references("files", &self.build_file_id)))
    }

    fn apply(&self, doc: &mut Document, snapshot: &Snapshot) -> EditResult<usize> {
        let target = target(snapshot, &self.target_name)?;
        let phase = snapshot
            .graph()
            .frameworks_phase_of(target)
            .ok_or_else(|| EditError::RecordNotFound {
                section: Isa::FrameworksBuildPhase.to_string(),
                id: format!("frameworks phase of target `{}`", self.target_name),
            })?;
        insert_reference(
            doc,
            snapshot,
            &Isa::FrameworksBuildPhase,
            &phase.id,
            "files",
            &self.build_file_id,
            &self.comment,
        )
    }

    fn undo_fragments(&self) -> Vec<Vec<String>> {
        vec![vec![reference_text(&self.build_file_id, &self.comment)]]
    }
}
