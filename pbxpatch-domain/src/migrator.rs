use crate::steps::{self, MigrationStep};
use pbxpatch_edit::{
    Document, EditResult, GraphDecoder, OpenStepDecoder, Snapshot, remove_empty_section,
    remove_fragment,
};
use pbxpatch_types::integration::PackageIntegration;
use pbxpatch_types::report::{StepResult, StepStatus};
use tracing::debug;

/// Runs an ordered list of [`MigrationStep`]s against a [`Document`].
///
/// Every decision is taken on a snapshot derived from the document as it is
/// at that moment; no snapshot outlives the mutation that follows it.
pub struct Migrator {
    steps: Vec<Box<dyn MigrationStep>>,
    decoder: Box<dyn GraphDecoder>,
}

impl Migrator {
    pub fn new(integration: &PackageIntegration) -> Self {
        Self::with_steps(steps::builtin_steps(integration))
    }

    pub fn with_steps(steps: Vec<Box<dyn MigrationStep>>) -> Self {
        Self {
            steps,
            decoder: Box::new(OpenStepDecoder),
        }
    }

    pub fn with_decoder(mut self, decoder: Box<dyn GraphDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn steps(&self) -> &[Box<dyn MigrationStep>] {
        &self.steps
    }

    pub fn snapshot(&self, doc: &Document) -> EditResult<Snapshot> {
        doc.snapshot_with(self.decoder.as_ref())
    }

    /// Keys of the steps whose predicate does not hold, in application order.
    pub fn pending(&self, doc: &Document) -> EditResult<Vec<&'static str>> {
        let snapshot = self.snapshot(doc)?;
        let mut pending = Vec::new();
        for step in &self.steps {
            if !step.is_satisfied(&snapshot)? {
                pending.push(step.key());
            }
        }
        Ok(pending)
    }

    pub fn is_migrated(&self, doc: &Document) -> EditResult<bool> {
        Ok(self.pending(doc)?.is_empty())
    }

    /// Apply every pending step in order, re-deriving the snapshot before
    /// each one. Stops at the first error; `doc` may then be partially
    /// mutated and must be discarded.
    pub fn apply(&self, doc: &mut Document) -> EditResult<Vec<StepResult>> {
        let mut results = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let snapshot = self.snapshot(doc)?;
            if step.is_satisfied(&snapshot)? {
                debug!(step = step.key(), "already satisfied");
                results.push(StepResult {
                    step: step.key().to_string(),
                    status: StepStatus::AlreadySatisfied,
                    lines: 0,
                });
                continue;
            }

            let lines = step.apply(doc, &snapshot)?;
            debug!(step = step.key(), lines, "applied");
            results.push(StepResult {
                step: step.key().to_string(),
                status: StepStatus::Applied,
                lines: lines as u64,
            });
        }
        Ok(results)
    }

    /// Remove every literal fragment the steps may have inserted, last step
    /// first, then drop the sections they own once those are empty.
    ///
    /// Works on the line view only, so it also runs on documents the decoder
    /// rejects. Results are in step order.
    pub fn undo(&self, doc: &mut Document) -> Vec<StepResult> {
        let mut removed = vec![0usize; self.steps.len()];

        for (i, step) in self.steps.iter().enumerate().rev() {
            for fragment in step.undo_fragments() {
                removed[i] += remove_fragment(doc, &fragment);
            }
        }

        for (i, step) in self.steps.iter().enumerate().rev() {
            if let Some(isa) = step.owned_section() {
                removed[i] += remove_empty_section(doc, &isa);
            }
        }

        self.steps
            .iter()
            .zip(removed)
            .map(|(step, lines)| {
                debug!(step = step.key(), lines, "undo");
                StepResult {
                    step: step.key().to_string(),
                    status: if lines > 0 {
                        StepStatus::Removed
                    } else {
                        StepStatus::AlreadySatisfied
                    },
                    lines: lines as u64,
                }
            })
            .collect()
    }
}
