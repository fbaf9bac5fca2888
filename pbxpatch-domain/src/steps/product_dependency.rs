use crate::steps::{MigrationStep, reference_fragments, target};
use pbxpatch_edit::{
    Document, EditResult, Snapshot, insert_record, insert_reference, reference_text,
};
use pbxpatch_types::integration::PackageIntegration;
use pbxpatch_types::isa::Isa;
use pbxpatch_types::record::ObjectId;

/// Declares the `XCSwiftPackageProductDependency` for the package product.
pub struct ProductDependencyStep {
    id: ObjectId,
    block: Vec<String>,
}

impl ProductDependencyStep {
    const KEY: &'static str = "product-dependency";

    pub fn new(integration: &PackageIntegration) -> Self {
        let id = integration.product_dependency_id.clone();
        let product = &integration.product_name;
        let block = vec![
            format!("\t\t{id} /* {product} */ = {{"),
            "\t\t\tisa = XCSwiftPackageProductDependency;".to_string(),
            format!("\t\t\tproductName = {product};"),
            "\t\t};".to_string(),
        ];
        Self { id, block }
    }
}

impl MigrationStep for ProductDependencyStep {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn describe(&self) -> String {
        format!("declare XCSwiftPackageProductDependency {}", self.id)
    }

    fn is_satisfied(&self, snapshot: &Snapshot) -> EditResult<bool> {
        Ok(snapshot
            .graph()
            .contains(&self.id, &Isa::SwiftPackageProductDependency))
    }

    fn apply(&self, doc: &mut Document, snapshot: &Snapshot) -> EditResult<usize> {
        insert_record(doc, snapshot, &Isa::SwiftPackageProductDependency, &self.id, &self.block)
    }

    fn undo_fragments(&self) -> Vec<Vec<String>> {
        vec![self.block.clone()]
    }

    fn owned_section(&self) -> Option<Isa> {
        Some(Isa::SwiftPackageProductDependency)
    }
}

/// Lists the product dependency in the target's `packageProductDependencies`.
pub struct TargetProductDependencyStep {
    target_name: String,
    id: ObjectId,
    product: String,
}

impl TargetProductDependencyStep {
    const KEY: &'static str = "target-product-dependency";
    const FIELD: &'static str = "packageProductDependencies";

    pub fn new(integration: &PackageIntegration) -> Self {
        Self {
            target_name: integration.target_name.clone(),
            id: integration.product_dependency_id.clone(),
            product: integration.product_name.clone(),
        }
    }
}

impl MigrationStep for TargetProductDependencyStep {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn describe(&self) -> String {
        format!(
            "add {} to target `{}` ({})",
            self.id,
            self.target_name,
            Self::FIELD
        )
    }

    fn is_satisfied(&self, snapshot: &Snapshot) -> EditResult<bool> {
        Ok(target(snapshot, &self.target_name)?.references(Self::FIELD, &self.id))
    }

    fn apply(&self, doc: &mut Document, snapshot: &Snapshot) -> EditResult<usize> {
        let target = target(snapshot, &self.target_name)?;
        insert_reference(
            doc,
            snapshot,
            &Isa::NativeTarget,
            &target.id,
            Self::FIELD,
            &self.id,
            &self.product,
        )
    }

    fn undo_fragments(&self) -> Vec<Vec<String>> {
        reference_fragments(Self::FIELD, reference_text(&self.id, &self.product))
    }
}
