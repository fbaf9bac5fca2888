use crate::record::ObjectId;
use serde::{Deserialize, Serialize};

/// Caller-supplied literals describing the package to integrate.
///
/// The engine never invents identifiers; every id it writes comes from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageIntegration {
    /// `name` of the `PBXNativeTarget` that links the package product.
    pub target_name: String,
    pub product_name: String,
    /// Path of the local package, relative to the project.
    pub package_path: String,
    pub build_file_id: ObjectId,
    pub product_dependency_id: ObjectId,
    pub package_reference_id: ObjectId,
    /// Only used when the target has no frameworks build phase yet.
    pub frameworks_phase_id: ObjectId,
}

impl Default for PackageIntegration {
    fn default() -> Self {
        Self {
            target_name: "Runner".to_string(),
            product_name: "GeneratedPluginSwiftPackage".to_string(),
            package_path: "ephemeral/Packages/GeneratedPluginSwiftPackage".to_string(),
            build_file_id: ObjectId::from("78A318202AECB46A00862997"),
            product_dependency_id: ObjectId::from("78A3181F2AECB46A00862997"),
            package_reference_id: ObjectId::from("781AD8BC2B33823900A9FFBB"),
            frameworks_phase_id: ObjectId::from("78DABEA22ED26510000E7860"),
        }
    }
}

impl PackageIntegration {
    /// Check that every literal can be written into a descriptor verbatim.
    pub fn validate(&self) -> Result<(), String> {
        let ids = [
            ("build_file_id", &self.build_file_id),
            ("product_dependency_id", &self.product_dependency_id),
            ("package_reference_id", &self.package_reference_id),
            ("frameworks_phase_id", &self.frameworks_phase_id),
        ];

        for (field, id) in ids {
            if !is_bare_token(id.as_str()) {
                return Err(format!("{field} `{id}` is not a bare identifier"));
            }
        }
        for (i, (a_field, a)) in ids.iter().enumerate() {
            if let Some((b_field, _)) = ids[i + 1..].iter().find(|(_, b)| b == a) {
                return Err(format!("{a_field} and {b_field} share identifier `{a}`"));
            }
        }

        // Only matched against decoded target names, never written.
        if self.target_name.is_empty() {
            return Err("target_name must not be empty".to_string());
        }

        for (field, value) in [
            ("product_name", &self.product_name),
            ("package_path", &self.package_path),
        ] {
            if !is_bare_token(value) {
                return Err(format!("{field} `{value}` must be a non-empty unquoted token"));
            }
        }

        Ok(())
    }
}

fn is_bare_token(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with("//")
        && !s.contains("/*")
        && !s.contains("*/")
        && s
            .chars()
            .all(|c| !c.is_whitespace() && !is_syntax_char(c))
}

fn is_syntax_char(c: char) -> bool {
    matches!(c, '=' | ';' | ',' | '"' | '{' | '}' | '(' | ')')
}
