use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Record type tag (the `isa` field of a project object).
///
/// The variants name the record types the migration reads or writes. Every
/// other tag is carried verbatim in [`Isa::Other`] so unrelated sections pass
/// through untouched.
///
/// Ordering is by tag name, which is also the order Xcode writes sections in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Isa {
    BuildFile,
    FrameworksBuildPhase,
    NativeTarget,
    Project,
    LocalSwiftPackageReference,
    SwiftPackageProductDependency,
    Other(String),
}

impl Isa {
    pub fn as_str(&self) -> &str {
        match self {
            Isa::BuildFile => "PBXBuildFile",
            Isa::FrameworksBuildPhase => "PBXFrameworksBuildPhase",
            Isa::NativeTarget => "PBXNativeTarget",
            Isa::Project => "PBXProject",
            Isa::LocalSwiftPackageReference => "XCLocalSwiftPackageReference",
            Isa::SwiftPackageProductDependency => "XCSwiftPackageProductDependency",
            Isa::Other(name) => name,
        }
    }

    /// `/* Begin <isa> section */`
    pub fn begin_marker(&self) -> String {
        format!("/* Begin {} section */", self.as_str())
    }

    /// `/* End <isa> section */`
    pub fn end_marker(&self) -> String {
        format!("/* End {} section */", self.as_str())
    }
}

impl From<&str> for Isa {
    fn from(s: &str) -> Self {
        match s {
            "PBXBuildFile" => Isa::BuildFile,
            "PBXFrameworksBuildPhase" => Isa::FrameworksBuildPhase,
            "PBXNativeTarget" => Isa::NativeTarget,
            "PBXProject" => Isa::Project,
            "XCLocalSwiftPackageReference" => Isa::LocalSwiftPackageReference,
            "XCSwiftPackageProductDependency" => Isa::SwiftPackageProductDependency,
            other => Isa::Other(other.to_string()),
        }
    }
}

impl From<String> for Isa {
    fn from(s: String) -> Self {
        Isa::from(s.as_str())
    }
}

impl From<Isa> for String {
    fn from(isa: Isa) -> Self {
        isa.as_str().to_string()
    }
}

impl Ord for Isa {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Isa {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Isa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
