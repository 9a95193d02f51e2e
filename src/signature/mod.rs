// API signature dump model and parser
//
// A signature dump is the flattened public-API summary emitted by the
// API extraction tool:
// ```
// // Signature format: 2.0
// package android.car {
//
//   public final class Car {
//     method public static android.car.Car createCar(android.content.Context);
//     field public static final String AUDIO_SERVICE = "audio";
//   }
//
// }
// ```

mod params;
mod parser;

pub use params::normalize_params;
pub use parser::{FormatError, SignatureParser, DEFAULT_HEADER};

use serde::Serialize;

/// A `package <name> { ... }` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    /// Dotted package name
    pub name: String,
    /// Classes in declaration order
    pub classes: Vec<Class>,
}

/// A class, interface, enum or annotation block inside a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Class {
    /// Simple name without the package prefix; nested types keep `Outer.Inner`
    pub name: String,
    /// Members in declaration order
    pub members: Vec<Member>,
}

/// A single `method`, `ctor`, `field` or `enum_constant` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub kind: MemberKind,
    /// Symbol name only, no return type or parameters
    pub name: String,
    /// The declaration line as written, without the trailing `;`
    pub descriptor: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    /// `method` and `ctor` lines
    Method,
    /// `field` and `enum_constant` lines
    Field,
}

impl Member {
    /// Descriptor with parameter names removed, stable across parameter renames
    pub fn normalized_descriptor(&self) -> String {
        match self.kind {
            MemberKind::Method => normalize_params(&self.descriptor),
            MemberKind::Field => self.descriptor.clone(),
        }
    }
}

impl Package {
    /// Total member count across all classes
    pub fn member_count(&self) -> usize {
        self.classes.iter().map(|c| c.members.len()).sum()
    }
}
