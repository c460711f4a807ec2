//! Model construction over the reflection runtime.
//!
//! Leaf first: `type_resolver` types single expressions, `attribute_extractor`
//! scans initializer bodies, `signature` resolves annotations,
//! `class_builder` assembles a `ClassModel` and `registry` walks a package.

pub mod attribute_extractor;
pub mod class_builder;
pub mod registry;
pub mod signature;
pub mod type_resolver;

pub use attribute_extractor::{extract_attributes, AssignmentShape, AttributeExtractor};
pub use class_builder::{ClassModelBuilder, DEFAULT_INTERNAL_PREFIX};
pub use registry::ModelWalk;
pub use signature::{AnnotationResolver, Namespace, SignatureNormalizer};
pub use type_resolver::{resolve, TypeResolver};
