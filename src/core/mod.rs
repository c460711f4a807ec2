pub mod errors;
pub mod model;
pub mod types;

pub use errors::{Error, Result};
pub use model::{AttributeModel, ClassModel, MethodModel, Model, ParameterKind, ParameterModel};
pub use types::{ContainerKind, TypeRef};
