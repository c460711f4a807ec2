//! Structural models of Python classes.
//!
//! Python sources are loaded into a reflection [`runtime`] without executing
//! them; the [`analyzers`] then turn classes and functions into
//! [`ClassModel`]s and [`MethodModel`]s, inferring instance attribute types
//! from initializer bodies on a best-effort basis.

pub mod analyzers;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod io;
pub mod runtime;

// Re-export commonly used types
pub use crate::core::{
    AttributeModel, ClassModel, ContainerKind, Error, MethodModel, Model, ParameterKind,
    ParameterModel, Result, TypeRef,
};

pub use crate::analyzers::{
    extract_attributes, resolve, ClassModelBuilder, ModelWalk, SignatureNormalizer,
};

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};

pub use crate::runtime::{LoadReport, Runtime};
