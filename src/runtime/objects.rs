//! Reflected objects bound by loading Python modules.
//!
//! Objects never own other modules: cross-module references are kept by name
//! (`Object::Module`, `Object::Import`) and resolved through the `Runtime`,
//! so mutually importing modules cannot form reference cycles.

use crate::core::{ParameterKind, TypeRef};
use rustpython_parser::ast;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// A live value as seen through reflection
#[derive(Debug, Clone)]
pub enum Object {
    /// Reference to a module by dotted name, loaded or not
    Module(String),
    Class(Arc<ClassObject>),
    /// Plain function, including `@staticmethod` members
    Function(Arc<FunctionObject>),
    /// Function wrapped by `@property` (or a `.setter`/`.getter`)
    Property(Arc<FunctionObject>),
    /// Function wrapped by `@classmethod`
    ClassMethod(Arc<FunctionObject>),
    /// Module or class level value created by calling a known class
    Instance(Arc<ClassObject>),
    BuiltinType(&'static str),
    BuiltinFunction(&'static str),
    /// Literal value, represented by its runtime type
    Constant(TypeRef),
    /// `from module import name`, resolved lazily
    Import { module: String, name: String },
    /// Binding whose value is only evaluated on demand
    Deferred {
        module: String,
        expr: Arc<ast::Expr>,
    },
    /// Type alias expression such as `Vector = List[float]`
    Alias {
        module: String,
        expr: Arc<ast::Expr>,
    },
    /// Value of a shape reflection cannot describe
    Opaque,
}

impl Object {
    pub fn as_class(&self) -> Option<&Arc<ClassObject>> {
        match self {
            Object::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Arc<FunctionObject>> {
        match self {
            Object::Function(function) => Some(function),
            _ => None,
        }
    }

    /// `module.qualname` for classes and functions
    pub fn qualified_name(&self) -> Option<String> {
        match self {
            Object::Class(class) => Some(class.qualified_name()),
            Object::Function(function) => Some(function.qualified_name()),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct ModuleObject {
    pub name: String,
    pub path: Option<PathBuf>,
    pub is_package: bool,
    pub(crate) members: BTreeMap<String, Object>,
}

impl ModuleObject {
    /// Raw binding, imports not followed
    pub fn member(&self, name: &str) -> Option<&Object> {
        self.members.get(name)
    }

    pub fn members(&self) -> impl Iterator<Item = (&str, &Object)> {
        self.members.iter().map(|(name, object)| (name.as_str(), object))
    }
}

/// Base class expression as written, e.g. `abc.ABC` → `["abc", "ABC"]`
#[derive(Debug, Clone)]
pub struct BaseClass {
    pub path: Vec<String>,
    /// Root binding captured when the class statement was bound, if any
    pub(crate) root: Option<Object>,
}

impl BaseClass {
    /// Written name of the base, used when it cannot be resolved
    pub fn written_name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or("object")
    }
}

#[derive(Debug)]
pub struct ClassObject {
    pub name: String,
    pub qualname: String,
    pub module: String,
    pub bases: Vec<BaseClass>,
    pub(crate) members: BTreeMap<String, Object>,
}

impl ClassObject {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.qualname)
    }

    /// Own namespace only, bases are not consulted
    pub fn own_member(&self, name: &str) -> Option<&Object> {
        self.members.get(name)
    }

    pub fn own_members(&self) -> impl Iterator<Item = (&str, &Object)> {
        self.members.iter().map(|(name, object)| (name.as_str(), object))
    }
}

/// Annotation expressions as written, before any resolution
#[derive(Debug, Clone, Default)]
pub struct RawSignature {
    pub parameters: Vec<RawParameter>,
    pub returns: Option<ast::Expr>,
}

#[derive(Debug, Clone)]
pub struct RawParameter {
    pub name: String,
    pub kind: ParameterKind,
    pub annotation: Option<ast::Expr>,
}

impl RawSignature {
    /// Name of the first positional parameter, bound to the instance for methods
    pub fn first_positional(&self) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| {
                matches!(
                    p.kind,
                    ParameterKind::PositionalOnly | ParameterKind::PositionalOrKeyword
                )
            })
            .map(|p| p.name.as_str())
    }
}

#[derive(Debug)]
pub struct FunctionObject {
    pub name: String,
    pub qualname: String,
    pub module: String,
    pub signature: RawSignature,
    /// Source lines of the definition with their original indentation
    pub source: Option<String>,
}

impl FunctionObject {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.qualname)
    }
}
