//! Structural records handed to renderers.
//!
//! Every record is built once and never mutated. Renderers only consume the
//! `Display` forms, so those are kept to printable text.

use super::types::TypeRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Instance attribute discovered in an initializer body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeModel {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl AttributeModel {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Display for AttributeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ty.is_unknown() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}:{}", self.name, self.ty)
        }
    }
}

/// How a parameter binds arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    PositionalOnly,
    PositionalOrKeyword,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterModel {
    pub name: String,
    pub kind: ParameterKind,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl fmt::Display for ParameterModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            ParameterKind::VarPositional => "*",
            ParameterKind::VarKeyword => "**",
            _ => "",
        };
        if self.ty.is_unknown() {
            write!(f, "{}{}", prefix, self.name)
        } else {
            write!(f, "{}{}: {}", prefix, self.name, self.ty)
        }
    }
}

/// Normalized signature of a method or free function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodModel {
    pub name: String,
    pub parameters: Vec<ParameterModel>,
    pub returns: TypeRef,
}

impl fmt::Display for MethodModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = Vec::with_capacity(self.parameters.len() + 2);
        let has_var_positional = self
            .parameters
            .iter()
            .any(|p| p.kind == ParameterKind::VarPositional);
        let mut keyword_marker_written = has_var_positional;

        for (index, parameter) in self.parameters.iter().enumerate() {
            if parameter.kind == ParameterKind::KeywordOnly && !keyword_marker_written {
                rendered.push("*".to_string());
                keyword_marker_written = true;
            }
            rendered.push(parameter.to_string());

            let next_is_positional_only = self
                .parameters
                .get(index + 1)
                .is_some_and(|next| next.kind == ParameterKind::PositionalOnly);
            if parameter.kind == ParameterKind::PositionalOnly && !next_is_positional_only {
                rendered.push("/".to_string());
            }
        }

        write!(f, "fn {}({})", self.name, rendered.join(", "))?;
        if !self.returns.is_unknown() {
            write!(f, " -> {}", self.returns)?;
        }
        Ok(())
    }
}

/// Structural record of one class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassModel {
    pub name: String,
    /// Module-qualified name, the key used to avoid visiting a class twice
    pub qualified_name: String,
    pub module: String,
    /// Direct bases by name only
    pub bases: Vec<String>,
    pub attributes: Vec<AttributeModel>,
    pub methods: Vec<MethodModel>,
}

impl fmt::Display for ClassModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}({})", self.name, self.bases.join(", "))
    }
}

/// One item produced by a traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    Class(ClassModel),
    Function(MethodModel),
}

impl Model {
    pub fn name(&self) -> &str {
        match self {
            Model::Class(class) => &class.name,
            Model::Function(function) => &function.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameter(name: &str, kind: ParameterKind, ty: TypeRef) -> ParameterModel {
        ParameterModel {
            name: name.to_string(),
            kind,
            ty,
        }
    }

    #[test]
    fn test_attribute_display_omits_unknown_type() {
        assert_eq!(AttributeModel::new("x", TypeRef::Unknown).to_string(), "x");
        assert_eq!(
            AttributeModel::new("x", TypeRef::concrete("int")).to_string(),
            "x:int"
        );
    }

    #[test]
    fn test_method_display_with_return() {
        let method = MethodModel {
            name: "area".to_string(),
            parameters: vec![
                parameter("self", ParameterKind::PositionalOrKeyword, TypeRef::Unknown),
                parameter(
                    "scale",
                    ParameterKind::PositionalOrKeyword,
                    TypeRef::concrete("float"),
                ),
            ],
            returns: TypeRef::concrete("float"),
        };
        assert_eq!(method.to_string(), "fn area(self, scale: float) -> float");
    }

    #[test]
    fn test_method_display_parameter_markers() {
        let method = MethodModel {
            name: "configure".to_string(),
            parameters: vec![
                parameter("a", ParameterKind::PositionalOnly, TypeRef::Unknown),
                parameter("b", ParameterKind::PositionalOrKeyword, TypeRef::Unknown),
                parameter("key", ParameterKind::KeywordOnly, TypeRef::concrete("str")),
                parameter("options", ParameterKind::VarKeyword, TypeRef::Unknown),
            ],
            returns: TypeRef::NoneType,
        };
        assert_eq!(
            method.to_string(),
            "fn configure(a, /, b, *, key: str, **options) -> None"
        );
    }

    #[test]
    fn test_var_positional_replaces_keyword_marker() {
        let method = MethodModel {
            name: "log".to_string(),
            parameters: vec![
                parameter("args", ParameterKind::VarPositional, TypeRef::Unknown),
                parameter("sep", ParameterKind::KeywordOnly, TypeRef::Unknown),
            ],
            returns: TypeRef::Unknown,
        };
        assert_eq!(method.to_string(), "fn log(*args, sep)");
    }
}
