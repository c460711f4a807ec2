//! Initializer body scanner.
//!
//! Re-parses the initializer's source and classifies each top-level
//! statement into one of a fixed set of assignment shapes. Nested blocks
//! (`if`, `for`, `with`, ...) are not descended.

use super::signature::{AnnotationResolver, Namespace};
use super::type_resolver::TypeResolver;
use crate::core::{AttributeModel, TypeRef};
use crate::runtime::source::dedent;
use crate::runtime::{ClassObject, FunctionObject, Runtime};
use rustpython_parser::{ast, Mode};
use std::sync::Arc;
use tracing::debug;

/// Recognized instance-attribute assignment
#[derive(Debug)]
pub enum AssignmentShape<'s> {
    /// `self.x = value`
    Simple {
        attribute: &'s str,
        value: &'s ast::Expr,
    },
    /// `self.x: T = value` or `self.x: T`
    Annotated {
        attribute: &'s str,
        annotation: &'s ast::Expr,
    },
    /// `self.a, (self.b, other) = value`
    Destructuring {
        targets: &'s [ast::Expr],
        value: &'s ast::Expr,
    },
}

/// Classifies one statement. Chained assignments yield one shape per target.
pub fn classify<'s>(stmt: &'s ast::Stmt, instance: &str) -> Vec<AssignmentShape<'s>> {
    match stmt {
        ast::Stmt::Assign(assign) => assign
            .targets
            .iter()
            .filter_map(|target| match target {
                ast::Expr::Tuple(ast::ExprTuple { elts, .. })
                | ast::Expr::List(ast::ExprList { elts, .. }) => {
                    Some(AssignmentShape::Destructuring {
                        targets: elts,
                        value: &assign.value,
                    })
                }
                other => instance_attribute(other, instance).map(|attribute| {
                    AssignmentShape::Simple {
                        attribute,
                        value: &assign.value,
                    }
                }),
            })
            .collect(),
        ast::Stmt::AnnAssign(assign) => instance_attribute(&assign.target, instance)
            .map(|attribute| AssignmentShape::Annotated {
                attribute,
                annotation: &assign.annotation,
            })
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

/// `x` when `target` is `<instance>.x`
fn instance_attribute<'s>(target: &'s ast::Expr, instance: &str) -> Option<&'s str> {
    match target {
        ast::Expr::Attribute(attr) => match &*attr.value {
            ast::Expr::Name(name) if name.id.as_str() == instance => Some(attr.attr.as_str()),
            _ => None,
        },
        _ => None,
    }
}

/// Right-hand side of one destructured position
enum Rhs<'s> {
    Expr(&'s ast::Expr),
    Type(TypeRef),
}

/// Collects the instance attributes assigned by an initializer
pub struct AttributeExtractor<'a> {
    runtime: &'a Runtime,
    class: &'a Arc<ClassObject>,
}

impl<'a> AttributeExtractor<'a> {
    pub fn new(runtime: &'a Runtime, class: &'a Arc<ClassObject>) -> Self {
        Self { runtime, class }
    }

    /// Attributes in source order; empty when the source is unavailable
    pub fn extract(&self, initializer: &FunctionObject) -> Vec<AttributeModel> {
        let Some(body) = parse_body(initializer) else {
            return Vec::new();
        };

        let resolver = TypeResolver::new(self.runtime, self.class, Some(initializer));
        let annotations =
            AnnotationResolver::new(Namespace::new(self.runtime, &initializer.module));

        let mut attributes = Vec::new();
        for stmt in &body {
            for shape in classify(stmt, resolver.instance_name()) {
                match shape {
                    AssignmentShape::Simple { attribute, value } => {
                        attributes.push(AttributeModel::new(attribute, resolver.resolve(value)));
                    }
                    AssignmentShape::Annotated {
                        attribute,
                        annotation,
                    } => {
                        attributes
                            .push(AttributeModel::new(attribute, annotations.resolve(annotation)));
                    }
                    AssignmentShape::Destructuring { targets, value } => {
                        destructure(&resolver, targets, Rhs::Expr(value), &mut attributes);
                    }
                }
            }
        }
        attributes
    }
}

/// Convenience wrapper over `AttributeExtractor`
pub fn extract_attributes(
    runtime: &Runtime,
    class: &Arc<ClassObject>,
    initializer: &FunctionObject,
) -> Vec<AttributeModel> {
    AttributeExtractor::new(runtime, class).extract(initializer)
}

/// Statements of the function body, or `None` if there is no usable source
fn parse_body(function: &FunctionObject) -> Option<Vec<ast::Stmt>> {
    let Some(source) = function.source.as_deref() else {
        debug!(function = %function.qualified_name(), "No source available");
        return None;
    };
    let source = dedent(source);
    let parsed = match rustpython_parser::parse(&source, Mode::Module, &function.qualname) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(
                function = %function.qualified_name(),
                "Initializer source does not re-parse: {}", e.error
            );
            return None;
        }
    };
    let ast::Mod::Module(module) = parsed else {
        return None;
    };
    module.body.into_iter().find_map(|stmt| match stmt {
        ast::Stmt::FunctionDef(def) => Some(def.body),
        ast::Stmt::AsyncFunctionDef(def) => Some(def.body),
        _ => None,
    })
}

fn destructure(
    resolver: &TypeResolver<'_>,
    targets: &[ast::Expr],
    rhs: Rhs<'_>,
    attributes: &mut Vec<AttributeModel>,
) {
    let parts: Vec<Rhs<'_>> = match rhs {
        Rhs::Expr(ast::Expr::Tuple(ast::ExprTuple { elts, .. }))
        | Rhs::Expr(ast::Expr::List(ast::ExprList { elts, .. })) => {
            elts.iter().map(Rhs::Expr).collect()
        }
        Rhs::Expr(expr) => split_type(resolver.resolve(expr), targets.len()),
        Rhs::Type(ty) => split_type(ty, targets.len()),
    };

    // Pairing stops at the shorter side
    for (target, part) in targets.iter().zip(parts) {
        match target {
            ast::Expr::Tuple(ast::ExprTuple { elts, .. })
            | ast::Expr::List(ast::ExprList { elts, .. }) => {
                destructure(resolver, elts, part, attributes);
            }
            other => {
                if let Some(attribute) = instance_attribute(other, resolver.instance_name()) {
                    let ty = match part {
                        Rhs::Expr(expr) => resolver.resolve(expr),
                        Rhs::Type(ty) => ty,
                    };
                    attributes.push(AttributeModel::new(attribute, ty));
                }
            }
        }
    }
}

/// Positional element types of a fixed-arity tuple, else `Unknown` for every target
fn split_type<'s>(ty: TypeRef, arity: usize) -> Vec<Rhs<'s>> {
    match ty.tuple_elements() {
        Some(elements) => elements.iter().cloned().map(Rhs::Type).collect(),
        None => (0..arity).map(|_| Rhs::Type(TypeRef::Unknown)).collect(),
    }
}
