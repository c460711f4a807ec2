//! Best-effort static typing of initializer expressions.
//!
//! Nothing here evaluates code: literals are typed by shape, names and
//! attribute chains are looked up in the reflection runtime, and calls are
//! typed by the callee's declared return annotation. Whatever falls outside
//! those rules is `TypeRef::Unknown`.

use super::signature::{AnnotationResolver, Namespace, SignatureNormalizer};
use crate::core::TypeRef;
use crate::runtime::loader::dotted_path;
use crate::runtime::{constant_type, ClassObject, FunctionObject, Object, Runtime};
use rustpython_parser::ast;
use std::collections::HashMap;
use std::sync::Arc;

/// Instance-reference name used when the initializer has no positional parameter
pub const DEFAULT_INSTANCE_NAME: &str = "self";

/// Expression typing in the context of one class and its initializer
pub struct TypeResolver<'a> {
    runtime: &'a Runtime,
    class: &'a Arc<ClassObject>,
    instance_name: String,
    /// Resolved types of the enclosing callable's annotated parameters
    hints: HashMap<String, TypeRef>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(
        runtime: &'a Runtime,
        class: &'a Arc<ClassObject>,
        function: Option<&FunctionObject>,
    ) -> Self {
        let instance_name = function
            .and_then(|f| f.signature.first_positional())
            .unwrap_or(DEFAULT_INSTANCE_NAME)
            .to_string();
        // An annotated parameter shadows module names even when its type is `Unknown`
        let hints = function
            .map(|f| {
                let method = SignatureNormalizer::new(runtime).normalize(f);
                f.signature
                    .parameters
                    .iter()
                    .zip(method.parameters)
                    .filter(|(raw, _)| raw.annotation.is_some())
                    .map(|(_, parameter)| (parameter.name, parameter.ty))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            runtime,
            class,
            instance_name,
            hints,
        }
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn runtime(&self) -> &'a Runtime {
        self.runtime
    }

    pub fn class(&self) -> &'a Arc<ClassObject> {
        self.class
    }

    /// Best-known type of `expr`. Never fails.
    pub fn resolve(&self, expr: &ast::Expr) -> TypeRef {
        match expr {
            ast::Expr::Constant(constant) => constant_type(&constant.value),
            ast::Expr::Tuple(tuple) => {
                TypeRef::tuple(tuple.elts.iter().map(|e| self.resolve(e)).collect())
            }
            ast::Expr::List(list) => {
                TypeRef::sequence(list.elts.iter().map(|e| self.resolve(e)).collect())
            }
            ast::Expr::Dict(dict) => self.resolve_dict(dict),
            ast::Expr::Attribute(_) => dotted_path(expr)
                .and_then(|path| self.walk(&path))
                .map_or(TypeRef::Unknown, |found| self.runtime.runtime_type(&found)),
            ast::Expr::Call(call) => self.resolve_call(call),
            ast::Expr::Name(name) => self.resolve_name(name.id.as_str()),
            ast::Expr::IfExp(conditional) => TypeRef::union([
                self.resolve(&conditional.body),
                self.resolve(&conditional.orelse),
            ]),
            _ => TypeRef::Unknown,
        }
    }

    fn resolve_dict(&self, dict: &ast::ExprDict) -> TypeRef {
        if dict.keys.is_empty() {
            return TypeRef::mapping(TypeRef::Unknown, TypeRef::Unknown);
        }
        // `**spread` entries have no key and contribute nothing
        let (keys, values): (Vec<_>, Vec<_>) = dict
            .keys
            .iter()
            .zip(&dict.values)
            .filter_map(|(key, value)| {
                key.as_ref()
                    .map(|key| (self.resolve(key), self.resolve(value)))
            })
            .unzip();
        TypeRef::mapping(TypeRef::union(keys), TypeRef::union(values))
    }

    fn resolve_call(&self, call: &ast::ExprCall) -> TypeRef {
        let callee = dotted_path(&call.func).and_then(|path| self.walk(&path));
        match callee {
            Some(Object::Function(function)) | Some(Object::ClassMethod(function)) => {
                SignatureNormalizer::new(self.runtime)
                    .normalize(&function)
                    .returns
            }
            _ => TypeRef::Unknown,
        }
    }

    fn resolve_name(&self, name: &str) -> TypeRef {
        if let Some(hint) = self.hints.get(name) {
            return hint.clone();
        }
        self.walk(&[name.to_string()])
            .map_or(TypeRef::Unknown, |found| self.describe(&found))
    }

    /// Type named by a value found under a bare name
    fn describe(&self, object: &Object) -> TypeRef {
        match object {
            Object::Class(class) => TypeRef::concrete(class.qualname.clone()),
            Object::BuiltinType(name) => TypeRef::concrete(*name),
            Object::Function(function) => {
                SignatureNormalizer::new(self.runtime).callable_type(function)
            }
            Object::Alias { module, expr } => {
                AnnotationResolver::new(Namespace::new(self.runtime, module)).resolve(expr)
            }
            other => self.runtime.runtime_type(other),
        }
    }

    /// Walks an attribute path from the instance or from the class's module
    fn walk(&self, path: &[String]) -> Option<Object> {
        let (first, rest) = path.split_first()?;
        let root = if *first == self.instance_name {
            Object::Instance(Arc::clone(self.class))
        } else {
            self.runtime.lookup_global(&self.class.module, first)?
        };
        self.runtime.walk_path(root, rest)
    }
}

/// Resolves `expr` as written inside `function`, a method of `class`
pub fn resolve(
    runtime: &Runtime,
    class: &Arc<ClassObject>,
    function: Option<&FunctionObject>,
    expr: &ast::Expr,
) -> TypeRef {
    TypeResolver::new(runtime, class, function).resolve(expr)
}
