//! Reflection runtime.
//!
//! Python sources are parsed and their top-level statements bound into
//! modules, classes, functions and values, the way an import would leave
//! them, without running any user code. Everything here is read-only once
//! loaded; attribute lookups follow imports lazily and give up (returning
//! `None`) past the configured resolution depth so cyclic imports and
//! self-referential aliases cannot recurse without bound.

pub mod builtins;
pub mod loader;
pub mod objects;
pub mod source;

pub use loader::LoadReport;
pub use objects::{
    BaseClass, ClassObject, FunctionObject, ModuleObject, Object, RawParameter, RawSignature,
};

use crate::core::{Result, TypeRef};
use rustpython_parser::ast;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Default bound on chained import/alias/base resolution steps
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Loaded modules plus lookup rules
#[derive(Debug)]
pub struct Runtime {
    modules: BTreeMap<String, Arc<ModuleObject>>,
    max_depth: usize,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            modules: BTreeMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Parses `source` and binds it as module `name`
    pub fn load_source(&mut self, name: &str, source: &str) -> Result<Arc<ModuleObject>> {
        let module = loader::bind_module(name, None, false, source)?;
        Ok(self.insert_module(module))
    }

    /// Like `load_source`, for a package `__init__` module
    pub fn load_package_source(&mut self, name: &str, source: &str) -> Result<Arc<ModuleObject>> {
        let module = loader::bind_module(name, None, true, source)?;
        Ok(self.insert_module(module))
    }

    pub fn insert_module(&mut self, module: ModuleObject) -> Arc<ModuleObject> {
        let module = Arc::new(module);
        debug!(module = %module.name, members = module.members.len(), "Loaded module");
        self.modules.insert(module.name.clone(), Arc::clone(&module));
        module
    }

    pub fn module(&self, name: &str) -> Option<&Arc<ModuleObject>> {
        self.modules.get(name)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Arc<ModuleObject>> {
        self.modules.values()
    }

    /// Class by module and dotted qualname, e.g. `("shapes", "Outer.Inner")`
    pub fn class(&self, module: &str, qualname: &str) -> Option<Arc<ClassObject>> {
        let mut parts = qualname.split('.');
        let first = parts.next()?;
        let mut current = self.lookup_global(module, first)?.as_class()?.clone();
        for part in parts {
            let member = self.resolve(current.own_member(part)?.clone())?;
            current = member.as_class()?.clone();
        }
        Some(current)
    }

    /// Function by module and dotted qualname, e.g. `("shapes", "Circle.area")`
    pub fn function(&self, module: &str, qualname: &str) -> Option<Arc<FunctionObject>> {
        let (owner, name) = match qualname.rsplit_once('.') {
            Some((owner, name)) => (Some(owner), name),
            None => (None, qualname),
        };
        let object = match owner {
            Some(owner) => {
                let class = self.class(module, owner)?;
                self.resolve(class.own_member(name)?.clone())?
            }
            None => self.lookup_global(module, name)?,
        };
        object.as_function().cloned()
    }

    /// Global name as seen from inside `module`, falling back to builtins
    pub fn lookup_global(&self, module: &str, name: &str) -> Option<Object> {
        self.lookup_global_at(module, name, 0)
    }

    /// `getattr(object, name)`, with imports and deferred values followed
    pub fn getattr(&self, object: &Object, name: &str) -> Option<Object> {
        self.getattr_at(object, name, 0)
    }

    /// Follows imports and deferred bindings to the value they stand for
    pub fn resolve(&self, object: Object) -> Option<Object> {
        self.resolve_at(object, 0)
    }

    /// Walks `path` attribute by attribute starting from `root`
    pub fn walk_path<S: AsRef<str>>(&self, root: Object, path: &[S]) -> Option<Object> {
        path.iter()
            .try_fold(root, |object, attr| self.getattr(&object, attr.as_ref()))
    }

    /// Attribute lookup through the class and its bases, depth first, left to right
    pub fn class_attribute(&self, class: &ClassObject, name: &str) -> Option<Object> {
        self.class_attribute_at(class, name, 0, &mut HashSet::new())
    }

    /// Every member reachable through the class's bases, first definition wins
    pub fn class_members(&self, class: &ClassObject) -> BTreeMap<String, Object> {
        let mut members = BTreeMap::new();
        self.collect_members(class, 0, &mut HashSet::new(), &mut members);
        members
    }

    /// Object a base class expression refers to, if it can be found
    pub fn base_object(&self, class: &ClassObject, base: &BaseClass) -> Option<Object> {
        self.base_object_at(class, base, 0)
    }

    /// Runtime type of a value, what `type(obj)` would report
    pub fn runtime_type(&self, object: &Object) -> TypeRef {
        match object {
            Object::Module(_) => TypeRef::concrete("module"),
            Object::Class(_) | Object::BuiltinType(_) => TypeRef::concrete("type"),
            Object::Function(_) => TypeRef::concrete("function"),
            Object::Property(_) => TypeRef::concrete("property"),
            // Read through attribute lookup, which binds it to the class
            Object::ClassMethod(_) => TypeRef::concrete("method"),
            Object::Instance(class) => TypeRef::concrete(class.qualname.clone()),
            Object::BuiltinFunction(_) => TypeRef::concrete("builtin_function_or_method"),
            Object::Constant(ty) => ty.clone(),
            Object::Import { .. } | Object::Deferred { .. } => self
                .resolve(object.clone())
                .map_or(TypeRef::Unknown, |resolved| self.runtime_type(&resolved)),
            Object::Alias { .. } | Object::Opaque => TypeRef::Unknown,
        }
    }

    fn exceeded(&self, depth: usize) -> bool {
        if depth > self.max_depth {
            debug!(depth, "Resolution depth exceeded");
            true
        } else {
            false
        }
    }

    fn resolve_at(&self, object: Object, depth: usize) -> Option<Object> {
        if self.exceeded(depth) {
            return None;
        }
        match object {
            Object::Import { module, name } => self.import_target(&module, &name, depth + 1),
            Object::Deferred { module, expr } => self.evaluate(&module, &expr, depth + 1),
            other => Some(other),
        }
    }

    /// Member `name` of module `module`, or its submodule of that name
    fn import_target(&self, module: &str, name: &str, depth: usize) -> Option<Object> {
        if let Some(member) = self.modules.get(module).and_then(|m| m.member(name)) {
            return self.resolve_at(member.clone(), depth + 1);
        }
        let submodule = format!("{}.{}", module, name);
        self.modules
            .contains_key(&submodule)
            .then_some(Object::Module(submodule))
    }

    fn lookup_global_at(&self, module: &str, name: &str, depth: usize) -> Option<Object> {
        match self.modules.get(module).and_then(|m| m.member(name)) {
            Some(binding) => self.resolve_at(binding.clone(), depth + 1),
            None => builtins::lookup(name),
        }
    }

    fn getattr_at(&self, object: &Object, name: &str, depth: usize) -> Option<Object> {
        if self.exceeded(depth) {
            return None;
        }
        match object {
            Object::Module(module) => self.import_target(module, name, depth + 1),
            Object::Class(class) | Object::Instance(class) => {
                self.class_attribute_at(class, name, depth + 1, &mut HashSet::new())
            }
            Object::Import { .. } | Object::Deferred { .. } => {
                let resolved = self.resolve_at(object.clone(), depth + 1)?;
                self.getattr_at(&resolved, name, depth + 1)
            }
            _ => None,
        }
    }

    fn evaluate(&self, module: &str, expr: &ast::Expr, depth: usize) -> Option<Object> {
        match expr {
            ast::Expr::Name(name) => self.lookup_global_at(module, name.id.as_str(), depth),
            ast::Expr::Attribute(_) => {
                let path = loader::dotted_path(expr)?;
                let (first, rest) = path.split_first()?;
                let root = self.lookup_global_at(module, first, depth)?;
                rest.iter()
                    .try_fold(root, |object, attr| self.getattr_at(&object, attr, depth))
            }
            ast::Expr::Call(call) => match self.evaluate(module, &call.func, depth) {
                Some(Object::Class(class)) => Some(Object::Instance(class)),
                _ => Some(Object::Opaque),
            },
            _ => Some(Object::Opaque),
        }
    }

    /// Each class is searched at most once per lookup
    fn class_attribute_at(
        &self,
        class: &ClassObject,
        name: &str,
        depth: usize,
        visited: &mut HashSet<String>,
    ) -> Option<Object> {
        if self.exceeded(depth) || !visited.insert(class.qualified_name()) {
            return None;
        }
        if let Some(member) = class.own_member(name) {
            return self.resolve_at(member.clone(), depth + 1);
        }
        for base in &class.bases {
            if let Some(Object::Class(parent)) = self.base_object_at(class, base, depth + 1) {
                if let Some(found) = self.class_attribute_at(&parent, name, depth + 1, visited) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn collect_members(
        &self,
        class: &ClassObject,
        depth: usize,
        visited: &mut HashSet<String>,
        members: &mut BTreeMap<String, Object>,
    ) {
        if self.exceeded(depth) || !visited.insert(class.qualified_name()) {
            return;
        }
        for (name, member) in class.own_members() {
            if members.contains_key(name) {
                continue;
            }
            if let Some(resolved) = self.resolve_at(member.clone(), depth + 1) {
                members.insert(name.to_string(), resolved);
            }
        }
        for base in &class.bases {
            if let Some(Object::Class(parent)) = self.base_object_at(class, base, depth + 1) {
                self.collect_members(&parent, depth + 1, visited, members);
            }
        }
    }

    fn base_object_at(&self, class: &ClassObject, base: &BaseClass, depth: usize) -> Option<Object> {
        let (first, rest) = base.path.split_first()?;
        let root = match &base.root {
            Some(bound) => self.resolve_at(bound.clone(), depth)?,
            None => self.lookup_global_at(&class.module, first, depth)?,
        };
        rest.iter()
            .try_fold(root, |object, attr| self.getattr_at(&object, attr, depth))
    }
}

/// Runtime type of a literal constant
pub fn constant_type(constant: &ast::Constant) -> TypeRef {
    match constant {
        ast::Constant::None => TypeRef::NoneType,
        ast::Constant::Bool(_) => TypeRef::concrete("bool"),
        ast::Constant::Str(_) => TypeRef::concrete("str"),
        ast::Constant::Bytes(_) => TypeRef::concrete("bytes"),
        ast::Constant::Int(_) => TypeRef::concrete("int"),
        ast::Constant::Float(_) => TypeRef::concrete("float"),
        ast::Constant::Complex { .. } => TypeRef::concrete("complex"),
        ast::Constant::Tuple(_) => TypeRef::concrete("tuple"),
        ast::Constant::Ellipsis => TypeRef::concrete("ellipsis"),
    }
}
