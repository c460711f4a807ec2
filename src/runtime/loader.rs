//! Binds parsed Python modules into reflected objects.
//!
//! Top-level statements are bound in source order. Class bodies are bound the
//! same way into the class namespace; function bodies are never entered, the
//! function object keeps its source text for later scanning instead.

use super::objects::{
    BaseClass, ClassObject, FunctionObject, ModuleObject, Object, RawParameter, RawSignature,
};
use super::source::source_lines;
use super::{constant_type, Runtime};
use crate::core::{Error, ParameterKind, Result, TypeRef};
use crate::io::walker::FileWalker;
use rayon::prelude::*;
use rustpython_parser::ast;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of loading a directory tree
#[derive(Debug, Default)]
pub struct LoadReport {
    pub modules: Vec<String>,
    pub failures: Vec<Error>,
}

impl Runtime {
    /// Loads every Python file under `root` (or `root` itself when it is a file).
    ///
    /// Files that fail to read or parse are reported in `LoadReport::failures`
    /// and do not prevent the rest from loading.
    pub fn load_path(&mut self, root: &Path, exclude: &[String]) -> Result<LoadReport> {
        let root = root
            .canonicalize()
            .map_err(|e| Error::file_system("Cannot resolve path", root, e))?;
        let files = if root.is_file() {
            vec![root.clone()]
        } else {
            FileWalker::new(root.clone())
                .with_ignore_patterns(exclude.to_vec())
                .walk()?
        };

        let bound: Vec<Result<ModuleObject>> = files
            .par_iter()
            .filter_map(|file| {
                let (name, is_package) = module_name(&root, file)?;
                Some(load_file(&name, file, is_package))
            })
            .collect();

        let mut report = LoadReport::default();
        for result in bound {
            match result {
                Ok(module) => {
                    report.modules.push(module.name.clone());
                    self.insert_module(module);
                }
                Err(e) => {
                    warn!("Skipping module: {}", e);
                    report.failures.push(e);
                }
            }
        }
        report.modules.sort();
        Ok(report)
    }
}

fn load_file(name: &str, file: &Path, is_package: bool) -> Result<ModuleObject> {
    let source = std::fs::read_to_string(file)
        .map_err(|e| Error::file_system("Failed to read source", file, e))?;
    bind_module(name, Some(file.to_path_buf()), is_package, &source)
}

/// Dotted module name for `file`, relative to the loaded root.
///
/// When the root directory is itself a package its name prefixes every module.
pub fn module_name(root: &Path, file: &Path) -> Option<(String, bool)> {
    let base = if root.is_file() {
        root.parent()?
    } else if root.join("__init__.py").is_file() {
        root.parent().unwrap_or(root)
    } else {
        root
    };
    let relative = file.strip_prefix(base).ok()?;

    let mut parts: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(|parent| parent.components())
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str().map(str::to_string),
            _ => None,
        })
        .collect();

    let stem = relative.file_stem()?.to_str()?;
    let is_package = stem == "__init__";
    if !is_package {
        parts.push(stem.to_string());
    }
    if parts.is_empty() {
        return None;
    }
    Some((parts.join("."), is_package))
}

/// Parses `source` and binds its top-level statements as module `name`
pub fn bind_module(
    name: &str,
    path: Option<PathBuf>,
    is_package: bool,
    source: &str,
) -> Result<ModuleObject> {
    let display_path = path
        .as_ref()
        .map_or_else(|| format!("<{}>", name), |p| p.display().to_string());
    let parsed = rustpython_parser::parse(source, rustpython_parser::Mode::Module, &display_path)
        .map_err(|e| Error::parse_at(&display_path, source, e.offset.to_usize(), e.error.to_string()))?;

    let body = match parsed {
        ast::Mod::Module(module) => module.body,
        _ => Vec::new(),
    };

    let package = if is_package {
        name.to_string()
    } else {
        name.rsplit_once('.')
            .map_or_else(String::new, |(parent, _)| parent.to_string())
    };
    let binder = ModuleBinder {
        module: name,
        package: &package,
        source,
    };
    let mut members = BTreeMap::new();
    binder.bind_block(&body, None, &mut members);
    debug!(module = name, "Bound {} top-level names", members.len());

    Ok(ModuleObject {
        name: name.to_string(),
        path,
        is_package,
        members,
    })
}

/// Dotted path of a `Name` or `Attribute` chain, e.g. `a.b.c`
pub fn dotted_path(expr: &ast::Expr) -> Option<Vec<String>> {
    match expr {
        ast::Expr::Name(name) => Some(vec![name.id.to_string()]),
        ast::Expr::Attribute(attr) => {
            let mut path = dotted_path(&attr.value)?;
            path.push(attr.attr.to_string());
            Some(path)
        }
        _ => None,
    }
}

enum Wrapping {
    Plain,
    Property,
    ClassMethod,
}

fn wrapping(decorators: &[ast::Expr]) -> Wrapping {
    for decorator in decorators {
        let name = match decorator {
            ast::Expr::Name(name) => name.id.as_str(),
            ast::Expr::Attribute(attr) => attr.attr.as_str(),
            _ => continue,
        };
        match name {
            "classmethod" => return Wrapping::ClassMethod,
            "setter" | "getter" | "deleter" => return Wrapping::Property,
            _ if name == "property" || name.ends_with("_property") => return Wrapping::Property,
            _ => {}
        }
    }
    Wrapping::Plain
}

fn raw_signature(arguments: &ast::Arguments, returns: Option<&ast::Expr>) -> RawSignature {
    fn with_default(arg: &ast::ArgWithDefault, kind: ParameterKind) -> RawParameter {
        plain(&arg.def, kind)
    }

    fn plain(arg: &ast::Arg, kind: ParameterKind) -> RawParameter {
        RawParameter {
            name: arg.arg.to_string(),
            kind,
            annotation: arg.annotation.as_deref().cloned(),
        }
    }

    let mut parameters = Vec::new();
    parameters.extend(
        arguments
            .posonlyargs
            .iter()
            .map(|arg| with_default(arg, ParameterKind::PositionalOnly)),
    );
    parameters.extend(
        arguments
            .args
            .iter()
            .map(|arg| with_default(arg, ParameterKind::PositionalOrKeyword)),
    );
    if let Some(vararg) = &arguments.vararg {
        parameters.push(plain(vararg, ParameterKind::VarPositional));
    }
    parameters.extend(
        arguments
            .kwonlyargs
            .iter()
            .map(|arg| with_default(arg, ParameterKind::KeywordOnly)),
    );
    if let Some(kwarg) = &arguments.kwarg {
        parameters.push(plain(kwarg, ParameterKind::VarKeyword));
    }

    RawSignature {
        parameters,
        returns: returns.cloned(),
    }
}

/// Pieces shared by `def` and `async def`
struct FunctionParts<'a> {
    name: &'a str,
    arguments: &'a ast::Arguments,
    returns: Option<&'a ast::Expr>,
    decorators: &'a [ast::Expr],
    start: usize,
    end: usize,
}

struct ModuleBinder<'a> {
    module: &'a str,
    /// Package that relative imports are resolved against
    package: &'a str,
    source: &'a str,
}

impl ModuleBinder<'_> {
    fn bind_block(
        &self,
        body: &[ast::Stmt],
        owner: Option<&str>,
        members: &mut BTreeMap<String, Object>,
    ) {
        for stmt in body {
            self.bind_statement(stmt, owner, members);
        }
    }

    fn bind_statement(
        &self,
        stmt: &ast::Stmt,
        owner: Option<&str>,
        members: &mut BTreeMap<String, Object>,
    ) {
        match stmt {
            ast::Stmt::Import(import) => {
                for alias in &import.names {
                    let full = alias.name.as_str();
                    match &alias.asname {
                        Some(asname) => {
                            members.insert(asname.to_string(), Object::Module(full.to_string()));
                        }
                        None => {
                            let root = full.split('.').next().unwrap_or(full);
                            members.insert(root.to_string(), Object::Module(root.to_string()));
                        }
                    }
                }
            }
            ast::Stmt::ImportFrom(import) => {
                let level = import.level.as_ref().map_or(0, |level| level.to_u32());
                let Some(base) = self.import_base(import.module.as_ref().map(|m| m.as_str()), level)
                else {
                    debug!(module = self.module, "Relative import beyond top-level package");
                    return;
                };
                for alias in &import.names {
                    let name = alias.name.as_str();
                    if name == "*" {
                        continue;
                    }
                    let bound = alias.asname.as_ref().map_or(name, |asname| asname.as_str());
                    members.insert(
                        bound.to_string(),
                        Object::Import {
                            module: base.clone(),
                            name: name.to_string(),
                        },
                    );
                }
            }
            ast::Stmt::ClassDef(class_def) => {
                let class = self.bind_class(class_def, owner, members);
                members.insert(class.name.clone(), Object::Class(Arc::new(class)));
            }
            ast::Stmt::FunctionDef(def) => {
                let parts = FunctionParts {
                    name: def.name.as_str(),
                    arguments: &def.args,
                    returns: def.returns.as_deref(),
                    decorators: &def.decorator_list,
                    start: def.range.start().to_usize(),
                    end: def.range.end().to_usize(),
                };
                members.insert(parts.name.to_string(), self.bind_function(&parts, owner));
            }
            ast::Stmt::AsyncFunctionDef(def) => {
                let parts = FunctionParts {
                    name: def.name.as_str(),
                    arguments: &def.args,
                    returns: def.returns.as_deref(),
                    decorators: &def.decorator_list,
                    start: def.range.start().to_usize(),
                    end: def.range.end().to_usize(),
                };
                members.insert(parts.name.to_string(), self.bind_function(&parts, owner));
            }
            ast::Stmt::Assign(assign) => {
                for target in &assign.targets {
                    self.bind_target(target, &assign.value, members);
                }
            }
            ast::Stmt::AnnAssign(assign) => {
                if let Some(value) = &assign.value {
                    self.bind_target(&assign.target, value, members);
                }
            }
            // `if TYPE_CHECKING:` imports and `try: import x` fallbacks
            ast::Stmt::If(if_stmt) => {
                self.bind_block(&if_stmt.body, owner, members);
                self.bind_block(&if_stmt.orelse, owner, members);
            }
            ast::Stmt::Try(try_stmt) => {
                self.bind_block(&try_stmt.body, owner, members);
                self.bind_block(&try_stmt.orelse, owner, members);
                self.bind_block(&try_stmt.finalbody, owner, members);
            }
            _ => {}
        }
    }

    fn bind_target(
        &self,
        target: &ast::Expr,
        value: &ast::Expr,
        members: &mut BTreeMap<String, Object>,
    ) {
        match (target, value) {
            (ast::Expr::Name(name), _) => {
                let object = self.evaluate(value, members);
                members.insert(name.id.to_string(), object);
            }
            (ast::Expr::Tuple(targets), ast::Expr::Tuple(values)) => {
                for (target, value) in targets.elts.iter().zip(&values.elts) {
                    self.bind_target(target, value, members);
                }
            }
            _ => {}
        }
    }

    /// Value of a module or class level assignment, evaluated eagerly only
    /// when that needs nothing outside the current scope
    fn evaluate(&self, value: &ast::Expr, scope: &BTreeMap<String, Object>) -> Object {
        let deferred = || Object::Deferred {
            module: self.module.to_string(),
            expr: Arc::new(value.clone()),
        };
        match value {
            ast::Expr::Constant(constant) => Object::Constant(constant_type(&constant.value)),
            ast::Expr::List(_) | ast::Expr::ListComp(_) => {
                Object::Constant(TypeRef::concrete("list"))
            }
            ast::Expr::Tuple(_) => Object::Constant(TypeRef::concrete("tuple")),
            ast::Expr::Dict(_) | ast::Expr::DictComp(_) => {
                Object::Constant(TypeRef::concrete("dict"))
            }
            ast::Expr::Set(_) | ast::Expr::SetComp(_) => Object::Constant(TypeRef::concrete("set")),
            ast::Expr::JoinedStr(_) => Object::Constant(TypeRef::concrete("str")),
            ast::Expr::Lambda(_) => Object::Constant(TypeRef::concrete("function")),
            ast::Expr::Name(name) => scope
                .get(name.id.as_str())
                .cloned()
                .unwrap_or_else(deferred),
            ast::Expr::Call(call) => match &*call.func {
                ast::Expr::Name(name) => match scope.get(name.id.as_str()) {
                    Some(Object::Class(class)) => Object::Instance(Arc::clone(class)),
                    Some(_) => Object::Opaque,
                    None => deferred(),
                },
                _ => deferred(),
            },
            ast::Expr::Attribute(_) => deferred(),
            ast::Expr::Subscript(_)
            | ast::Expr::BinOp(ast::ExprBinOp {
                op: ast::Operator::BitOr,
                ..
            }) => Object::Alias {
                module: self.module.to_string(),
                expr: Arc::new(value.clone()),
            },
            _ => Object::Opaque,
        }
    }

    fn bind_class(
        &self,
        class_def: &ast::StmtClassDef,
        owner: Option<&str>,
        scope: &BTreeMap<String, Object>,
    ) -> ClassObject {
        let name = class_def.name.to_string();
        let qualname = qualify(owner, &name);

        let bases = class_def
            .bases
            .iter()
            .filter_map(|base| {
                let written = match base {
                    ast::Expr::Subscript(subscript) => &*subscript.value,
                    other => other,
                };
                let path = dotted_path(written)?;
                let root = scope.get(&path[0]).cloned();
                Some(BaseClass { path, root })
            })
            .collect();

        let mut members = BTreeMap::new();
        self.bind_block(&class_def.body, Some(&qualname), &mut members);

        ClassObject {
            name,
            qualname,
            module: self.module.to_string(),
            bases,
            members,
        }
    }

    fn bind_function(&self, parts: &FunctionParts<'_>, owner: Option<&str>) -> Object {
        let function = Arc::new(FunctionObject {
            name: parts.name.to_string(),
            qualname: qualify(owner, parts.name),
            module: self.module.to_string(),
            signature: raw_signature(parts.arguments, parts.returns),
            source: source_lines(self.source, parts.start, parts.end).map(str::to_string),
        });
        match wrapping(parts.decorators) {
            Wrapping::Plain => Object::Function(function),
            Wrapping::Property => Object::Property(function),
            Wrapping::ClassMethod => Object::ClassMethod(function),
        }
    }

    fn import_base(&self, module: Option<&str>, level: u32) -> Option<String> {
        if level == 0 {
            return module.map(str::to_string);
        }
        let mut parts: Vec<&str> = self.package.split('.').filter(|p| !p.is_empty()).collect();
        for _ in 1..level {
            parts.pop()?;
        }
        if parts.is_empty() {
            return None;
        }
        if let Some(module) = module {
            parts.push(module);
        }
        Some(parts.join("."))
    }
}

fn qualify(owner: Option<&str>, name: &str) -> String {
    match owner {
        Some(owner) => format!("{}.{}", owner, name),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::fs;
    use tempfile::TempDir;

    fn bind(source: &str) -> ModuleObject {
        bind_module("app", None, false, source).expect("source should parse")
    }

    #[test]
    fn test_bind_reports_parse_error_location() {
        let error = bind_module("broken", None, false, "def f(:\n    pass\n").unwrap_err();
        assert!(matches!(error, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_bind_imports() {
        let module = bind(indoc! {"
            import os.path
            import numpy as np
            from typing import List as L
            from .sibling import helper
        "});
        assert!(matches!(module.member("os"), Some(Object::Module(m)) if m == "os"));
        assert!(matches!(module.member("np"), Some(Object::Module(m)) if m == "numpy"));
        assert!(matches!(
            module.member("L"),
            Some(Object::Import { module, name }) if module == "typing" && name == "List"
        ));
        // `app` is a top-level module, so a relative import has no package
        assert!(module.member("helper").is_none());
    }

    #[test]
    fn test_relative_import_inside_package() {
        let module = bind_module(
            "pkg.views",
            None,
            false,
            "from . import models\nfrom ..core import base\n",
        )
        .unwrap();
        assert!(matches!(
            module.member("models"),
            Some(Object::Import { module, name }) if module == "pkg" && name == "models"
        ));
        assert!(module.member("base").is_none());

        let package = bind_module("pkg", None, true, "from .views import render\n").unwrap();
        assert!(matches!(
            package.member("render"),
            Some(Object::Import { module, .. }) if module == "pkg.views"
        ));
    }

    #[test]
    fn test_bind_class_members_and_decorators() {
        let module = bind(indoc! {"
            class Account(Base):
                limit = 10

                def __init__(self, owner: str):
                    self.owner = owner

                @property
                def balance(self):
                    return 0

                @classmethod
                def open(cls):
                    return cls('x')

                @staticmethod
                def validate(number) -> bool:
                    return True
        "});
        let Some(Object::Class(class)) = module.member("Account") else {
            panic!("class not bound");
        };
        assert_eq!(class.bases[0].path, vec!["Base".to_string()]);
        assert!(matches!(class.own_member("limit"), Some(Object::Constant(_))));
        assert!(matches!(class.own_member("__init__"), Some(Object::Function(_))));
        assert!(matches!(class.own_member("balance"), Some(Object::Property(_))));
        assert!(matches!(class.own_member("open"), Some(Object::ClassMethod(_))));
        assert!(matches!(class.own_member("validate"), Some(Object::Function(_))));

        let Some(Object::Function(init)) = class.own_member("__init__") else {
            panic!("initializer not bound");
        };
        assert_eq!(init.qualname, "Account.__init__");
        assert_eq!(init.signature.parameters.len(), 2);
        assert!(init.signature.parameters[1].annotation.is_some());
        let source = init.source.as_deref().unwrap();
        assert!(source.starts_with("    def __init__"));
        assert!(source.contains("self.owner = owner"));
    }

    #[test]
    fn test_signature_parameter_kinds() {
        let module = bind("def f(a, /, b, *args, c, **kw): pass\n");
        let Some(Object::Function(f)) = module.member("f") else {
            panic!("function not bound");
        };
        let kinds: Vec<_> = f.signature.parameters.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ParameterKind::PositionalOnly,
                ParameterKind::PositionalOrKeyword,
                ParameterKind::VarPositional,
                ParameterKind::KeywordOnly,
                ParameterKind::VarKeyword,
            ]
        );
    }

    #[test]
    fn test_assignment_values() {
        let module = bind(indoc! {"
            class Config:
                pass

            DEFAULT = Config()
            NAMES = ['a']
            Vector = List[float]
            other = unknown_call()
            A, B = 1, 'b'
        "});
        assert!(matches!(module.member("DEFAULT"), Some(Object::Instance(_))));
        assert!(matches!(
            module.member("NAMES"),
            Some(Object::Constant(TypeRef::Concrete(name))) if name == "list"
        ));
        assert!(matches!(module.member("Vector"), Some(Object::Alias { .. })));
        assert!(matches!(module.member("other"), Some(Object::Deferred { .. })));
        assert!(matches!(
            module.member("B"),
            Some(Object::Constant(TypeRef::Concrete(name))) if name == "str"
        ));
    }

    #[test]
    fn test_type_checking_imports_are_bound() {
        let module = bind(indoc! {"
            from typing import TYPE_CHECKING
            if TYPE_CHECKING:
                from models import User
        "});
        assert!(matches!(module.member("User"), Some(Object::Import { .. })));
    }

    #[test]
    fn test_module_name_for_package_root() {
        let dir = TempDir::new().unwrap();
        let pkg = dir.path().join("shop");
        fs::create_dir_all(pkg.join("orders")).unwrap();
        fs::write(pkg.join("__init__.py"), "").unwrap();

        assert_eq!(
            module_name(&pkg, &pkg.join("__init__.py")),
            Some(("shop".to_string(), true))
        );
        assert_eq!(
            module_name(&pkg, &pkg.join("orders").join("cart.py")),
            Some(("shop.orders.cart".to_string(), false))
        );
        assert_eq!(
            module_name(dir.path(), &dir.path().join("script.py")),
            Some(("script".to_string(), false))
        );
    }

    #[test]
    fn test_load_path_collects_failures() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.py"), "X = 1\n").unwrap();
        fs::write(dir.path().join("bad.py"), "def (:\n").unwrap();

        let mut runtime = Runtime::new();
        let report = runtime.load_path(dir.path(), &[]).unwrap();
        assert_eq!(report.modules, vec!["good".to_string()]);
        assert_eq!(report.failures.len(), 1);
        assert!(runtime.module("good").is_some());
    }
}
