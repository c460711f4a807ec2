//! Annotation resolution and signature normalization.
//!
//! Annotations are collected as raw expressions when a module is loaded
//! (`RawSignature`) and only resolved here, against the namespace of the
//! module that declared them. Anything that cannot be resolved becomes
//! `TypeRef::Unknown`.

use crate::core::{MethodModel, ParameterModel, TypeRef};
use crate::runtime::loader::dotted_path;
use crate::runtime::{constant_type, FunctionObject, Object, Runtime};
use rustpython_parser::{ast, Mode};
use tracing::debug;

/// Modules whose exported names carry typing meaning
const TYPING_MODULES: &[&str] = &["typing", "typing_extensions", "collections.abc", "collections"];

/// How a typing construct maps onto `TypeRef`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypingForm {
    Any,
    Sequence,
    Mapping,
    Tuple,
    Optional,
    Union,
    Callable,
    /// `Annotated[T, ...]`, `ClassVar[T]`, `Final[T]`: the first argument
    Transparent,
    Literal,
    Type,
    /// Known generic with no structural counterpart, kept by name
    Named,
}

fn typing_form(name: &str) -> Option<TypingForm> {
    let form = match name {
        "Any" => TypingForm::Any,
        "List" | "list" | "Sequence" | "MutableSequence" | "Iterable" | "Iterator"
        | "Collection" | "Deque" | "deque" => TypingForm::Sequence,
        "Dict" | "dict" | "Mapping" | "MutableMapping" | "DefaultDict" | "defaultdict"
        | "OrderedDict" => TypingForm::Mapping,
        "Tuple" | "tuple" => TypingForm::Tuple,
        "Optional" => TypingForm::Optional,
        "Union" => TypingForm::Union,
        "Callable" => TypingForm::Callable,
        "Annotated" | "ClassVar" | "Final" | "Required" | "NotRequired" => {
            TypingForm::Transparent
        }
        "Literal" => TypingForm::Literal,
        "Type" | "type" => TypingForm::Type,
        "Set" | "FrozenSet" | "AbstractSet" | "MutableSet" | "Generator" | "AsyncIterator"
        | "AsyncIterable" | "AsyncGenerator" | "Awaitable" | "Coroutine" | "Counter"
        | "ChainMap" | "NoReturn" | "Never" | "Hashable" | "Sized" => TypingForm::Named,
        _ => return None,
    };
    Some(form)
}

/// Name lookup for annotations declared in one module
#[derive(Debug, Clone, Copy)]
pub struct Namespace<'a> {
    runtime: &'a Runtime,
    module: &'a str,
}

impl<'a> Namespace<'a> {
    pub fn new(runtime: &'a Runtime, module: &'a str) -> Self {
        Self { runtime, module }
    }

    pub fn module(&self) -> &'a str {
        self.module
    }

    /// Value bound to `name`, falling back to builtins
    pub fn lookup(&self, name: &str) -> Option<Object> {
        self.runtime.lookup_global(self.module, name)
    }

    /// Value at the end of a dotted path such as `models.User`
    pub fn lookup_path(&self, path: &[String]) -> Option<Object> {
        let (first, rest) = path.split_first()?;
        self.runtime.walk_path(self.lookup(first)?, rest)
    }

    fn binding(&self, name: &str) -> Option<&'a Object> {
        self.runtime.module(self.module)?.member(name)
    }

    /// Typing construct a written name stands for, if any.
    ///
    /// A name counts when it was imported from a typing module, reached
    /// through one (`typing.List`), or is unbound here and known by name
    /// (builtin generics such as `list`, or names inside a forward reference).
    fn typing_name(&self, path: &[String]) -> Option<String> {
        let (last, init) = path.split_last()?;
        match (init, self.binding(&path[0])) {
            ([], Some(Object::Import { module, name })) => {
                TYPING_MODULES.contains(&module.as_str()).then(|| name.clone())
            }
            ([], Some(_)) => None,
            ([], None) => typing_form(last).map(|_| last.clone()),
            ([_, rest @ ..], Some(Object::Module(module))) => {
                let mut owner = vec![module.clone()];
                owner.extend(rest.iter().cloned());
                TYPING_MODULES
                    .contains(&owner.join(".").as_str())
                    .then(|| last.clone())
            }
            _ => None,
        }
    }
}

/// Resolves annotation expressions to `TypeRef`s within a `Namespace`
pub struct AnnotationResolver<'a> {
    namespace: Namespace<'a>,
}

impl<'a> AnnotationResolver<'a> {
    pub fn new(namespace: Namespace<'a>) -> Self {
        Self { namespace }
    }

    pub fn resolve(&self, annotation: &ast::Expr) -> TypeRef {
        self.resolve_at(annotation, 0)
    }

    fn max_depth(&self) -> usize {
        self.namespace.runtime.max_depth()
    }

    fn resolve_at(&self, annotation: &ast::Expr, depth: usize) -> TypeRef {
        if depth > self.max_depth() {
            debug!(module = self.namespace.module, "Annotation nesting too deep");
            return TypeRef::Unknown;
        }
        match annotation {
            ast::Expr::Constant(constant) => match &constant.value {
                ast::Constant::None => TypeRef::NoneType,
                ast::Constant::Str(text) => self.forward_reference(text, depth + 1),
                _ => TypeRef::Unknown,
            },
            ast::Expr::Name(_) | ast::Expr::Attribute(_) => self.named(annotation, depth),
            ast::Expr::Subscript(subscript) => {
                self.subscripted(&subscript.value, &subscript.slice, depth)
            }
            ast::Expr::BinOp(ast::ExprBinOp {
                left,
                op: ast::Operator::BitOr,
                right,
                ..
            }) => TypeRef::union([
                self.resolve_at(left, depth + 1),
                self.resolve_at(right, depth + 1),
            ]),
            _ => TypeRef::Unknown,
        }
    }

    fn forward_reference(&self, text: &str, depth: usize) -> TypeRef {
        match rustpython_parser::parse(text, Mode::Expression, "<annotation>") {
            Ok(ast::Mod::Expression(expression)) => self.resolve_at(&expression.body, depth),
            Ok(_) => TypeRef::Unknown,
            Err(e) => {
                debug!(annotation = text, "Unparseable forward reference: {}", e.error);
                TypeRef::Unknown
            }
        }
    }

    fn named(&self, annotation: &ast::Expr, depth: usize) -> TypeRef {
        let Some(path) = dotted_path(annotation) else {
            return TypeRef::Unknown;
        };
        let typing_name = self.namespace.typing_name(&path);
        if typing_name.as_deref().and_then(typing_form) == Some(TypingForm::Any) {
            return TypeRef::Unknown;
        }
        match self.namespace.lookup_path(&path) {
            Some(Object::Class(class)) => TypeRef::concrete(class.qualname.clone()),
            Some(Object::BuiltinType(name)) => TypeRef::concrete(name),
            Some(Object::Alias { module, expr }) => {
                let namespace = Namespace::new(self.namespace.runtime, &module);
                AnnotationResolver::new(namespace).resolve_at(&expr, depth + 1)
            }
            _ => typing_name.map_or(TypeRef::Unknown, TypeRef::concrete),
        }
    }

    fn subscripted(&self, origin: &ast::Expr, slice: &ast::Expr, depth: usize) -> TypeRef {
        let arguments: Vec<&ast::Expr> = match slice {
            ast::Expr::Tuple(tuple) => tuple.elts.iter().collect(),
            other => vec![other],
        };
        let argument = |index: usize| {
            arguments
                .get(index)
                .map_or(TypeRef::Unknown, |arg| self.resolve_at(arg, depth + 1))
        };

        let typing_name = dotted_path(origin).and_then(|path| self.namespace.typing_name(&path));
        let Some(form) = typing_name.as_deref().and_then(typing_form) else {
            // User generic such as `Repository[User]`: keep the origin only
            return match self.resolve_at(origin, depth + 1) {
                concrete @ TypeRef::Concrete(_) => concrete,
                _ => TypeRef::Unknown,
            };
        };

        match form {
            TypingForm::Any => TypeRef::Unknown,
            TypingForm::Sequence => TypeRef::sequence(vec![argument(0)]),
            TypingForm::Mapping => TypeRef::mapping(argument(0), argument(1)),
            TypingForm::Tuple => match arguments.as_slice() {
                [element, ast::Expr::Constant(ast::ExprConstant {
                    value: ast::Constant::Ellipsis,
                    ..
                })] => TypeRef::sequence(vec![self.resolve_at(element, depth + 1)]),
                elements => TypeRef::tuple(
                    elements
                        .iter()
                        .map(|element| self.resolve_at(element, depth + 1))
                        .collect(),
                ),
            },
            TypingForm::Optional => TypeRef::union([argument(0), TypeRef::NoneType]),
            TypingForm::Union => TypeRef::union(
                arguments
                    .iter()
                    .map(|arg| self.resolve_at(arg, depth + 1)),
            ),
            TypingForm::Callable => {
                let parameters = match arguments.first() {
                    Some(ast::Expr::List(list)) => list
                        .elts
                        .iter()
                        .map(|param| self.resolve_at(param, depth + 1))
                        .collect(),
                    _ => Vec::new(),
                };
                TypeRef::callable(parameters, argument(1))
            }
            TypingForm::Transparent => argument(0),
            TypingForm::Literal => TypeRef::union(arguments.iter().map(|arg| match arg {
                ast::Expr::Constant(constant) => constant_type(&constant.value),
                _ => TypeRef::Unknown,
            })),
            TypingForm::Type => TypeRef::concrete("type"),
            TypingForm::Named => typing_name.map_or(TypeRef::Unknown, TypeRef::concrete),
        }
    }
}

/// Turns reflected functions into `MethodModel`s
#[derive(Clone, Copy)]
pub struct SignatureNormalizer<'a> {
    runtime: &'a Runtime,
}

impl<'a> SignatureNormalizer<'a> {
    pub fn new(runtime: &'a Runtime) -> Self {
        Self { runtime }
    }

    /// Resolves every declared annotation in the function's own module
    pub fn normalize(&self, function: &FunctionObject) -> MethodModel {
        let resolver = AnnotationResolver::new(Namespace::new(self.runtime, &function.module));
        let annotation = |expr: Option<&ast::Expr>| {
            expr.map_or(TypeRef::Unknown, |expr| resolver.resolve(expr))
        };

        let parameters = function
            .signature
            .parameters
            .iter()
            .map(|raw| ParameterModel {
                name: raw.name.clone(),
                kind: raw.kind,
                ty: annotation(raw.annotation.as_ref()),
            })
            .collect();

        MethodModel {
            name: function.name.clone(),
            parameters,
            returns: annotation(function.signature.returns.as_ref()),
        }
    }

    /// `Callable[[params...], return]` for a function value
    pub fn callable_type(&self, function: &FunctionObject) -> TypeRef {
        let method = self.normalize(function);
        TypeRef::callable(
            method.parameters.into_iter().map(|p| p.ty).collect(),
            method.returns,
        )
    }
}
