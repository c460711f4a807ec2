//! Semantic type descriptors produced by attribute and signature inference

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Shape of a composite type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// Ordered sequence (`List[T]`), one element type per known member
    Sequence,
    /// Key/value mapping (`Dict[K, V]`), exactly two element types
    Mapping,
    /// Fixed-arity tuple, one element type per position
    Tuple,
    /// Callable, parameter types followed by the return type
    Callable,
}

/// Best-known type of a value.
///
/// `Unknown` means inference gave up; it is distinct from `NoneType`, which is
/// a valid inferred result for values that are literally `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TypeRef {
    #[default]
    Unknown,
    NoneType,
    Concrete(String),
    Container(ContainerKind, Vec<TypeRef>),
    Union(BTreeSet<TypeRef>),
}

impl TypeRef {
    pub fn concrete(name: impl Into<String>) -> Self {
        TypeRef::Concrete(name.into())
    }

    /// Sequence of the given member types. An empty sequence holds `Unknown`.
    pub fn sequence(elements: Vec<TypeRef>) -> Self {
        if elements.is_empty() {
            TypeRef::Container(ContainerKind::Sequence, vec![TypeRef::Unknown])
        } else {
            TypeRef::Container(ContainerKind::Sequence, elements)
        }
    }

    pub fn mapping(key: TypeRef, value: TypeRef) -> Self {
        TypeRef::Container(ContainerKind::Mapping, vec![key, value])
    }

    pub fn tuple(elements: Vec<TypeRef>) -> Self {
        TypeRef::Container(ContainerKind::Tuple, elements)
    }

    pub fn callable(parameters: Vec<TypeRef>, returns: TypeRef) -> Self {
        let mut elements = parameters;
        elements.push(returns);
        TypeRef::Container(ContainerKind::Callable, elements)
    }

    /// Builds a normalized union: nested unions are flattened, duplicates
    /// collapse, a single alternative is returned as-is and no alternatives
    /// at all yield `Unknown`.
    pub fn union<I>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = TypeRef>,
    {
        let mut members = BTreeSet::new();
        for alternative in alternatives {
            match alternative {
                TypeRef::Union(inner) => members.extend(inner),
                other => {
                    members.insert(other);
                }
            }
        }

        match members.len() {
            0 => TypeRef::Unknown,
            1 => members.into_iter().next().unwrap_or_default(),
            _ => TypeRef::Union(members),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeRef::Unknown)
    }

    /// Positional element types when this is a fixed-arity tuple
    pub fn tuple_elements(&self) -> Option<&[TypeRef]> {
        match self {
            TypeRef::Container(ContainerKind::Tuple, elements) => Some(elements),
            _ => None,
        }
    }

    pub fn container_kind(&self) -> Option<ContainerKind> {
        match self {
            TypeRef::Container(kind, _) => Some(*kind),
            _ => None,
        }
    }
}

fn join(types: &[TypeRef]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Unknown => f.write_str("Any"),
            TypeRef::NoneType => f.write_str("None"),
            TypeRef::Concrete(name) => f.write_str(name),
            TypeRef::Container(ContainerKind::Sequence, elements) => {
                write!(f, "List[{}]", TypeRef::union(elements.iter().cloned()))
            }
            TypeRef::Container(ContainerKind::Mapping, elements) => match elements.as_slice() {
                [key, value] => write!(f, "Dict[{}, {}]", key, value),
                _ => f.write_str("Dict"),
            },
            TypeRef::Container(ContainerKind::Tuple, elements) if elements.is_empty() => {
                f.write_str("Tuple[()]")
            }
            TypeRef::Container(ContainerKind::Tuple, elements) => {
                write!(f, "Tuple[{}]", join(elements))
            }
            TypeRef::Container(ContainerKind::Callable, elements) => match elements.split_last() {
                Some((returns, parameters)) => {
                    write!(f, "Callable[[{}], {}]", join(parameters), returns)
                }
                None => f.write_str("Callable"),
            },
            TypeRef::Union(members) => {
                let members: Vec<TypeRef> = members.iter().cloned().collect();
                match members.as_slice() {
                    [TypeRef::NoneType, other] | [other, TypeRef::NoneType] => {
                        write!(f, "Optional[{}]", other)
                    }
                    _ => write!(f, "Union[{}]", join(&members)),
                }
            }
        }
    }
}
