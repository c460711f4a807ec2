//! Names available in every module without an import

use super::objects::Object;

const BUILTIN_TYPES: &[&str] = &[
    "bool",
    "bytearray",
    "bytes",
    "complex",
    "dict",
    "float",
    "frozenset",
    "int",
    "list",
    "memoryview",
    "object",
    "range",
    "set",
    "slice",
    "str",
    "tuple",
    "type",
    "BaseException",
    "Exception",
    "ArithmeticError",
    "AttributeError",
    "KeyError",
    "IndexError",
    "LookupError",
    "NotImplementedError",
    "OSError",
    "RuntimeError",
    "StopIteration",
    "TypeError",
    "ValueError",
];

const BUILTIN_FUNCTIONS: &[&str] = &[
    "abs",
    "all",
    "any",
    "callable",
    "dir",
    "divmod",
    "enumerate",
    "filter",
    "getattr",
    "hasattr",
    "hash",
    "id",
    "input",
    "isinstance",
    "issubclass",
    "iter",
    "len",
    "map",
    "max",
    "min",
    "next",
    "open",
    "print",
    "repr",
    "reversed",
    "round",
    "sorted",
    "sum",
    "vars",
    "zip",
];

/// Builtin binding for `name`, if any
pub fn lookup(name: &str) -> Option<Object> {
    if let Some(found) = BUILTIN_TYPES.iter().find(|candidate| **candidate == name) {
        return Some(Object::BuiltinType(*found));
    }
    BUILTIN_FUNCTIONS
        .iter()
        .find(|candidate| **candidate == name)
        .map(|found| Object::BuiltinFunction(*found))
}
