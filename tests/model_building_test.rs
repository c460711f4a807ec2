//! End-to-end model building over Python packages written to disk.

use classmap::{ClassModel, ClassModelBuilder, Model, ModelWalk, Runtime, TypeRef};
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, source: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, source).unwrap();
}

fn load(root: &Path) -> Runtime {
    let mut runtime = Runtime::new();
    let report = runtime.load_path(root, &[]).expect("tree should load");
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    runtime
}

fn class_model(runtime: &Runtime, module: &str, qualname: &str) -> ClassModel {
    let class = runtime
        .class(module, qualname)
        .unwrap_or_else(|| panic!("{}.{} not loaded", module, qualname));
    ClassModelBuilder::new(runtime).build(&class)
}

fn attribute_lines(model: &ClassModel) -> Vec<String> {
    model.attributes.iter().map(ToString::to_string).collect()
}

fn inventory_package() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "inventory/__init__.py", "from .items import Item\n");
    write(
        dir.path(),
        "inventory/base.py",
        indoc! {"
            class Record:
                def __init__(self, key: str):
                    self.key = key
                    self.tags = []
        "},
    );
    write(
        dir.path(),
        "inventory/items.py",
        indoc! {"
            from typing import Dict, Optional, Tuple
            from .base import Record

            quantity = 'shadowed by the parameter hint'

            def lookup(code: str) -> Optional['Item']:
                pass

            def dimensions() -> Tuple[float, float]:
                pass

            class Item(Record):
                def __init__(self, key: str, quantity: int, parent: 'Item' = None):
                    super().__init__(key)
                    self.pair = (1, 'x')
                    self.history = []
                    self.index = {}
                    self.state = 1 if quantity else 'empty'
                    self.quantity = quantity
                    self.parent = parent
                    self.me = self
                    self.label: str = lookup(key)
                    self.missing = missing.attr.chain
                    self.width, self.height = dimensions()
                    self.a, self.b = (1, 's')
                    self.related = lookup(key)

                def restock(self, amount: int) -> None:
                    pass

                def _audit(self):
                    pass
        "},
    );
    dir
}

#[test]
fn test_attribute_inference_properties() {
    let dir = inventory_package();
    let runtime = load(dir.path());
    let model = class_model(&runtime, "inventory.items", "Item");

    assert_eq!(
        attribute_lines(&model),
        vec![
            "pair:Tuple[int, str]",
            "history:List[Any]",
            "index:Dict[Any, Any]",
            "state:Union[int, str]",
            "quantity:int",
            "parent:Item",
            "me:Item",
            "label:str",
            "missing",
            "width:float",
            "height:float",
            "a:int",
            "b:str",
            "related:Optional[Item]",
        ]
    );
}

#[test]
fn test_methods_and_bases() {
    let dir = inventory_package();
    let runtime = load(dir.path());
    let model = class_model(&runtime, "inventory.items", "Item");

    assert_eq!(model.qualified_name, "inventory.items.Item");
    assert_eq!(model.bases, vec!["Record"]);
    let methods: Vec<String> = model.methods.iter().map(ToString::to_string).collect();
    assert_eq!(
        methods,
        vec![
            "fn __init__(self, key: str, quantity: int, parent: Item)",
            "fn restock(self, amount: int) -> None",
        ]
    );
}

#[test]
fn test_build_is_idempotent() {
    let dir = inventory_package();
    let runtime = load(dir.path());
    let first = class_model(&runtime, "inventory.items", "Item");
    let second = class_model(&runtime, "inventory.items", "Item");
    assert_eq!(first, second);
}

#[test]
fn test_inherited_initializer_contributes_attributes() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "zoo.py",
        indoc! {"
            class Animal:
                def __init__(self, name: str):
                    self.name = name

            class Dog(Animal):
                pass

            class Rock:
                pass

            class Error(Exception):
                pass
        "},
    );
    let runtime = load(dir.path());

    assert_eq!(attribute_lines(&class_model(&runtime, "zoo", "Dog")), vec!["name:str"]);
    assert!(class_model(&runtime, "zoo", "Rock").attributes.is_empty());
    assert!(class_model(&runtime, "zoo", "Error").attributes.is_empty());
}

#[test]
fn test_cyclic_imports_degrade_to_unknown() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "ring/__init__.py", "");
    write(dir.path(), "ring/a.py", "from ring.b import Value\n");
    write(
        dir.path(),
        "ring/b.py",
        indoc! {"
            from ring.a import Value

            class Holder:
                def __init__(self):
                    self.value = Value
                    self.made = Value()
        "},
    );
    let runtime = load(dir.path());
    let model = class_model(&runtime, "ring.b", "Holder");

    assert_eq!(model.attributes.len(), 2);
    assert!(model.attributes.iter().all(|a| a.ty == TypeRef::Unknown));
}

#[test]
fn test_package_walk_models_each_definition_once() {
    let dir = inventory_package();
    let runtime = load(dir.path());

    let models: Vec<Model> = ModelWalk::new(&runtime, "inventory").collect();
    let mut names: Vec<String> = models
        .iter()
        .map(|model| match model {
            Model::Class(class) => class.qualified_name.clone(),
            Model::Function(function) => function.name.clone(),
        })
        .collect();
    names.sort();

    assert_eq!(
        names,
        vec![
            "dimensions",
            "inventory.base.Record",
            "inventory.items.Item",
            "lookup",
        ]
    );
}

#[test]
fn test_broken_file_is_reported_and_skipped() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "good.py", "class Fine:\n    pass\n");
    write(dir.path(), "bad.py", "class Broken(:\n");

    let mut runtime = Runtime::new();
    let report = runtime.load_path(dir.path(), &[]).unwrap();
    assert_eq!(report.modules, vec!["good"]);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].to_string().contains("bad.py"));
    assert!(runtime.class("good", "Fine").is_some());
}
