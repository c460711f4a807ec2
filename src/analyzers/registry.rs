//! Traversal over every class and function defined under a package.
//!
//! The walk owns its worklist and visited set. Base classes of every modeled
//! class are queued too, so a package's models include ancestors defined in
//! other loaded packages.

use super::class_builder::ClassModelBuilder;
use super::signature::SignatureNormalizer;
use crate::core::Model;
use crate::runtime::{Object, Runtime};
use std::collections::HashSet;
use tracing::debug;

/// Lazily builds one `Model` per distinct class or function
pub struct ModelWalk<'a> {
    runtime: &'a Runtime,
    builder: ClassModelBuilder<'a>,
    normalizer: SignatureNormalizer<'a>,
    worklist: Vec<Object>,
    /// Module-qualified names already yielded
    visited: HashSet<String>,
}

impl<'a> ModelWalk<'a> {
    /// Seeds the walk with the package's modules and their definitions
    pub fn new(runtime: &'a Runtime, package: &str) -> Self {
        let worklist = runtime
            .modules()
            .filter(|module| in_package(&module.name, package))
            .flat_map(|module| module.members().map(|(_, binding)| binding.clone()))
            .filter_map(|binding| runtime.resolve(binding))
            .filter(|object| match object {
                Object::Class(class) => in_package(&class.module, package),
                Object::Function(function) => in_package(&function.module, package),
                _ => false,
            })
            .collect::<Vec<_>>();
        debug!(package, seeds = worklist.len(), "Seeded model walk");

        Self {
            runtime,
            builder: ClassModelBuilder::new(runtime),
            normalizer: SignatureNormalizer::new(runtime),
            worklist,
            visited: HashSet::new(),
        }
    }

    /// Walks everything loaded into the runtime
    pub fn all(runtime: &'a Runtime) -> Self {
        Self::new(runtime, "")
    }

    pub fn with_internal_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.builder = self.builder.with_internal_prefix(prefix);
        self
    }
}

impl Iterator for ModelWalk<'_> {
    type Item = Model;

    fn next(&mut self) -> Option<Model> {
        while let Some(object) = self.worklist.pop() {
            let Some(name) = object.qualified_name() else {
                continue;
            };
            if !self.visited.insert(name) {
                continue;
            }

            match object {
                Object::Class(class) => {
                    for base in &class.bases {
                        if let Some(parent @ Object::Class(_)) = self.runtime.base_object(&class, base)
                        {
                            self.worklist.push(parent);
                        }
                    }
                    return Some(Model::Class(self.builder.build(&class)));
                }
                Object::Function(function) => {
                    return Some(Model::Function(self.normalizer.normalize(&function)));
                }
                _ => continue,
            }
        }
        None
    }
}

fn in_package(module: &str, package: &str) -> bool {
    package.is_empty()
        || module == package
        || module
            .strip_prefix(package)
            .is_some_and(|rest| rest.starts_with('.'))
}
