use super::attribute_extractor::AttributeExtractor;
use super::signature::SignatureNormalizer;
use crate::core::ClassModel;
use crate::runtime::{ClassObject, Object, Runtime};
use std::sync::Arc;
use tracing::debug_span;

/// Prefix marking a member as internal
pub const DEFAULT_INTERNAL_PREFIX: &str = "_";

const INITIALIZER: &str = "__init__";

/// Builds `ClassModel`s from reflected classes.
///
/// Building is pure: the same class always produces an equal model.
pub struct ClassModelBuilder<'a> {
    runtime: &'a Runtime,
    internal_prefix: String,
}

impl<'a> ClassModelBuilder<'a> {
    pub fn new(runtime: &'a Runtime) -> Self {
        Self {
            runtime,
            internal_prefix: DEFAULT_INTERNAL_PREFIX.to_string(),
        }
    }

    pub fn with_internal_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.internal_prefix = prefix.into();
        self
    }

    pub fn build(&self, class: &Arc<ClassObject>) -> ClassModel {
        let _span = debug_span!("build_class", class = %class.qualified_name()).entered();
        let members = self.runtime.class_members(class);
        let normalizer = SignatureNormalizer::new(self.runtime);

        let methods = members
            .iter()
            .filter(|(name, _)| self.is_public(name))
            .filter_map(|(_, member)| match member {
                Object::Function(function) => Some(normalizer.normalize(function)),
                _ => None,
            })
            .collect();

        let attributes = match members.get(INITIALIZER) {
            Some(Object::Function(initializer)) => {
                AttributeExtractor::new(self.runtime, class).extract(initializer)
            }
            _ => Vec::new(),
        };

        ClassModel {
            name: class.name.clone(),
            qualified_name: class.qualified_name(),
            module: class.module.clone(),
            bases: self.base_names(class),
            attributes,
            methods,
        }
    }

    fn is_public(&self, name: &str) -> bool {
        name == INITIALIZER
            || self.internal_prefix.is_empty()
            || !name.starts_with(&self.internal_prefix)
    }

    fn base_names(&self, class: &ClassObject) -> Vec<String> {
        if class.bases.is_empty() {
            return vec!["object".to_string()];
        }
        class
            .bases
            .iter()
            .map(|base| match self.runtime.base_object(class, base) {
                Some(Object::Class(parent)) => parent.qualname.clone(),
                Some(Object::BuiltinType(name)) => name.to_string(),
                _ => base.written_name().to_string(),
            })
            .collect()
    }
}
