//! Name resolution capability passed into compilation and checks.

use crate::{
    schema::Schema,
    types::{TypeDescriptor, TypeRegistry},
};
use std::sync::LazyLock;

/// Registry used when no resolver is supplied.
pub(crate) static BUILTIN: LazyLock<TypeRegistry> = LazyLock::new(TypeRegistry::new);

///
/// Resolver
///
/// Looks up entity schemas and scalar types by name. Models implement it;
/// tests can supply their own.
///

pub trait Resolver {
    fn find_schema(&self, name: &str) -> Option<&Schema>;

    fn find_type(&self, name: &str) -> Option<&TypeDescriptor>;
}

impl Resolver for TypeRegistry {
    fn find_schema(&self, _: &str) -> Option<&Schema> {
        None
    }

    fn find_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.get(name)
    }
}

///
/// Namespaces
///
/// Ordered list of attached resolvers; the first hit wins. Built-in types
/// always resolve. Attaching or detaching never recompiles a schema.
///

#[derive(Default)]
pub struct Namespaces<'a> {
    attached: Vec<&'a dyn Resolver>,
}

impl<'a> Namespaces<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, resolver: &'a dyn Resolver) -> Self {
        self.attach(resolver);
        self
    }

    pub fn attach(&mut self, resolver: &'a dyn Resolver) {
        self.attached.push(resolver);
    }

    /// Detach a previously attached resolver; returns whether it was present.
    pub fn detach(&mut self, resolver: &dyn Resolver) -> bool {
        let before = self.attached.len();
        self.attached.retain(|r| !std::ptr::addr_eq(*r, resolver));

        self.attached.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attached.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}

impl Resolver for Namespaces<'_> {
    fn find_schema(&self, name: &str) -> Option<&Schema> {
        self.attached.iter().find_map(|r| r.find_schema(name))
    }

    fn find_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.attached
            .iter()
            .find_map(|r| r.find_type(name))
            .or_else(|| BUILTIN.get(name))
    }
}
