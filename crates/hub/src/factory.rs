//! Static type-name to constructor tables

use contracts::{Constructor, Dispatcher, Listener};
use indexmap::IndexMap;

/// Closed set of constructible types for one role
pub struct ComponentFactory<T: ?Sized> {
    constructors: IndexMap<&'static str, Constructor<T>>,
}

pub type ListenerFactory = ComponentFactory<dyn Listener>;
pub type DispatcherFactory = ComponentFactory<dyn Dispatcher>;

impl<T: ?Sized> ComponentFactory<T> {
    pub fn new() -> Self {
        Self {
            constructors: IndexMap::new(),
        }
    }

    /// Register `constructor` under `type_name`, replacing any previous entry
    pub fn register(&mut self, type_name: &'static str, constructor: Constructor<T>) -> &mut Self {
        self.constructors.insert(type_name, constructor);
        self
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, type_name: &'static str, constructor: Constructor<T>) -> Self {
        self.register(type_name, constructor);
        self
    }

    /// Register every `(type name, constructor)` pair
    pub fn with_all(
        mut self,
        entries: impl IntoIterator<Item = (&'static str, Constructor<T>)>,
    ) -> Self {
        for (type_name, constructor) in entries {
            self.register(type_name, constructor);
        }
        self
    }

    pub fn get(&self, type_name: &str) -> Option<Constructor<T>> {
        self.constructors.get(type_name).copied()
    }

    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constructors.keys().copied()
    }
}

impl<T: ?Sized> Default for ComponentFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Factories for both roles
#[derive(Default)]
pub struct Factories {
    pub listeners: ListenerFactory,
    pub dispatchers: DispatcherFactory,
}

impl Factories {
    pub fn new(listeners: ListenerFactory, dispatchers: DispatcherFactory) -> Self {
        Self {
            listeners,
            dispatchers,
        }
    }
}
