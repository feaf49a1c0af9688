//! Reactive parameter store.
//!
//! The store is owned and mutated by the UI substrate (sliders, drag handles).
//! The compiler never writes to it: compiled artifacts read the referenced
//! slots each time they are invoked, so a write is visible on the next read.
//!
//! Handles are cheap to clone and all clones share one slot table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::backend::eval::{EvalError, Value};

use super::descriptor::ParamRef;

struct StoreShared {
    name: String,
    slots: RwLock<HashMap<String, Value>>,
}

/// Shared handle to a named reactive store
#[derive(Clone)]
pub struct ReactiveStore {
    shared: Arc<StoreShared>,
}

impl ReactiveStore {
    /// Create an empty store. `name` is the identifier the rendering
    /// substrate knows the store by.
    pub fn new(name: impl Into<String>) -> Self {
        ReactiveStore {
            shared: Arc::new(StoreShared {
                name: name.into(),
                slots: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Read the current value of a parameter
    pub fn current_value(&self, param: &ParamRef) -> Result<Value, EvalError> {
        let value = self
            .shared
            .slots
            .read()
            .get(param.name())
            .cloned()
            .ok_or_else(|| EvalError::MissingParam {
                store: self.shared.name.clone(),
                param: param.name().to_string(),
            })?;
        trace!(target: "plotfn::eval", store = %self.shared.name, %param, ?value, "Store read");
        Ok(value)
    }

    /// Write a parameter. Only the owning substrate (and tests) call this.
    pub fn set(&self, param: impl Into<String>, value: Value) {
        self.shared.slots.write().insert(param.into(), value);
    }

    pub fn contains(&self, param: &ParamRef) -> bool {
        self.shared.slots.read().contains_key(param.name())
    }

    /// Two handles are equal when they share the same slot table
    pub fn same_store(&self, other: &ReactiveStore) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl PartialEq for ReactiveStore {
    fn eq(&self, other: &Self) -> bool {
        self.same_store(other)
    }
}

impl fmt::Debug for ReactiveStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveStore")
            .field("name", &self.shared.name)
            .field("slots", &self.shared.slots.read().len())
            .finish()
    }
}
