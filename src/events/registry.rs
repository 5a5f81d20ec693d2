//! Stable small-integer keys for payload types.
//!
//! Every payload type gets a sequential [`TypeKey`] on first use, valid for
//! the lifetime of the process. The registry keeps both directions
//! (`TypeId -> TypeKey` and `TypeKey -> TypeInfo`) so buses can route on a
//! cheap integer key while diagnostics can still name the type behind it.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Mutex;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::warn;

use crate::events::types::{EventError, EventResult};

/// Stable identifier for one payload type within the process.
///
/// Keys are sequential from zero in first-use order, never reused and never
/// compacted. Two distinct types never share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(u32);

impl TypeKey {
    /// The raw index behind this key.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.0)
    }
}

/// What the registry knows about an allocated key.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// Runtime identity of the payload type.
    pub id: TypeId,
    /// Fully qualified type name.
    pub name: &'static str,
}

/// Bidirectional type ↔ key registry.
pub struct TypeRegistry {
    forward: DashMap<TypeId, TypeKey>,
    reverse: DashMap<TypeKey, TypeInfo>,
    next: Mutex<u32>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            forward: DashMap::new(),
            reverse: DashMap::new(),
            next: Mutex::new(0),
        }
    }

    /// Returns the key for `T`, allocating the next sequential key on first
    /// use. Never fails.
    pub fn key_of<T: Any>(&self) -> TypeKey {
        self.key_for(TypeId::of::<T>(), type_name::<T>())
    }

    fn key_for(&self, id: TypeId, name: &'static str) -> TypeKey {
        if let Some(key) = self.forward.get(&id) {
            return *key;
        }
        // Slow path: take the allocation lock and re-check, so concurrent
        // first use of one type allocates a single key and the two maps
        // never disagree.
        let mut next = self.next.lock().unwrap();
        if let Some(key) = self.forward.get(&id) {
            return *key;
        }
        let key = TypeKey(*next);
        *next += 1;
        self.reverse.insert(key, TypeInfo { id, name });
        self.forward.insert(id, key);
        key
    }

    /// Key for an already-registered runtime type, `None` if the type was
    /// never seen. Does not allocate: the untyped send path must not invent
    /// keys it cannot name.
    pub fn lookup(&self, id: TypeId) -> Option<TypeKey> {
        self.forward.get(&id).map(|key| *key)
    }

    /// Reverse lookup. A key that was never allocated is a caller logic bug
    /// (typically a stale key); it is logged and reported, never fatal.
    pub fn type_of(&self, key: TypeKey) -> EventResult<TypeInfo> {
        match self.reverse.get(&key) {
            Some(info) => Ok(*info),
            None => {
                warn!(%key, "reverse lookup for unregistered type key");
                Err(EventError::TypeNotFound(key))
            }
        }
    }

    /// Number of types registered so far.
    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    /// True when no type has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static REGISTRY: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::new);

/// Process-wide type registry shared by every bus scope.
///
/// All buses resolve keys here, so one payload type maps to one key no matter
/// which scope it travels through. Created on first use, lives for the
/// process.
pub struct GlobalTypeRegistry;

impl GlobalTypeRegistry {
    /// See [`TypeRegistry::key_of`].
    pub fn key_of<T: Any>() -> TypeKey {
        REGISTRY.key_of::<T>()
    }

    /// See [`TypeRegistry::lookup`].
    pub fn lookup(id: TypeId) -> Option<TypeKey> {
        REGISTRY.lookup(id)
    }

    /// See [`TypeRegistry::type_of`].
    pub fn type_of(key: TypeKey) -> EventResult<TypeInfo> {
        REGISTRY.type_of(key)
    }
}
