use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Typed handle for a blackboard entry.
///
/// The name is the actual storage key, so a `BbKey<T>` and a plain string
/// address the same slot. The type parameter only fixes what the typed
/// accessors ask for.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> fmt::Debug for BbKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BbKey").field(&self.name).finish()
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

/// Shared key-value context for one tree.
///
/// Reads are type-checked: a value stored as one type is never handed out as
/// another. A missing key and a type mismatch both read as `None`.
#[derive(Default)]
pub struct Blackboard {
    values: BTreeMap<String, Box<dyn Any>>,
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blackboard")
            .field("len", &self.values.len())
            .finish()
    }
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing whatever was there (of any type).
    pub fn set<T: 'static>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    pub fn try_get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref::<T>()
    }

    pub fn try_get_mut<T: 'static>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key)?.downcast_mut::<T>()
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Remove `key` regardless of its stored type. Returns whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Remove and return the value if it is stored as `T`; a mismatched value stays in place.
    pub fn take<T: 'static>(&mut self, key: &str) -> Option<T> {
        if !self.values.get(key)?.is::<T>() {
            return None;
        }
        let value = self.values.remove(key)?;
        value.downcast::<T>().ok().map(|b| *b)
    }

    pub fn contains<T: 'static>(&self, key: BbKey<T>) -> bool {
        self.try_get::<T>(key.name).is_some()
    }

    pub fn insert<T: 'static>(&mut self, key: BbKey<T>, value: T) {
        self.set(key.name, value);
    }

    pub fn get<T: 'static>(&self, key: BbKey<T>) -> Option<&T> {
        self.try_get(key.name)
    }

    pub fn get_mut<T: 'static>(&mut self, key: BbKey<T>) -> Option<&mut T> {
        self.try_get_mut(key.name)
    }

    pub fn take_key<T: 'static>(&mut self, key: BbKey<T>) -> Option<T> {
        self.take(key.name)
    }
}
