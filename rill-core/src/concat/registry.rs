//! Type-erased reducer registry.
//!
//! Code that only sees `Box<dyn Any>` chunks (for example a graph runtime
//! joining the outputs of arbitrary nodes) looks up the reducer by the
//! chunks' runtime type here.

use parking_lot::RwLock;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{concat_slice, Concat};
use crate::errors::{ConcatError, ConcatResult};
use crate::messages::{Message, ToolCall, ToolResult};

/// A boxed chunk of some registered type.
pub type AnyChunk = Box<dyn Any + Send>;

type ErasedReducer =
    Arc<dyn Fn(&[&(dyn Any + Send + 'static)]) -> ConcatResult<AnyChunk> + Send + Sync>;

#[derive(Clone)]
struct Entry {
    name: &'static str,
    reducer: ErasedReducer,
}

/// Registry from type identity to reducer.
pub struct ConcatRegistry {
    reducers: RwLock<HashMap<TypeId, Entry>>,
}

impl ConcatRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reducers: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry holding the built-in domain reducers.
    #[must_use]
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register::<Message>();
        registry.register::<ToolCall>();
        registry.register::<ToolResult>();
        registry.register::<String>();
        registry
    }

    /// Register `T` using its [`Concat`] implementation.
    pub fn register<T>(&self)
    where
        T: Concat + Send + 'static,
    {
        self.register_fn::<T, _>(|chunks: &[&T]| {
            if chunks.is_empty() {
                T::concat_empty()
            } else {
                T::concat_refs(chunks)
            }
        });
    }

    /// Register a custom reducer for `T`, replacing any previous one.
    pub fn register_fn<T, F>(&self, reducer: F)
    where
        T: Send + 'static,
        F: Fn(&[&T]) -> ConcatResult<T> + Send + Sync + 'static,
    {
        let erased: ErasedReducer = Arc::new(move |chunks: &[&(dyn Any + Send + 'static)]| {
            let typed = chunks
                .iter()
                .enumerate()
                .map(|(index, chunk)| {
                    chunk
                        .downcast_ref::<T>()
                        .ok_or(ConcatError::TypeMismatch {
                            expected: type_name::<T>(),
                            index,
                        })
                })
                .collect::<ConcatResult<Vec<&T>>>()?;
            reducer(typed.as_slice()).map(|value| Box::new(value) as AnyChunk)
        });
        self.reducers.write().insert(
            TypeId::of::<T>(),
            Entry {
                name: type_name::<T>(),
                reducer: erased,
            },
        );
    }

    /// Check if a reducer is registered for `T`.
    pub fn contains<T: 'static>(&self) -> bool {
        self.reducers.read().contains_key(&TypeId::of::<T>())
    }

    /// Names of all registered types.
    pub fn list(&self) -> Vec<&'static str> {
        self.reducers.read().values().map(|e| e.name).collect()
    }

    /// Reduce typed chunks with the registered reducer for `T`.
    pub fn concat<T: Send + 'static>(&self, chunks: &[T]) -> ConcatResult<T> {
        let entry = self
            .entry(TypeId::of::<T>())
            .ok_or(ConcatError::Unregistered(type_name::<T>()))?;
        let erased: Vec<&(dyn Any + Send + 'static)> = chunks
            .iter()
            .map(|c| c as &(dyn Any + Send + 'static))
            .collect();
        let out = (entry.reducer)(erased.as_slice())?;
        out.downcast::<T>()
            .map(|b| *b)
            .map_err(|_| ConcatError::TypeMismatch {
                expected: type_name::<T>(),
                index: 0,
            })
    }

    /// Reduce boxed chunks, dispatching on the runtime type of the first one.
    ///
    /// Every chunk must have the same concrete type.
    pub fn concat_any(&self, chunks: &[AnyChunk]) -> ConcatResult<AnyChunk> {
        let Some(first) = chunks.first() else {
            return Err(ConcatError::empty_input("any"));
        };
        let type_id = (**first).type_id();
        let entry = self
            .entry(type_id)
            .ok_or(ConcatError::Unregistered("dyn Any"))?;
        let refs: Vec<&(dyn Any + Send + 'static)> = chunks.iter().map(|c| &**c).collect();
        (entry.reducer)(refs.as_slice())
    }

    fn entry(&self, type_id: TypeId) -> Option<Entry> {
        self.reducers.read().get(&type_id).cloned()
    }
}

impl Default for ConcatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ConcatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcatRegistry")
            .field("types", &self.list())
            .finish()
    }
}

/// Global default registry.
static GLOBAL_REGISTRY: std::sync::OnceLock<ConcatRegistry> = std::sync::OnceLock::new();

/// Get the global reducer registry.
pub fn global_registry() -> &'static ConcatRegistry {
    GLOBAL_REGISTRY.get_or_init(ConcatRegistry::with_defaults)
}

/// Reduce typed chunks, falling back to `T`'s own [`Concat`] impl when the
/// global registry has no override.
pub fn concat_registered<T>(chunks: &[T]) -> ConcatResult<T>
where
    T: Concat + Send + 'static,
{
    let registry = global_registry();
    if registry.contains::<T>() {
        registry.concat(chunks)
    } else {
        concat_slice(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter(u32);

    #[test]
    fn test_defaults_registered() {
        let registry = ConcatRegistry::with_defaults();
        assert!(registry.contains::<Message>());
        assert!(registry.contains::<ToolCall>());
        assert!(registry.contains::<ToolResult>());
        assert!(!registry.contains::<Counter>());
    }

    #[test]
    fn test_unregistered_type() {
        let registry = ConcatRegistry::new();
        let err = registry.concat(&[Counter(1)]).unwrap_err();
        assert!(matches!(err, ConcatError::Unregistered(_)));
    }

    #[test]
    fn test_register_fn() {
        let registry = ConcatRegistry::new();
        registry.register_fn(|chunks: &[&Counter]| Ok(Counter(chunks.iter().map(|c| c.0).sum())));
        let out = registry.concat(&[Counter(1), Counter(2), Counter(3)]).unwrap();
        assert_eq!(out, Counter(6));
    }

    #[test]
    fn test_concat_any_dispatches_on_runtime_type() {
        let registry = ConcatRegistry::with_defaults();
        let chunks: Vec<AnyChunk> = vec![
            Box::new(Message::assistant("a", vec![])),
            Box::new(Message::assistant("b", vec![])),
        ];
        let out = registry.concat_any(&chunks).unwrap();
        let message = out.downcast::<Message>().unwrap();
        assert_eq!(message.content, "ab");
    }

    #[test]
    fn test_concat_any_type_mismatch() {
        let registry = ConcatRegistry::with_defaults();
        let chunks: Vec<AnyChunk> = vec![Box::new("a".to_string()), Box::new(1u32)];
        let err = registry.concat_any(&chunks).unwrap_err();
        assert!(matches!(err, ConcatError::TypeMismatch { index: 1, .. }));
    }

    #[test]
    fn test_concat_any_empty() {
        let registry = ConcatRegistry::with_defaults();
        assert!(matches!(
            registry.concat_any(&[]),
            Err(ConcatError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_empty_tool_results_are_vacuous() {
        let registry = ConcatRegistry::with_defaults();
        let out: ToolResult = registry.concat(&[]).unwrap();
        assert!(out.parts.is_empty());
    }

    #[test]
    fn test_global_registry() {
        let out = concat_registered(&["x".to_string(), "y".to_string()]).unwrap();
        assert_eq!(out, "xy");
    }
}
