//! Per-call tool options.
//!
//! Each tool implementation defines its own options struct. Callers attach
//! modifiers for that struct to a [`ToolOptions`], and the tool folds the ones
//! aimed at its type over its defaults with [`ToolOptions::apply`]. Modifiers
//! for other types are ignored, so one option list can be handed to every
//! tool in a call.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

type Modifier = Arc<dyn Fn(&mut dyn Any) + Send + Sync>;

#[derive(Clone)]
struct Entry {
    target: TypeId,
    target_name: &'static str,
    modify: Modifier,
}

/// Options passed to a single tool run.
///
/// # Example
///
/// ```rust
/// use rill_tools::ToolOptions;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct SearchOptions {
///     limit: usize,
/// }
///
/// let options = ToolOptions::new().with(|o: &mut SearchOptions| o.limit = 3);
/// assert_eq!(options.apply(SearchOptions::default()).limit, 3);
/// ```
#[derive(Clone, Default)]
pub struct ToolOptions {
    entries: Vec<Entry>,
}

impl ToolOptions {
    /// Create an empty option list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a modifier for the options type `T`.
    #[must_use]
    pub fn with<T, F>(mut self, modify: F) -> Self
    where
        T: Any,
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.entries.push(Entry {
            target: TypeId::of::<T>(),
            target_name: type_name::<T>(),
            modify: Arc::new(move |value: &mut dyn Any| {
                if let Some(value) = value.downcast_mut::<T>() {
                    modify(value);
                }
            }),
        });
        self
    }

    /// Append all modifiers of `other`, after the existing ones.
    #[must_use]
    pub fn merge(mut self, other: &ToolOptions) -> Self {
        self.entries.extend(other.entries.iter().cloned());
        self
    }

    /// Apply the modifiers aimed at `T` to `base`, in insertion order.
    #[must_use]
    pub fn apply<T: Any>(&self, mut base: T) -> T {
        let target = TypeId::of::<T>();
        for entry in self.entries.iter().filter(|e| e.target == target) {
            (entry.modify)(&mut base);
        }
        base
    }

    /// Whether any modifier targets `T`.
    #[must_use]
    pub fn targets<T: Any>(&self) -> bool {
        let target = TypeId::of::<T>();
        self.entries.iter().any(|e| e.target == target)
    }

    /// Number of modifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no modifiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ToolOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.target_name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct SearchOptions {
        limit: usize,
        region: String,
    }

    impl Default for SearchOptions {
        fn default() -> Self {
            Self {
                limit: 10,
                region: "global".into(),
            }
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct OtherOptions {
        verbose: bool,
    }

    #[test]
    fn test_apply_in_order() {
        let options = ToolOptions::new()
            .with(|o: &mut SearchOptions| o.limit = 3)
            .with(|o: &mut OtherOptions| o.verbose = true)
            .with(|o: &mut SearchOptions| o.limit *= 2);

        assert_eq!(
            options.apply(SearchOptions::default()),
            SearchOptions {
                limit: 6,
                region: "global".into()
            }
        );
        assert_eq!(options.apply(OtherOptions::default()), OtherOptions { verbose: true });
        assert_eq!(options.len(), 3);
    }

    #[test]
    fn test_unrelated_options_ignored() {
        let options = ToolOptions::new().with(|o: &mut OtherOptions| o.verbose = true);
        assert!(!options.targets::<SearchOptions>());
        assert_eq!(options.apply(SearchOptions::default()), SearchOptions::default());
        assert!(ToolOptions::new().is_empty());
    }

    #[test]
    fn test_merge_keeps_order() {
        let base = ToolOptions::new().with(|o: &mut SearchOptions| o.region = "eu".into());
        let call = ToolOptions::new().with(|o: &mut SearchOptions| o.region = "us".into());
        let merged = base.merge(&call);
        assert_eq!(merged.apply(SearchOptions::default()).region, "us");
        assert!(format!("{merged:?}").contains("SearchOptions"));
    }
}
