//! Folding ordered chunk sequences into one logical value.
//!
//! A producer emits a value piece by piece; [`concat`] reduces the ordered
//! pieces back into the value they describe. Types opt in by implementing
//! [`Concat`]:
//!
//! - the domain records ([`Message`](crate::messages::Message),
//!   [`ToolCall`](crate::messages::ToolCall),
//!   [`ToolResult`](crate::messages::ToolResult)) implement it by hand
//! - other records use `#[derive(Concat)]`, which merges field by field
//! - callers holding type-erased chunks go through a [`ConcatRegistry`]
//!
//! Reduction takes shared references and builds a fresh value, so the same
//! chunk slice may be reduced from many threads at once.
//!
//! ## Example
//!
//! ```rust
//! use rill_core::concat::{concat, Concat};
//! use rill_core::messages::Message;
//!
//! let chunks = vec![
//!     Some(Message::assistant("Hel", vec![])),
//!     Some(Message::assistant("lo", vec![])),
//! ];
//! let message = concat(&chunks).unwrap();
//! assert_eq!(message.content, "Hello");
//! ```

pub mod policy;
pub mod registry;

pub use policy::{Appendable, IsEmpty};
pub use registry::{global_registry, ConcatRegistry};

use crate::errors::{ConcatError, ConcatResult};

/// A type whose ordered partial chunks can be reduced to one value.
pub trait Concat: Sized {
    /// Name used in error messages, e.g. `"message"`.
    const KIND: &'static str;

    /// Reduce a non-empty sequence of present chunks.
    fn concat_refs(chunks: &[&Self]) -> ConcatResult<Self>;

    /// Value produced for a sequence with no chunks.
    fn concat_empty() -> ConcatResult<Self> {
        Err(ConcatError::empty_input(Self::KIND))
    }

    /// Reduce a sequence in which individual chunks may be absent.
    ///
    /// Absent chunks are rejected with [`ConcatError::NilChunk`].
    fn concat_chunks(chunks: &[Option<Self>]) -> ConcatResult<Self> {
        if chunks.is_empty() {
            return Self::concat_empty();
        }
        let refs = chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| {
                chunk
                    .as_ref()
                    .ok_or_else(|| ConcatError::nil_chunk(Self::KIND, index))
            })
            .collect::<ConcatResult<Vec<_>>>()?;
        Self::concat_refs(&refs)
    }
}

/// Reduce an ordered sequence of possibly-absent chunks.
pub fn concat<T: Concat>(chunks: &[Option<T>]) -> ConcatResult<T> {
    T::concat_chunks(chunks)
}

/// Reduce an ordered sequence of chunks.
pub fn concat_slice<T: Concat>(chunks: &[T]) -> ConcatResult<T> {
    if chunks.is_empty() {
        return T::concat_empty();
    }
    let refs: Vec<&T> = chunks.iter().collect();
    T::concat_refs(&refs)
}

impl Concat for String {
    const KIND: &'static str = "string";

    fn concat_refs(chunks: &[&Self]) -> ConcatResult<Self> {
        let mut out = String::with_capacity(chunks.iter().map(|c| c.len()).sum());
        for chunk in chunks {
            out.push_str(chunk);
        }
        Ok(out)
    }
}

impl<T: Clone> Concat for Vec<T> {
    const KIND: &'static str = "list";

    fn concat_refs(chunks: &[&Self]) -> ConcatResult<Self> {
        let mut out = Vec::with_capacity(chunks.iter().map(|c| c.len()).sum());
        for chunk in chunks {
            out.extend(chunk.iter().cloned());
        }
        Ok(out)
    }
}

/// Present values are reduced; the result is `None` when no chunk has one.
impl<T: Concat> Concat for Option<T> {
    const KIND: &'static str = T::KIND;

    fn concat_refs(chunks: &[&Self]) -> ConcatResult<Self> {
        let present: Vec<&T> = chunks.iter().filter_map(|c| c.as_ref()).collect();
        if present.is_empty() {
            return Ok(None);
        }
        T::concat_refs(&present).map(Some)
    }
}
