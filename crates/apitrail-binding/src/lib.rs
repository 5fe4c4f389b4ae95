//! # apitrail-binding
//!
//! Cross-version entry binding.
//!
//! For each adjacent version pair and each submodule present in both, every
//! old entry is linked to the position of its counterpart in the new entry
//! list:
//! - Exact identity: owner and signature unchanged
//! - Tolerant identity: same owner and same function name
//!
//! Durations are propagated along the links as they are made, so versions
//! must be bound in increasing order.
//!
//! ## Example
//!
//! ```rust
//! use apitrail_binding::Binder;
//! use apitrail_core::{ApiEntry, ForwardLink};
//!
//! let mut old = vec![ApiEntry::new("m", "Methods", "impl Foo", "fn bar(x: i32)")];
//! let mut new = vec![ApiEntry::new("m", "Methods", "impl Foo", "fn bar(x: i32, y: i32)")];
//!
//! let stats = Binder::new().bind_entries(&mut old, &mut new);
//! assert_eq!(old[0].forward_link, Some(ForwardLink::tolerant(0)));
//! assert_eq!(stats.tolerant, 1);
//! ```

pub mod binder;
pub mod identity;

pub use binder::{BindStats, Binder, BindingConfig, DurationPolicy};
pub use identity::{identity, is_exact, is_tolerant};
