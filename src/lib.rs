//! Reactive mirrored collections
//!
//! Using **r3mirror** you can keep a *derived list* in sync with an observable
//! *source list*: the derived list always equals `map(filter(source))`.
//!
//! Two kinds of change are followed:
//! structural changes of the source (items added, removed, replaced, cleared)
//! and mutations of the individual items, which may move an item into or out
//! of the filtered set or just refresh its derived representation.
//!
//! *Views* are accessor-interfaces that also define the update protocol (the diff).
//! *Observers* register at a view and are notified synchronously with that diff.
//! The handles returned on registration own the observer, dropping them detaches it.
//!
//!# Examples
//!
//! ```
//! use r3mirror::{
//!     buffer::{singleton::SingletonBuffer, vec::VecBuffer},
//!     projection::mirror::Mirror,
//! };
//!
//! #[derive(Clone, Debug)]
//! struct Part { id: u32, stock: u32 }
//!
//! impl PartialEq for Part {
//!     fn eq(&self, other: &Self) -> bool { self.id == other.id }
//! }
//!
//! let bolts = SingletonBuffer::new(Part { id: 1, stock: 40 });
//! let nuts = SingletonBuffer::new(Part { id: 2, stock: 0 });
//!
//! let parts = VecBuffer::with_data(vec![bolts.clone(), nuts.clone()]);
//! let in_stock = Mirror::with_filter(
//!     &parts,
//!     |p: &SingletonBuffer<Part>| p.get(),
//!     |p| p.get().stock > 0,
//! ).unwrap();
//!
//! assert_eq!(in_stock.len(), 1);
//!
//! nuts.modify(|p| p.stock = 12).unwrap();   // enters the filtered set
//! bolts.modify(|p| p.stock = 0).unwrap();   // leaves it
//!
//! assert_eq!(in_stock.snapshot(), vec![Part { id: 2, stock: 12 }]);
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod projection;
pub mod view;

pub use {
    config::{MirrorOptions, UpdatePlacement},
    error::{Error, Result},
    projection::mirror::{Filter, Mapper, Mirror},
};
