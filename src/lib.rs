//! `flathash` is a single-writer, open-addressed hash map with in-band collision chaining.
//!
//! The table is a flat `Vec` of slots; each slot is empty, holds one entry directly, or — once a
//! second key lands on the same index — owns a small chain of entries sharing it. Growth doubles
//! the table and re-homes every live entry once occupancy crosses `capacity * load_factor`. The
//! map is not internally synchronized: it is `Send`/`Sync` precisely when its key, value, and
//! hasher types are, the same contract `std::collections::HashMap` offers.
//!
//! ```
//! use flathash::Map;
//!
//! let mut scores = Map::new();
//! scores.put("alice", 10);
//! scores.put("bob", 7);
//! *scores.entry("alice").or_insert(0) += 5;
//! assert_eq!(scores.get("alice"), Some(&15));
//! ```

mod chain;
mod cursor;
mod entry;
mod error;
mod iter;
mod map;
mod slot;
mod views;

#[cfg(feature = "serialize")]
mod ser;

pub use cursor::EntryCursor;
pub use entry::EntryRef;
pub use error::MapError;
pub use iter::{IntoIter, Iter, IterMut};
pub use map::Map;
pub use views::{KeysView, ValuesView};

#[cfg(feature = "serialize")]
pub use ser::{from_bytes, to_bytes};
