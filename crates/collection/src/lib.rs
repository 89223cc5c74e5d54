//! Observable in-memory person collection.
//!
//! [`EntityCollection`] is the sole authority over person identity and
//! storage. Every mutation is followed by a synchronous notification pass
//! over the registered listeners, in registration order.

pub mod collection;
pub mod error;
pub mod listener;
pub mod person;

pub use collection::EntityCollection;
pub use common::PersonId;
pub use error::{ListenerError, Result};
pub use listener::{Listener, ListenerId};
pub use person::Person;
