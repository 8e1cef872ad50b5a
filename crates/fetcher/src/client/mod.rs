//! Client module — filesystem access behind the [`LogStore`] trait.

pub mod store;
pub mod live;
pub mod fake;

pub use store::{LogStore, StoreFuture};
pub use live::LocalStore;
pub use fake::FakeStore;
