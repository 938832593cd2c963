mod snapshot;
mod store;

pub use snapshot::MemorySnapshot;
pub use store::MemoryStore;
