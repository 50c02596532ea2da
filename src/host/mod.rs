// Host-side implementations of the capability ports. Real editor hosts
// bring their own; the in-memory host backs the test-suite and embedders
// that run the extension without a full editor.

pub mod in_memory;

pub use in_memory::{InMemoryHost, InMemoryStyle};
