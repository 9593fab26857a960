//! Protobuf messages and tonic stubs for the `tasklist.TaskList` service.
//!
//! Regenerate with `buf generate` from this directory; the `.proto` source
//! lives under `proto/`.

#[allow(clippy::all)]
mod gen;

pub use gen::*;
