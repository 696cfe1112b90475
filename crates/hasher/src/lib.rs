//! Deterministic cache-key computation for strider tasks
//!
//! A task's cache key (its "salt") is derived from three ingredients:
//! - content digests of the environment glob files (lockfiles, tool configs
//!   and other files that affect every task without being declared inputs)
//! - the command string executed for the task
//! - a custom key component (explicit configuration plus cache-relevant
//!   CLI arguments)
//!
//! Environment digests are expensive to compute (a filesystem walk plus
//! per-file hashing), so they are memoized per pattern set in
//! [`EnvHashCache`] for the lifetime of the process. The cache deliberately
//! never invalidates: a run that wants to observe filesystem changes starts
//! a new process.

pub mod env_hash;
pub mod inputs;
pub mod salt;
pub mod target;

pub use env_hash::EnvHashCache;
pub use salt::{hash_strings, salt};
pub use target::{Target, TargetHasher, TargetHasherOptions};
