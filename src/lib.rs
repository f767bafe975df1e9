// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Accord - the merge engine of a replicated JSON-like document store.
//!
//! Replicas ("actors") edit a shared tree of maps and lists independently
//! and exchange their edits as changes. This crate folds causally ready
//! changes into one document state that every replica converges to, and
//! reports what each batch observably changed as a patch.
//!
//! # Quick Start
//!
//! ```
//! use accord::{Backend, Change, Op, PatchMode, ROOT_ID};
//!
//! let mut doc = Backend::new();
//!
//! // Two replicas assign the same key concurrently.
//! let magpie = Change::new("actor1", 1, vec![Op::set(ROOT_ID, "bird", "magpie")]);
//! let blackbird = Change::new("actor2", 1, vec![Op::set(ROOT_ID, "bird", "blackbird")]);
//!
//! let patch = doc.apply_changes(&[magpie, blackbird], PatchMode::Materialize).unwrap();
//! let json = serde_json::to_value(&patch).unwrap();
//! assert_eq!(json["diffs"][0]["value"], "blackbird");
//! assert_eq!(json["diffs"][0]["conflicts"][0]["value"], "magpie");
//! ```

pub mod apply;
pub mod backend;
pub mod change;
pub mod clock;
pub mod config;
pub mod error;
pub mod id;
pub mod list;
pub mod patch;
pub mod register;
pub mod store;
pub mod value;

pub use backend::Backend;
pub use backend::PatchMode;
pub use backend::apply_changes;
pub use backend::init;
pub use change::Change;
pub use change::Op;
pub use clock::Clock;
pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use id::ActorId;
pub use id::ElemId;
pub use id::ObjectId;
pub use id::ROOT_ID;
pub use patch::Diff;
pub use patch::Patch;
pub use value::Value;
