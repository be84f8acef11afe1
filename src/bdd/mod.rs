//! The BDD layer: nodes, the canonicalising forest, and the operations
//! (`apply`, `permute`, `from_bit`, `allsat`, ...) built on top of it.
//!
//! Split into three files along the same seam the teacher uses to separate
//! plain data from the structure that owns and canonicalises it
//! (`daemontus-bn-scc-experiments/src/bdd/mod.rs`'s `BDDNode` vs. `BDD`/
//! `BDDWorker`): [`node`] is the data, [`forest`] is the canonicalising store
//! plus the virtual-power view, [`ops`] is everything built on top via
//! `getnode`/`add`.

pub mod forest;
pub mod node;
pub mod ops;
