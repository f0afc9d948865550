// File: `crates/tessera-core/src/lib.rs`
pub mod dockey;
pub mod hash;
pub mod lattice;
pub mod lwwreg;

pub use dockey::DocKey;
pub use hash::{ContentId, Hasher};
pub use lattice::{DeltaCRDT, Lattice};
pub use lwwreg::LwwValue;
