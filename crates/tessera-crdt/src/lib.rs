//! LWW-Register and Composite-DAG CRDT implementations, plus the
//! kind-indexed registry the document dispatcher instantiates them from.

pub mod composite;
pub mod error;
pub mod lww;
pub mod register;
pub mod registry;

pub use composite::{decode_composite_body, encode_composite_input, CompositeBody, CompositeRegister};
pub use error::CrdtError;
pub use lww::LwwRegister;
pub use register::{CrdtKind, Delta, Register};
pub use registry::CrdtRegistry;
