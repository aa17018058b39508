//! Line-oriented s-expression protocol.

pub mod dispatch;
pub mod frame;
pub mod sexp;

pub use dispatch::handle_message;
