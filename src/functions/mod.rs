pub mod primitives;
pub mod registry;

pub use primitives::{BinaryOp, UnaryOp};
pub use registry::Vocabulary;
