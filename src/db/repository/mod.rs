pub mod screening;

pub use screening::*;
