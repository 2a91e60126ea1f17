pub mod enums;
pub mod screening;

pub use enums::*;
pub use screening::*;
