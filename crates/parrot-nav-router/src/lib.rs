pub mod contracts;
pub mod driver;
pub mod memory;

pub use contracts::*;
pub use driver::*;
pub use memory::*;
