pub mod conversion;
pub mod definition;
mod resolver;
pub mod store;

pub use conversion::*;
pub use definition::*;
pub use store::*;
