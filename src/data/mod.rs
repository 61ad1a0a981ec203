mod model;

pub use model::ExecutionContext;
