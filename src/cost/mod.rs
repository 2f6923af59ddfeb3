pub mod cost_function;
pub mod cross_entropy;
pub mod quadratic;

pub use cost_function::CostFunction;
pub use cross_entropy::CrossEntropyCost;
pub use quadratic::QuadraticCost;
