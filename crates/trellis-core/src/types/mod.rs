mod float64;
mod generator;
mod id;


pub use float64::Float64;
pub use generator::IdGenerator;
pub use id::{Id, IdError};
