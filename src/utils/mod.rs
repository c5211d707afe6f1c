pub mod month;
pub mod numbers;

pub use month::Month;
