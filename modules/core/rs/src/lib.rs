pub mod alignment;
pub mod num;
