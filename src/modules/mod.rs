pub mod catalog;
pub mod departments;
pub mod hierarchy;
