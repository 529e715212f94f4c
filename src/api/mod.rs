pub mod pages;
pub mod v1;
