pub mod access;

pub use access::protect;
