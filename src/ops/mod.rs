pub mod check;
pub mod expand;
pub mod filter;
pub mod sort;
pub mod tree;
