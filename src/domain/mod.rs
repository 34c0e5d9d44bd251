pub mod access;
pub mod pagination;
pub mod visibility;
