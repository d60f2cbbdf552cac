pub mod receipt;
pub mod split;
