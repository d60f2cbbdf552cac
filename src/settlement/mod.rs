pub mod balances;
pub mod reducer;
