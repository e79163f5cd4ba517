/// Contract interfaces and helpers
///
/// Type-safe wrappers built on the contract adapter using the Alloy sol! macro.
///
/// # Available Contracts
///
/// - **ERC-20**: Standard fungible token interface (balances, approve, transfer)
/// - **FixedSwap**: Fixed-price token sale (deploy, fund, swap, redeem, withdraw)

pub mod erc20;
pub mod fixed_swap;

// Re-export commonly used types
pub use erc20::{Erc20, IERC20};
pub use fixed_swap::{FixedSwap, IFixedSwap, Purchase, SaleParams, SaleState};
