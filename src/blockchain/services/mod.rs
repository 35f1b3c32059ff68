pub mod balance;
pub mod nft;
pub mod portfolio;
pub mod price;
pub mod swap;
pub mod transfer;
