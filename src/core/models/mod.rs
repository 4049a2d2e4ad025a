pub mod audit;
pub mod dispute;
pub mod transaction;
pub mod user;
