pub mod filter;
pub mod issue;
pub mod team;
