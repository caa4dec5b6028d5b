pub mod replay;
pub mod search;
