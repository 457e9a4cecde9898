pub mod reports;
pub mod representation;
pub mod slug;
