pub mod restore;
pub mod stripe;
