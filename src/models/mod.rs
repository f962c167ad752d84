pub mod booking;
pub mod category;
pub mod company;
pub mod provider;
pub mod user;
