pub mod chat;
pub mod home;
