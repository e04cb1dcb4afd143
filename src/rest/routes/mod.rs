pub mod coaches;
pub mod draft;
pub mod health;
pub mod messages;
pub mod profile;
pub mod schools;
pub mod session;
pub mod threads;
