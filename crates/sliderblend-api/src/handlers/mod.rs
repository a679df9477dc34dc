pub mod bot;
pub mod files;
pub mod health;
pub mod process;
