pub mod auth;
pub mod catalog;
pub mod categories;
pub mod health;
pub mod materials;
pub mod tutor;
