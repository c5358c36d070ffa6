pub mod auth;
pub mod categories;
pub mod custom;
pub mod dashboard;
pub mod device;
pub mod settings;
pub mod stats;
pub mod study;
pub mod words;
