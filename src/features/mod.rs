pub mod acquisition;
pub mod catalog;
pub mod navigation;
pub mod settings;
pub mod subscriptions;
