pub mod card;
pub mod config;
pub mod effect;
pub mod event;
pub mod price;
pub mod runtime;
pub mod sink;
pub mod sync;
