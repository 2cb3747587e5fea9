pub mod defaults;
pub mod time;
