pub mod hot_reload;
pub mod server;


pub use hot_reload::{reload_now, HotReloader, ReloadGate};
pub use server::{LinkParams, SharedRewriter, WebServer};
