pub mod server;
pub mod session;
pub mod signal;
pub mod stun;
