pub mod config;
pub mod deferred;
pub mod readiness;
pub mod transport;
pub mod util;
