/// Background jobs spawned by `main`
pub mod token_cleanup;

pub use token_cleanup::start_token_cleanup;
