/// The public view of an account
pub mod account;

/// A client for the accounts API
pub mod client;
pub use client::Client;

/// The `{status, message, data}` wrapper around every response
pub mod envelope;
pub use envelope::Envelope;

/// Things that can go wrong in the API
pub mod error;
pub use error::Error;

/// Log in and get a token
pub mod login;

/// Register a new account, or fetch your own
pub mod register;
