pub mod automation;
pub mod client;
pub mod config;
pub mod confirm;
pub mod error;
pub mod io;
pub mod keyvault;
pub mod paths;

pub use confirm::{ActionRequest, Confirmer, ExecutionOutcome, Impact, Session};
pub use error::{AzopsError, Result};
