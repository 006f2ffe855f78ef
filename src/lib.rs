mod api;
mod config;
mod error;
mod secrets;
mod solver;

pub use api::{responses, CloudDnsClient, DEFAULT_API_URL};
pub use config::{GroupName, SolverConfig};
pub use error::Error;
pub use secrets::SecretStore;
pub use solver::{AnexiaDns01Solver, ChallengeRequest, Solver};
