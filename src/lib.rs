pub mod app;
pub mod charts;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod filters;
pub mod format;
pub mod models;
pub mod repository;
pub mod state;
pub mod storage;

pub use app::{sign_in, sign_out};
pub use config::ClientConfig;
pub use errors::{FetchFailure, FetchResult};
pub use repository::{Credentials, ReadingRepository};
pub use state::{CacheStatus, LocalDataCache};
