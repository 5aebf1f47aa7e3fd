pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod normalizer;
pub mod replicate;
pub mod server;
pub mod styles;

pub use config::{Config, ReplicateConfig};
pub use error::{GenError, Result};
pub use models::{CanonicalResult, MediaReference, PredictionInput, RawValue, UrlAccessor};
pub use normalizer::{extract_candidates, extract_text, normalize, normalize_item};
pub use replicate::{GenerationClient, ReplicateClient};
pub use server::AppState;
