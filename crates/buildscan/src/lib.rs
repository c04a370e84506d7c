pub mod aggregate;
pub mod broadcast;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod transport;

pub use aggregate::{summarize, Summary};
pub use broadcast::{LifecycleBroadcaster, LifecycleEvent};
pub use config::{load_config, load_effective_config, ClientConfig, ControllerSettings};
pub use controller::{ControllerError, ControllerView, Lifecycle, Progress, ScanController};
pub use error::{BuildscanError, ConfigError, Result};
pub use model::{Category, JobSnapshot, JobStatus, ResultRecord, UploadFile, ValidationError};
pub use transport::{Endpoints, HttpScanClient, ScanApi, TransportError};
