pub mod auth;
pub mod config;
pub mod metrics;
pub mod object_store;
pub mod orchestrator;
pub mod queue;
pub mod store;
pub mod transform;
pub mod worker;

pub use auth::{
    create_authenticator, AuthError, AuthRequest, Authenticator, Identity, NoneAuthenticator,
    TokenAuthenticator, TokenSigner,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, AuthMethod, Config,
    ConfigError, DatabaseConfig, HttpObjectStoreConfig, ObjectStoreBackend, ObjectStoreConfig,
    SanitizedConfig, ServerConfig,
};
pub use object_store::{HttpObjectStore, MemoryObjectStore, ObjectStore, ObjectStoreError};
pub use orchestrator::{
    JobStatus, OrchestratorError, TaskOrchestrator, UploadFile, UploadOutcome,
};
pub use queue::{
    ClaimedJob, JobOutcome, JobPayload, JobQueue, JobState, MemoryJobQueue, QueueError,
};
pub use store::{
    ImageStatistics, ImageTask, NewImageStatistics, NewImageTask, NewUser, SqliteTaskStore,
    SqliteUserStore, StoreError, TaskStore, User, UserStore,
};
pub use transform::{TransformError, TransformKind};
pub use worker::ImageWorker;
