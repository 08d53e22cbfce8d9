pub mod classifier;
pub mod config;
pub mod data_sources;
pub mod deploy_watcher;
pub mod events;
pub mod metadata;
pub mod mint_watcher;
pub mod notify;
pub mod rpc;

/// The resolver wired to the live chain and the live metadata APIs.
pub type Resolver = metadata::MetadataResolver<rpc::RpcClient, data_sources::MetadataClient>;
