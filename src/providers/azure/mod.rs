mod client;
mod definitions;
mod grouping;
mod provider;
mod summary;
pub mod types;

pub use provider::AzureDevOpsProvider;
