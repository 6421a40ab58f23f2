//! Question answering gateway for agent-smith.

pub mod chain;
pub mod cli;
pub mod plugins;
pub mod providers;
pub mod resolvers;
pub mod server;
pub mod session;
pub mod state;

pub use chain::ResolverChain;
pub use plugins::PluginDispatcher;
pub use providers::{OpenAiCompatibleClient, Provider, ProviderError};
pub use resolvers::{ResolveError, Resolver};
pub use session::{SessionState, SessionStore, UserSession};
pub use state::AppState;
