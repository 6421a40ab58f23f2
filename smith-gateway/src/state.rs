use std::sync::Arc;

use smith_core::{Answer, Question, User};
use smith_knowledge::KnowledgeRegistry;

use crate::chain::ResolverChain;
use crate::plugins::{COMMAND_PLUGIN, IMAGE_PLUGIN, PluginDispatcher};
use crate::providers::Provider;
use crate::resolvers::{
    AuthoringResolver, CommandResolver, FallbackResolver, ImageResolver, ResolveError,
    SemanticResolver,
};
use crate::session::SessionStore;

/// Everything the front-ends share.
pub struct AppState {
    pub registry: Arc<KnowledgeRegistry>,
    pub sessions: SessionStore,
    pub chain: ResolverChain,
}

impl AppState {
    /// Wire the standard chain: command, authoring, semantic, fallback.
    pub fn new(registry: Arc<KnowledgeRegistry>, provider: Arc<dyn Provider>) -> Self {
        let command = Arc::new(CommandResolver::new(registry.clone()));

        let mut plugins = PluginDispatcher::new(provider.clone());
        plugins.register(COMMAND_PLUGIN, command.clone());
        plugins.register(IMAGE_PLUGIN, Arc::new(ImageResolver::new(provider.clone())));

        let chain = ResolverChain::new()
            .with(command)
            .with(Arc::new(AuthoringResolver::new(registry.clone())))
            .with(Arc::new(SemanticResolver::new(
                registry.clone(),
                provider,
                plugins,
            )))
            .with(Arc::new(FallbackResolver));

        Self {
            registry,
            sessions: SessionStore::new(),
            chain,
        }
    }

    /// Resolve one question in the user's session.
    pub async fn ask(&self, user: &User, question: &Question) -> Result<Vec<Answer>, ResolveError> {
        let session = self
            .sessions
            .get_session(user)
            .ok_or(ResolveError::MissingInput("user id"))?;
        let mut session = session.lock().await;
        self.chain.ask(&mut session, question).await
    }
}
