use std::sync::Arc;

use smith_core::{Answer, Question};

use crate::providers::Provider;
use crate::resolvers::{ResolveError, Resolver};
use crate::session::UserSession;

/// Generates an image from the question text.
pub struct ImageResolver {
    provider: Arc<dyn Provider>,
}

impl ImageResolver {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl Resolver for ImageResolver {
    fn name(&self) -> &str {
        "image"
    }

    async fn resolve(
        &self,
        _session: &mut UserSession,
        question: &Question,
    ) -> Result<Vec<Answer>, ResolveError> {
        if question.is_blank() {
            return Err(ResolveError::MissingInput("image prompt"));
        }
        let urls = self.provider.generate_image(&question.text).await?;
        Ok(urls
            .into_iter()
            .map(|url| Answer::new(url.clone()).with_image_link(url))
            .collect())
    }
}
