//! Web search capability backed by daedra (DuckDuckGo).

use crate::capability::Capability;
use crate::types::{AppError, Result, SearchSnippet};
use async_trait::async_trait;

/// Default number of results requested per search.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Web search capability powered by daedra.
pub struct WebSearchCapability {
    max_results: usize,
}

impl WebSearchCapability {
    /// Create a search capability with the default result limit.
    pub fn new() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Create a search capability with a custom result limit.
    pub fn with_max_results(max_results: usize) -> Self {
        Self { max_results }
    }
}

impl Default for WebSearchCapability {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Capability for WebSearchCapability {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for up-to-date information using DuckDuckGo"
    }

    async fn query(&self, query: &str) -> Result<Vec<SearchSnippet>> {
        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: self.max_results,
                ..Default::default()
            }),
        };

        match daedra::tools::search::perform_search(&search_args).await {
            Ok(response) => Ok(response
                .data
                .iter()
                .map(|result| SearchSnippet {
                    title: result.title.clone(),
                    url: Some(result.url.clone()),
                    snippet: result.description.clone(),
                })
                .collect()),
            Err(e) => Err(AppError::Capability {
                name: "web_search".to_string(),
                message: format!("search failed: {e}"),
                permanent: false,
            }),
        }
    }
}
