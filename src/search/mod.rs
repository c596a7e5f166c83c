pub mod agent;
pub mod provider;
pub mod router;

pub use agent::{WebSearchAgent, collect_unique_images, search_summary};
pub use provider::{
    ProviderResponse, ProviderResult, SearchError, SearchProvider, SearchRequest, TavilyProvider,
};
pub use router::SearchRouter;
