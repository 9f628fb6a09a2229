pub mod extract;
pub mod fetcher;
pub mod manager;
pub mod search;

pub use fetcher::{fetch_all, HtmlArticleFetcher};
pub use manager::{CorpusManager, CorpusReport, CorpusRequest, CorpusStats};
pub use search::{search_with_pagination, GoogleSearchProvider};

pub mod prelude {
    pub use super::{CorpusManager, CorpusRequest};
    pub use nr_core::{ArticleFetcher, Error, Result, SearchProvider};
}
