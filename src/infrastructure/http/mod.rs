mod fetcher;

pub use fetcher::HttpPageFetcher;
