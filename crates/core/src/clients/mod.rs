pub mod http;
pub mod lookup;

pub use http::HttpSearchClient;
pub use lookup::AvailabilityProductLookup;
