pub mod http;
pub mod interval;
pub mod normalize;
pub mod providers;
pub mod resolver;
pub mod symbols;

pub use http::build_http_client;
pub use interval::{translate, Translation};
pub use providers::build_provider;
pub use resolver::SourceResolver;
pub use symbols::{normalize_symbol, provider_symbol};
