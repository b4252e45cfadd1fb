//! Filter system for URL checks.

mod chain;
mod filter_trait;
mod gemini_filter;
mod list_filter;
mod regex_filter;
mod registry;
mod remote;
mod safe_browsing_filter;

pub use chain::FilterChain;
pub use filter_trait::Filter;
pub use registry::FilterRegistry;

// Allow unused for potential library API usage
#[allow(unused_imports)]
pub use gemini_filter::GeminiFilter;
#[allow(unused_imports)]
pub use list_filter::ListFilter;
#[allow(unused_imports)]
pub use regex_filter::RegexFilter;
#[allow(unused_imports)]
pub use safe_browsing_filter::SafeBrowsingFilter;
