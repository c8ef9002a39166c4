//! Network access and caching.

pub mod cache;
pub mod census;
pub mod table;

#[allow(unused_imports)]
pub use cache::{CacheStatus, CachedPayload, Clock, SystemClock, TtlCache};
#[cfg(test)]
pub use cache::ManualClock;
#[allow(unused_imports)]
pub use census::{CensusClient, CensusClientBuilder, FetchError};
