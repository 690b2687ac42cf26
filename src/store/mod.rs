//! Client-side stores.
//!
//! DESIGN
//! ======
//! One store per domain: `session` owns the admin identity, `property`
//! owns the listing cache. Both are constructed once at process start and
//! passed into the UI layer; screens read snapshots and call operations,
//! never mutating state directly.

pub mod property;
pub mod session;
