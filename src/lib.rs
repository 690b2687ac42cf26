//! # propdesk
//!
//! Client-side state layer for a real-estate site with an authenticated
//! back office. Screens and routing live elsewhere; this crate owns the
//! session store, the property cache, the route guard, and the seams to
//! the hosted auth/persistence service.
//!
//! Data flow: screen mounts → store operation → remote call → store
//! updates in-memory state → screen re-renders from the settled snapshot.

pub mod backend;
pub mod config;
pub mod guard;
pub mod model;
pub mod persist;
pub mod store;
