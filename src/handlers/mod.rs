// handlers/mod.rs - Handlers grouped by access tier
//
// public    → no authentication (/auth/* token acquisition and email flows)
// protected → bearer token verified by the request guard (/auth/*, /user-settings)
// data      → customer and contract records (/customers, /contracts)
// system    → service descriptor, health check and the 404 fallback

pub mod data;
pub mod protected;
pub mod public;
pub mod system;
