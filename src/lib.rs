//! Decision-support client for race pit-stop strategy.
//!
//! Talks to a remote planning service that simulates candidate strategies,
//! then derives everything the pit wall sees locally: ranking, confidence,
//! the pit-event timeline and burst-upgraded uncertainty bands.

pub mod burst;
pub mod client;
pub mod confidence;
pub mod logging;
pub mod model;
pub mod progress;
pub mod ranking;
pub mod report;
pub mod session;
pub mod timeline;
