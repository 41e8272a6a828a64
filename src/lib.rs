//! pictura - data and state layer for a desktop photo-management application.
//!
//! Photo library browsing (sections by day), filtering, tagging, trash/flag
//! workflows and per-photo edit metadata ("photo work") persistence with
//! thumbnail invalidation. The centerpiece is [`work::WorkQueue`], which
//! coalesces concurrent work mutations for one photo into a single
//! fetch-modify-store cycle so overlapping read-modify-write sequences cannot
//! lose updates.

pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod store;
pub mod thumbnails;
pub mod walker;
pub mod work;

pub use config::Config;
pub use controller::LibraryController;
pub use db::Database;
pub use store::{Action, AppStore};
pub use work::{PhotoWork, WorkQueue};
