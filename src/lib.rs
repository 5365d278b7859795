//! # Equipment Tracker
//!
//! A small inventory store for physical equipment. Records carry an id, a
//! name, and an operational status, and live in a single JSON file that is
//! read in full and rewritten in full on every change.
//!
//! ## Core Concepts
//!
//! - **Store**: the whole record collection for one load/operate/save cycle
//! - **Records**: stateless create, update, lookup and search operations
//! - **Tracker**: the facade that runs one locked cycle per call
//! - **Status selectors**: single characters (`O I N U M D`) naming a status
//!
//! ## Example
//!
//! ```no_run
//! use equipment_tracker::{EquipmentId, Status, StoreConfig, Tracker};
//!
//! # fn main() -> equipment_tracker::Result<()> {
//! let tracker = Tracker::new(StoreConfig::for_project("."));
//! tracker.initialize()?;
//!
//! let drill = tracker.create_record("Drill", 'O')?;
//! let change = tracker.update_status(drill.id, "N")?;
//! assert_eq!(change.new, Status::NeedsMaintenance);
//!
//! let hits: Vec<EquipmentId> = tracker.search("dril")?;
//! assert_eq!(hits, vec![drill.id]);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod records;
pub mod store;
pub mod tracker;
pub mod types;

// Re-exports
pub use error::{Result, TrackerError};
pub use records::MATCH_WINDOW;
pub use store::{Store, StoreConfig};
pub use tracker::Tracker;
pub use types::*;
