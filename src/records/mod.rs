//! Record operations over a loaded [`Store`](crate::store::Store).
//!
//! These functions are stateless: they take the store for one cycle, mutate
//! or query it, and leave persistence to the caller.

mod operations;
mod search;

pub use operations::{create_record, get_record, get_status, list_records, update_status};
pub use search::{matches_term, search, MATCH_WINDOW};
