pub mod allocator;
pub mod gaps;
pub mod validator;

pub use allocator::find_best_group;
pub use gaps::would_create_single_gap;
pub use validator::{reason_code, validate, SelectionError};
