mod categories;
mod questions;

pub use categories::category_router;
pub use questions::questions_router;
