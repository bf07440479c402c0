//! Ready-made instance providers.

pub mod pagination;

pub use pagination::{Pagination, PaginationFilter};
