pub mod pagination;
pub mod response;
pub mod string_enum;

pub use pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use response::ApiResponse;
