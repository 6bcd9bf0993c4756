//! Data Transfer Objects for REST request/response serialization.

pub mod announcement_dto;
pub mod common_dto;
pub mod student_dto;
pub mod view_dto;

pub use announcement_dto::*;
pub use common_dto::*;
pub use student_dto::*;
pub use view_dto::*;
