pub mod pattern_crud;
pub mod pattern_query;
