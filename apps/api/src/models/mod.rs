pub mod member;
pub mod year;
