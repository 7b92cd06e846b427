pub mod member;
pub mod standing;
