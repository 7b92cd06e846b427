pub mod access_control;
pub mod member_store;
