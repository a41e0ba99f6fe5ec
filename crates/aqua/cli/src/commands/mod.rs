pub mod build;
pub mod inspect;
pub mod keys;
pub mod link;
