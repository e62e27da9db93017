pub mod link;
pub mod sync;
