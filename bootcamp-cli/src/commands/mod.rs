pub mod destroy;
pub mod export;
pub mod import;
pub mod list;
pub mod radius;
