// Report store: list, save, delete-one and delete-all over a single JSON file.

pub mod handlers;
pub mod store;
