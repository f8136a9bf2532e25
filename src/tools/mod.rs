//! Tool System - declarative catalog and validated dispatch

mod catalog;
mod dispatcher;

pub use catalog::{Tool, ToolCatalog};
pub use dispatcher::ToolDispatcher;
