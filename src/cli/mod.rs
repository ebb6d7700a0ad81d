pub mod app;
pub mod canon;
pub mod commands;
pub mod compile;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod oracle;
pub mod output;
pub mod runtime;
pub mod templates;

pub use app::run;
