pub mod app;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod info;
pub mod output;
pub mod policy;
pub mod run;
pub mod runtime;
pub mod window;
