#[macro_use]
extern crate serde_derive;

#[macro_use]
extern crate hiro_system_kit;

pub mod codec;
pub mod config;
pub mod constants;
pub mod context;
pub mod contracts;
pub mod dispatch;
pub mod errors;
pub mod query;
pub mod rpc;
pub mod session;
pub mod stats;
pub mod validation;

pub use hiro_system_kit::Logger;

pub use context::Context;
pub use errors::InteractsError;
