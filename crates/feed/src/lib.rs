mod domains;
mod error;
mod notify;
mod pipeline;
mod publish;
#[cfg(feature = "s3")]
mod s3_storage;
mod stations;
mod utils;
mod wims_client;

pub use domains::*;
pub use error::*;
pub use notify::*;
pub use pipeline::*;
pub use publish::*;
#[cfg(feature = "s3")]
pub use s3_storage::*;
pub use stations::*;
pub use utils::*;
pub use wims_client::*;
