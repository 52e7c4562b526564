pub mod code_writer;
pub mod generator;
pub mod grpcx;
pub mod names;

pub use crate::domain::model::{FileDescriptor, GeneratedFile, PathsMode, ServiceDescriptor};
pub use crate::domain::ports::{ConfigProvider, FileContext, InitContext, Plugin, Storage};
pub use crate::utils::error::Result;
