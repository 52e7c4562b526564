use prost_types::{FileDescriptorProto, MethodDescriptorProto, ServiceDescriptorProto};
use serde::Serialize;

/// Read-only view of one `.proto` file as supplied by protoc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub package: String,
    pub go_package: Option<String>,
    pub services: Vec<ServiceDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub methods: Vec<MethodDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

/// Where output files are placed relative to the output root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PathsMode {
    /// Under the directory named by the Go import path.
    #[default]
    Import,
    /// Next to the `.proto` file.
    SourceRelative,
}

impl PathsMode {
    pub const VALUES: [&'static str; 2] = ["import", "source_relative"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "import" => Some(PathsMode::Import),
            "source_relative" => Some(PathsMode::SourceRelative),
            _ => None,
        }
    }
}

/// One output file, path relative to the protoc output root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
}

impl FileDescriptor {
    /// File name without directories or the `.proto` extension.
    pub fn stem(&self) -> &str {
        let base = self.name.rsplit('/').next().unwrap_or(&self.name);
        base.strip_suffix(".proto").unwrap_or(base)
    }

    /// Directory part of the proto file name, empty for top-level files.
    pub fn dir(&self) -> &str {
        match self.name.rfind('/') {
            Some(idx) => &self.name[..idx],
            None => "",
        }
    }
}

impl From<&FileDescriptorProto> for FileDescriptor {
    fn from(proto: &FileDescriptorProto) -> Self {
        Self {
            name: proto.name().to_string(),
            package: proto.package().to_string(),
            go_package: proto
                .options
                .as_ref()
                .and_then(|o| o.go_package.clone())
                .filter(|p| !p.is_empty()),
            services: proto.service.iter().map(ServiceDescriptor::from).collect(),
        }
    }
}

impl From<&ServiceDescriptorProto> for ServiceDescriptor {
    fn from(proto: &ServiceDescriptorProto) -> Self {
        Self {
            name: proto.name().to_string(),
            methods: proto.method.iter().map(MethodDescriptor::from).collect(),
        }
    }
}

impl From<&MethodDescriptorProto> for MethodDescriptor {
    fn from(proto: &MethodDescriptorProto) -> Self {
        Self {
            name: proto.name().to_string(),
            input_type: proto.input_type().to_string(),
            output_type: proto.output_type().to_string(),
            client_streaming: proto.client_streaming(),
            server_streaming: proto.server_streaming(),
        }
    }
}
