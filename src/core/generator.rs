//! Host side of the plugin contract: drives registered [`Plugin`]s over the
//! files of a `CodeGeneratorRequest` and assembles the response.

use crate::config::PluginConfig;
use crate::core::code_writer::CodeWriter;
use crate::core::grpcx::GrpcxPlugin;
use crate::core::names::{output_path, resolve_go_package, GoPackage, PackageNames};
use crate::domain::model::{FileDescriptor, GeneratedFile};
use crate::domain::ports::{ConfigProvider, FileContext, InitContext, Plugin};
use crate::utils::error::{GenError, Result};
use prost::Message;
use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use prost_types::FileDescriptorSet;
use std::collections::HashMap;

pub const GENERATOR_NAME: &str = "protoc-gen-grpcx";

pub struct Generator<C: ConfigProvider> {
    config: C,
    plugins: Vec<Box<dyn Plugin>>,
    names: PackageNames,
}

impl<C: ConfigProvider> Generator<C> {
    /// A generator with no plugins registered.
    pub fn new(config: C) -> Self {
        Self {
            config,
            plugins: Vec::new(),
            names: PackageNames::new(),
        }
    }

    /// A generator with every built-in plugin registered.
    pub fn with_default_plugins(config: C) -> Self {
        let mut generator = Self::new(config);
        generator.register_plugin(Box::new(GrpcxPlugin::new()));
        generator
    }

    pub fn register_plugin(&mut self, plugin: Box<dyn Plugin>) {
        tracing::debug!("Registered plugin '{}'", plugin.name());
        self.plugins.push(plugin);
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Keeps only the plugins named by the configuration.
    fn select_plugins(&mut self) -> Result<()> {
        let Some(selected) = self.config.plugins() else {
            return Ok(());
        };

        if let Some(unknown) = selected
            .iter()
            .find(|name| !self.plugins.iter().any(|p| p.name() == name.as_str()))
        {
            return Err(GenError::UnknownPlugin {
                name: unknown.clone(),
            });
        }

        self.plugins
            .retain(|p| selected.iter().any(|name| name == p.name()));
        Ok(())
    }

    /// Generates every file in `file_to_generate`. Any error aborts the whole
    /// run and nothing is returned.
    pub fn generate(
        &mut self,
        files: &[FileDescriptor],
        file_to_generate: &[String],
    ) -> Result<Vec<GeneratedFile>> {
        self.select_plugins()?;
        tracing::debug!("Active plugins: {:?}", self.plugin_names());

        let by_name: HashMap<&str, &FileDescriptor> =
            files.iter().map(|f| (f.name.as_str(), f)).collect();

        let mut targets = Vec::with_capacity(file_to_generate.len());
        for name in file_to_generate {
            let file = by_name
                .get(name.as_str())
                .copied()
                .ok_or_else(|| GenError::MissingFile { name: name.clone() })?;
            let go_package = resolve_go_package(file, &self.config);
            self.names.reserve(&go_package.name);
            targets.push((file, go_package));
        }

        let mut ctx = InitContext {
            config: &self.config,
            names: &mut self.names,
        };
        for plugin in self.plugins.iter_mut() {
            plugin.init(&mut ctx);
        }

        let mut generated = Vec::new();
        for (file, go_package) in &targets {
            if let Some(output) = self.generate_file(file, go_package)? {
                tracing::debug!("{} -> {}", file.name, output.name);
                generated.push(output);
            } else {
                tracing::debug!("{}: nothing to generate", file.name);
            }
        }

        Ok(generated)
    }

    fn generate_file(
        &self,
        file: &FileDescriptor,
        go_package: &GoPackage,
    ) -> Result<Option<GeneratedFile>> {
        let ctx = FileContext {
            file,
            go_package,
            config: &self.config,
        };

        let mut imports = CodeWriter::new();
        for plugin in &self.plugins {
            plugin.generate_imports(&ctx, &mut imports)?;
        }

        let mut body = CodeWriter::new();
        for plugin in &self.plugins {
            plugin.generate(&ctx, &mut body)?;
        }

        if imports.is_empty() && body.is_empty() {
            return Ok(None);
        }

        let mut out = CodeWriter::new();
        out.p(&["// Code generated by ", GENERATOR_NAME, ". DO NOT EDIT."]);
        out.p(&["// source: ", &file.name]);
        out.p(&[]);
        out.p(&["package ", &go_package.name]);
        out.p(&[]);
        out.append(&imports);
        out.blank_line();
        out.append(&body);

        Ok(Some(GeneratedFile {
            name: output_path(file, go_package, self.config.paths_mode()),
            content: out.finish(),
        }))
    }
}

/// Resolves the configuration from the request parameter and generates all files.
pub fn generate_request(request: &CodeGeneratorRequest) -> Result<Vec<GeneratedFile>> {
    let config = PluginConfig::from_parameter(request.parameter())?;
    let files: Vec<FileDescriptor> = request.proto_file.iter().map(FileDescriptor::from).collect();

    tracing::debug!(
        "Request: {} file(s) to generate, {} descriptor(s), parameter '{}'",
        request.file_to_generate.len(),
        files.len(),
        request.parameter()
    );

    let mut generator = Generator::with_default_plugins(config);
    generator.generate(&files, &request.file_to_generate)
}

/// Builds the request protoc would send for `set`. With no `files` given,
/// every file in the set is generated.
pub fn request_from_descriptor_set(
    set: FileDescriptorSet,
    files: &[String],
    parameter: &str,
) -> CodeGeneratorRequest {
    let file_to_generate = if files.is_empty() {
        set.file.iter().map(|f| f.name().to_string()).collect()
    } else {
        files.to_vec()
    };

    CodeGeneratorRequest {
        file_to_generate,
        parameter: Some(parameter.to_string()).filter(|p| !p.is_empty()),
        proto_file: set.file,
        ..Default::default()
    }
}

/// Builds the response protoc expects. Failures become the response's
/// `error` field with no files attached.
pub fn generate_response(request: &CodeGeneratorRequest) -> CodeGeneratorResponse {
    let supported_features = Some(Feature::Proto3Optional as u64);

    match generate_request(request) {
        Ok(files) => {
            tracing::info!("Generated {} file(s)", files.len());
            CodeGeneratorResponse {
                supported_features,
                file: files
                    .into_iter()
                    .map(|f| File {
                        name: Some(f.name),
                        content: Some(f.content),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }
        }
        Err(e) => error_response(&e),
    }
}

fn error_response(error: &GenError) -> CodeGeneratorResponse {
    tracing::error!(
        "Generation failed: {} (Category: {:?}, Severity: {:?})",
        error,
        error.category(),
        error.severity()
    );
    tracing::error!("Recovery suggestion: {}", error.recovery_suggestion());

    CodeGeneratorResponse {
        error: Some(format!("{}: {}", GENERATOR_NAME, error.user_friendly_message())),
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    }
}

/// Runs one plugin invocation over raw bytes: decode, generate, encode.
///
/// Only encoding can fail here; a request that does not decode is answered
/// with an error response like any other generation failure.
pub fn run(input: &[u8]) -> Result<Vec<u8>> {
    let response = match CodeGeneratorRequest::decode(input) {
        Ok(request) => generate_response(&request),
        Err(e) => error_response(&GenError::DecodeError(e)),
    };

    let mut output = Vec::with_capacity(response.encoded_len());
    response.encode(&mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ServiceDescriptor;

    struct RecordingPlugin {
        name: &'static str,
        alias: String,
    }

    impl Plugin for RecordingPlugin {
        fn name(&self) -> &str {
            self.name
        }

        fn init(&mut self, ctx: &mut InitContext<'_>) {
            self.alias = ctx.names.register_unique("greeter");
        }

        fn generate_imports(&self, _ctx: &FileContext<'_>, out: &mut CodeWriter) -> Result<()> {
            out.p(&["import ", &self.alias, " \"example.com/greeter\""]);
            Ok(())
        }

        fn generate(&self, ctx: &FileContext<'_>, out: &mut CodeWriter) -> Result<()> {
            out.p(&["// ", self.name, " saw ", &ctx.file.name]);
            Ok(())
        }
    }

    fn file(name: &str, services: &[&str]) -> FileDescriptor {
        FileDescriptor {
            name: name.to_string(),
            package: "greeter".to_string(),
            go_package: None,
            services: services
                .iter()
                .map(|s| ServiceDescriptor {
                    name: s.to_string(),
                    methods: vec![],
                })
                .collect(),
        }
    }

    #[test]
    fn test_imports_precede_code_and_aliases_avoid_file_package() {
        let mut generator = Generator::new(PluginConfig::default());
        generator.register_plugin(Box::new(RecordingPlugin {
            name: "recorder",
            alias: String::new(),
        }));

        let files = vec![file("greeter.proto", &[])];
        let out = generator
            .generate(&files, &["greeter.proto".to_string()])
            .unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "greeter_grpcx.pb.go");
        assert_eq!(
            out[0].content,
            "// Code generated by protoc-gen-grpcx. DO NOT EDIT.\n\
// source: greeter.proto\n\
\n\
package greeter\n\
\n\
import greeter1 \"example.com/greeter\"\n\
\n\
// recorder saw greeter.proto\n"
        );
    }

    #[test]
    fn test_unknown_plugin_is_rejected() {
        let config = PluginConfig::from_parameter("plugins=grpc").unwrap();
        let mut generator = Generator::with_default_plugins(config);
        let result = generator.generate(&[], &[]);
        assert!(matches!(result, Err(GenError::UnknownPlugin { name }) if name == "grpc"));
    }

    #[test]
    fn test_plugin_selection_filters() {
        let config = PluginConfig::from_parameter("plugins=recorder").unwrap();
        let mut generator = Generator::with_default_plugins(config);
        generator.register_plugin(Box::new(RecordingPlugin {
            name: "recorder",
            alias: String::new(),
        }));
        assert_eq!(generator.plugin_names(), vec!["grpcx", "recorder"]);

        let files = vec![file("a.proto", &["One", "Two"])];
        let out = generator.generate(&files, &["a.proto".to_string()]).unwrap();

        // grpcx would have rejected two services; only the recorder ran.
        assert_eq!(generator.plugin_names(), vec!["recorder"]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut generator = Generator::with_default_plugins(PluginConfig::default());
        let result = generator.generate(&[], &["nope.proto".to_string()]);
        assert!(matches!(result, Err(GenError::MissingFile { name }) if name == "nope.proto"));
    }

    #[test]
    fn test_files_without_output_are_skipped() {
        let mut generator = Generator::with_default_plugins(PluginConfig::default());
        let files = vec![file("empty.proto", &[])];
        let out = generator.generate(&files, &["empty.proto".to_string()]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_request_from_descriptor_set_defaults_to_all_files() {
        let set = FileDescriptorSet {
            file: vec![
                prost_types::FileDescriptorProto {
                    name: Some("a.proto".to_string()),
                    ..Default::default()
                },
                prost_types::FileDescriptorProto {
                    name: Some("b.proto".to_string()),
                    ..Default::default()
                },
            ],
        };

        let request = request_from_descriptor_set(set.clone(), &[], "");
        assert_eq!(request.file_to_generate, vec!["a.proto", "b.proto"]);
        assert_eq!(request.parameter, None);

        let request = request_from_descriptor_set(set, &["b.proto".to_string()], "paths=import");
        assert_eq!(request.file_to_generate, vec!["b.proto"]);
        assert_eq!(request.parameter(), "paths=import");
        assert_eq!(request.proto_file.len(), 2);
    }

    #[test]
    fn test_run_answers_garbage_with_error_response() {
        let output = run(&[0xff, 0xff, 0xff]).unwrap();
        let response = CodeGeneratorResponse::decode(output.as_slice()).unwrap();
        assert!(response.error.is_some());
        assert!(response.file.is_empty());
    }
}
