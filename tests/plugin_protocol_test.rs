use prost::Message;
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use prost_types::{FileDescriptorProto, FileOptions, MethodDescriptorProto, ServiceDescriptorProto};

const GREETER_GOLDEN: &str = include_str!("golden/greeter_grpcx.pb.go.golden");

fn service(name: &str) -> ServiceDescriptorProto {
    ServiceDescriptorProto {
        name: Some(name.to_string()),
        method: vec![MethodDescriptorProto {
            name: Some("SayHello".to_string()),
            input_type: Some(".greeter.HelloRequest".to_string()),
            output_type: Some(".greeter.HelloReply".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn proto_file(name: &str, go_package: Option<&str>, services: &[&str]) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(name.to_string()),
        package: Some("greeter".to_string()),
        syntax: Some("proto3".to_string()),
        options: go_package.map(|p| FileOptions {
            go_package: Some(p.to_string()),
            ..Default::default()
        }),
        service: services.iter().map(|s| service(s)).collect(),
        ..Default::default()
    }
}

fn request(files: Vec<FileDescriptorProto>, parameter: Option<&str>) -> CodeGeneratorRequest {
    CodeGeneratorRequest {
        file_to_generate: files.iter().map(|f| f.name().to_string()).collect(),
        parameter: parameter.map(str::to_string),
        proto_file: files,
        ..Default::default()
    }
}

/// Sends the request through the byte-level entry point, like protoc would.
fn invoke(request: &CodeGeneratorRequest) -> CodeGeneratorResponse {
    let input = request.encode_to_vec();
    let output = protoc_gen_grpcx::run(&input).unwrap();
    CodeGeneratorResponse::decode(output.as_slice()).unwrap()
}

#[test]
fn test_single_service_matches_golden_output() {
    let response = invoke(&request(
        vec![proto_file(
            "greeter/greeter.proto",
            Some("github.com/acme/greeter;greeter"),
            &["Greeter"],
        )],
        None,
    ));

    assert_eq!(response.error, None);
    assert_eq!(response.file.len(), 1);
    assert_eq!(
        response.file[0].name(),
        "github.com/acme/greeter/greeter_grpcx.pb.go"
    );
    assert_eq!(response.file[0].content(), GREETER_GOLDEN);
}

#[test]
fn test_zero_services_emit_nothing() {
    let response = invoke(&request(
        vec![proto_file("greeter/messages.proto", None, &[])],
        None,
    ));

    assert_eq!(response.error, None);
    assert!(response.file.is_empty());
}

#[test]
fn test_service_name_is_camel_cased_everywhere() {
    let response = invoke(&request(
        vec![proto_file("user.proto", None, &["user_profile_service"])],
        None,
    ));

    assert_eq!(response.error, None);
    let content = response.file[0].content();

    assert_eq!(content.matches("func Client() (UserProfileServiceClient, error) {").count(), 1);
    assert_eq!(content.matches("func MustClient() UserProfileServiceClient {").count(), 1);
    assert_eq!(content.matches("func Start(port int, srv UserProfileServiceServer) error {").count(), 1);
    assert_eq!(content.matches("import (").count(), 1);
    assert_eq!(content.matches("__UserProfileServiceClientPtr,").count(), 1);
    assert_eq!(content.matches("UserProfileServiceServiceName").count(), 3);
    assert!(!content.contains("user_profile_service"));
}

#[test]
fn test_multiple_services_abort_the_whole_run() {
    let response = invoke(&request(
        vec![
            proto_file("ok.proto", None, &["Fine"]),
            proto_file("bad.proto", None, &["One", "Two"]),
        ],
        None,
    ));

    let error = response.error.expect("run should fail");
    assert!(error.contains("bad.proto"));
    assert!(error.contains("2 services"));
    assert!(response.file.is_empty());
}

#[test]
fn test_source_relative_paths_and_pool_override() {
    let response = invoke(&request(
        vec![proto_file(
            "api/v1/greeter.proto",
            Some("github.com/acme/api/v1;apiv1"),
            &["Greeter"],
        )],
        Some("paths=source_relative,pool_pkg=github.com/acme/pool,pool_name=pool"),
    ));

    assert_eq!(response.error, None);
    let file = &response.file[0];
    assert_eq!(file.name(), "api/v1/greeter_grpcx.pb.go");
    assert!(file.content().contains("\npackage apiv1\n"));
    assert!(file.content().contains("\tpool \"github.com/acme/pool\"\n\tgrpc \"google.golang.org/grpc\"\n"));
    assert!(file.content().contains("conn, err := pool.ClientConn(GreeterServiceName)"));
}

#[test]
fn test_alias_never_collides_with_file_package() {
    let response = invoke(&request(
        vec![proto_file(
            "pool/greeter.proto",
            Some("github.com/acme/qscgrpc"),
            &["Greeter"],
        )],
        None,
    ));

    assert_eq!(response.error, None);
    let content = response.file[0].content();
    assert!(content.contains("\npackage qscgrpc\n"));
    assert!(content.contains("\tqscgrpc1 \"code.aliyun.com/qschou/go_common/grpc/internal/grpc\"\n"));
    assert!(content.contains("\t*qscgrpc1.Server\n"));
}

#[test]
fn test_pool_name_matching_a_template_local_is_renamed() {
    let response = invoke(&request(
        vec![proto_file("greeter.proto", None, &["Greeter"])],
        Some("pool_name=srv"),
    ));

    assert_eq!(response.error, None);
    let content = response.file[0].content();
    assert!(content.contains("func NewServer(port int, srv GreeterServer) Server {"));
    assert!(content.contains("\tsrv1 \"code.aliyun.com/qschou/go_common/grpc/internal/grpc\"\n"));
    assert!(content.contains("Server: srv1.NewServer(GreeterServiceName, \"\", port, register),"));
    assert!(!content.contains("srv.NewServer"));
}

#[test]
fn test_go_package_with_empty_name_uses_last_path_element() {
    let response = invoke(&request(
        vec![proto_file(
            "greeter.proto",
            Some("github.com/acme/hello-world;"),
            &["Greeter"],
        )],
        None,
    ));

    assert_eq!(response.error, None);
    let file = &response.file[0];
    assert_eq!(file.name(), "github.com/acme/hello-world/greeter_grpcx.pb.go");
    assert!(file.content().contains("\npackage hello_world\n"));
    assert!(!file.content().contains("package _"));
}

#[test]
fn test_bad_parameter_is_reported_in_response() {
    let response = invoke(&request(
        vec![proto_file("greeter.proto", None, &["Greeter"])],
        Some("paths=nowhere"),
    ));

    assert!(response.error.unwrap().contains("paths"));
    assert!(response.file.is_empty());
}

#[test]
fn test_unknown_plugin_is_reported_in_response() {
    let response = invoke(&request(
        vec![proto_file("greeter.proto", None, &["Greeter"])],
        Some("plugins=grpc"),
    ));

    assert!(response.error.unwrap().contains("grpc"));
    assert!(response.file.is_empty());
}

#[test]
fn test_response_advertises_proto3_optional() {
    let response = invoke(&request(vec![], None));
    assert_eq!(response.error, None);
    assert_eq!(response.supported_features, Some(1));
}
