//! The `grpcx` plugin: singleton client accessor and server starter for the
//! one service declared in a proto file, wrapping the shared pool package.

use crate::core::code_writer::CodeWriter;
use crate::core::names::{camel_case, go_quote, join_import_path};
use crate::domain::model::{FileDescriptor, ServiceDescriptor};
use crate::domain::ports::{FileContext, InitContext, Plugin};
use crate::utils::error::{GenError, Result};

pub const PLUGIN_NAME: &str = "grpcx";

/// Import path of the gRPC runtime referenced by the `NewServer` wrapper.
pub const GRPC_PACKAGE_PATH: &str = "google.golang.org/grpc";
const GRPC_PACKAGE_NAME: &str = "grpc";

/// Value of `<Service>ServiceName` unless configured per service.
pub const DEFAULT_SERVICE_REGISTRY_NAME: &str = "TODO: replace this with your service name";

/// Identifiers the wrapper template declares or imports unaliased. A package
/// alias equal to one of these would be shadowed or clash in the output.
const TEMPLATE_IDENTIFIERS: &[&str] = &[
    "sync", "atomic", "unsafe", "srv", "port", "register", "s", "p", "clt", "conn", "err",
    "Server", "Client", "MustClient", "NewServer", "Start", "newClient",
];

const SDK_BEGIN: &str =
    "/****************************************  SDK BEGIN ****************************************/";
const SDK_END: &str =
    "/****************************************  SDK END ****************************************/";

#[derive(Debug, Clone)]
pub struct GrpcxPlugin {
    pool_alias: String,
    grpc_alias: String,
}

impl Default for GrpcxPlugin {
    fn default() -> Self {
        Self {
            pool_alias: crate::config::DEFAULT_POOL_PACKAGE_NAME.to_string(),
            grpc_alias: GRPC_PACKAGE_NAME.to_string(),
        }
    }
}

impl GrpcxPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` for files without services; more than one is an error.
    fn single_service(file: &FileDescriptor) -> Result<Option<&ServiceDescriptor>> {
        match file.services.as_slice() {
            [] => Ok(None),
            [service] => Ok(Some(service)),
            services => Err(GenError::MultipleServices {
                file: file.name.clone(),
                count: services.len(),
            }),
        }
    }

    fn generate_service(
        &self,
        ctx: &FileContext<'_>,
        service: &ServiceDescriptor,
        out: &mut CodeWriter,
    ) {
        let serv_name = camel_case(&service.name);
        let s = serv_name.as_str();
        let pool = self.pool_alias.as_str();
        let grpc = self.grpc_alias.as_str();

        let registry_name = ctx
            .config
            .service_registry_name(&service.name)
            .or_else(|| ctx.config.service_registry_name(s))
            .unwrap_or(DEFAULT_SERVICE_REGISTRY_NAME);
        let quoted_registry_name = go_quote(registry_name);
        let quoted_registry_name = quoted_registry_name.as_str();

        tracing::debug!(
            "Generating grpcx wrapper for service {} ({} methods) in {}",
            s,
            service.methods.len(),
            ctx.file.name
        );

        let ptr_mutex = format!("__{}ClientPtrMutex", s);
        let ptr_mutex = ptr_mutex.as_str();
        let ptr = format!("__{}ClientPtr", s);
        let ptr = ptr.as_str();

        out.p(&[]);
        out.p(&["const ", s, "ServiceName = ", quoted_registry_name]);
        out.p(&[]);
        out.p(&["var ("]);
        out.p_aligned(&[(ptr_mutex, "sync.Mutex"), (ptr, "unsafe.Pointer")]);
        out.p(&[")"]);
        out.p(&[]);
        out.p(&["func MustClient() ", s, "Client {"]);
        out.p(&["clt, err := Client()"]);
        out.p(&["if err != nil {"]);
        out.p(&["panic(err)"]);
        out.p(&["}"]);
        out.p(&["return clt"]);
        out.p(&["}"]);
        out.p(&[]);
        out.p(&["func Client() (", s, "Client, error) {"]);
        out.p(&["p := (*", s, "Client)(atomic.LoadPointer(&", ptr, "))"]);
        out.p(&["if p != nil {"]);
        out.p(&["return *p, nil"]);
        out.p(&["}"]);
        out.p(&[]);
        out.p(&[ptr_mutex, ".Lock()"]);
        out.p(&["defer ", ptr_mutex, ".Unlock()"]);
        out.p(&[]);
        out.p(&["p = (*", s, "Client)(atomic.LoadPointer(&", ptr, "))"]);
        out.p(&["if p != nil {"]);
        out.p(&["return *p, nil"]);
        out.p(&["}"]);
        out.p(&[]);
        out.p(&["clt, err := newClient()"]);
        out.p(&["if err != nil {"]);
        out.p(&["return nil, err"]);
        out.p(&["}"]);
        out.p(&["atomic.StorePointer(&", ptr, ", unsafe.Pointer(&clt))"]);
        out.p(&["return clt, nil"]);
        out.p(&["}"]);
        out.p(&[]);
        out.p(&["func newClient() (", s, "Client, error) {"]);
        out.p(&["conn, err := ", pool, ".ClientConn(", s, "ServiceName)"]);
        out.p(&["if err != nil {"]);
        out.p(&["return nil, err"]);
        out.p(&["}"]);
        out.p(&["return New", s, "Client(conn), nil"]);
        out.p(&["}"]);
        out.p(&[]);
        out.p(&["func Start(port int, srv ", s, "Server) error {"]);
        out.p(&["return NewServer(port, srv).Serve()"]);
        out.p(&["}"]);
        out.p(&[]);
        out.p(&["type Server struct {"]);
        out.p(&["*", pool, ".Server"]);
        out.p(&["}"]);
        out.p(&[]);
        out.p(&["func NewServer(port int, srv ", s, "Server) Server {"]);
        out.p(&["register := func(s *", grpc, ".Server) {"]);
        out.p(&["Register", s, "Server(s, srv)"]);
        out.p(&["}"]);
        out.p(&["return Server{"]);
        out.p(&["Server: ", pool, ".NewServer(", s, "ServiceName, \"\", port, register),"]);
        out.p(&["}"]);
        out.p(&["}"]);
    }
}

impl Plugin for GrpcxPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn init(&mut self, ctx: &mut InitContext<'_>) {
        for ident in TEMPLATE_IDENTIFIERS {
            ctx.names.reserve(ident);
        }
        self.pool_alias = ctx.names.register_unique(ctx.config.pool_package_name());
        self.grpc_alias = ctx.names.register_unique(GRPC_PACKAGE_NAME);
        tracing::debug!(
            "grpcx package aliases: pool={} grpc={}",
            self.pool_alias,
            self.grpc_alias
        );
    }

    fn generate_imports(&self, ctx: &FileContext<'_>, out: &mut CodeWriter) -> Result<()> {
        if Self::single_service(ctx.file)?.is_none() {
            return Ok(());
        }

        let prefix = ctx.config.import_prefix();
        let mut third_party = [
            (
                self.grpc_alias.as_str(),
                join_import_path(prefix, GRPC_PACKAGE_PATH),
            ),
            (
                self.pool_alias.as_str(),
                join_import_path(prefix, ctx.config.pool_package_path()),
            ),
        ];
        // gofmt keeps each import group sorted by path.
        third_party.sort_by(|a, b| a.1.cmp(&b.1));

        out.p(&["import ("]);
        out.p(&["\"sync\""]);
        out.p(&["\"sync/atomic\""]);
        out.p(&["\"unsafe\""]);
        out.p(&[]);
        for (alias, path) in &third_party {
            let quoted = go_quote(path);
            out.p(&[*alias, " ", quoted.as_str()]);
        }
        out.p(&[")"]);
        out.p(&[]);
        Ok(())
    }

    fn generate(&self, ctx: &FileContext<'_>, out: &mut CodeWriter) -> Result<()> {
        let Some(service) = Self::single_service(ctx.file)? else {
            return Ok(());
        };

        out.p(&[SDK_BEGIN]);
        out.p(&[]);
        out.p(&["// Reference imports to suppress errors if they are not otherwise used."]);
        out.p(&["var _ = (*sync.WaitGroup)(nil)"]);
        out.p(&["var _ = atomic.LoadPointer"]);
        out.p(&["var _ = unsafe.Sizeof(0)"]);
        out.p(&[]);

        self.generate_service(ctx, service, out);

        out.p(&[]);
        out.p(&[SDK_END]);
        Ok(())
    }
}
