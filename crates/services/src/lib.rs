//! Tapis service façades.
//!
//! One client per backend service. Each operation chooses a path, a request
//! body and a result policy, then hands the call to the shared
//! [`protocol::CallInvoker`]. Identity is an argument of every operation, so
//! one client value serves any number of callers concurrently.
//!
//! ## Architectural Layer
//!
//! **Façade layer.** No transport code and no error handling of its own:
//! every failure reaching a caller is a [`protocol::ClientError`] built by the
//! protocol crate. Business rules stay on the server.
//!
//! ## Clients
//!
//! | Module | Client | Base path |
//! |--------|--------|-----------|
//! | [`apps`] | [`AppsClient`] | `/v3/apps` |
//! | [`files`] | [`FilesClient`] | `/v3/files` |
//! | [`globus_proxy`] | [`GlobusProxyClient`] | `/v3/globus-proxy` |
//! | [`jobs`] | [`JobsClient`] | `/v3/jobs` |
//! | [`meta`] | [`MetaClient`] | `/v3/meta` |
//! | [`sk`] | [`SkClient`] | `/v3/security` |
//! | [`systems`] | [`SystemsClient`] | `/v3/systems` |
//! | [`tenants`] | [`TenantsClient`] | `/v3/tenants`, `/v3/sites` |
//! | [`tokens`] | [`TokensClient`] | `/v3/tokens` |

pub mod apps;
pub mod common;
pub mod files;
pub mod globus_proxy;
pub mod jobs;
pub mod meta;
pub mod sk;
pub mod systems;
pub mod tenants;
pub mod tokens;

pub use apps::AppsClient;
pub use common::{ListOptions, ReqPerms};
pub use files::FilesClient;
pub use globus_proxy::GlobusProxyClient;
pub use jobs::JobsClient;
pub use meta::MetaClient;
pub use sk::SkClient;
pub use systems::SystemsClient;
pub use tenants::TenantsClient;
pub use tokens::TokensClient;

use protocol::CallInvoker;

/// Every service client over one shared invoker.
#[derive(Debug, Clone)]
pub struct TapisClients {
    pub apps: AppsClient,
    pub files: FilesClient,
    pub globus_proxy: GlobusProxyClient,
    pub jobs: JobsClient,
    pub meta: MetaClient,
    pub sk: SkClient,
    pub systems: SystemsClient,
    pub tenants: TenantsClient,
    pub tokens: TokensClient,
}

impl TapisClients {
    pub fn new(invoker: CallInvoker) -> Self {
        Self {
            apps: AppsClient::new(invoker.clone()),
            files: FilesClient::new(invoker.clone()),
            globus_proxy: GlobusProxyClient::new(invoker.clone()),
            jobs: JobsClient::new(invoker.clone()),
            meta: MetaClient::new(invoker.clone()),
            sk: SkClient::new(invoker.clone()),
            systems: SystemsClient::new(invoker.clone()),
            tenants: TenantsClient::new(invoker.clone()),
            tokens: TokensClient::new(invoker),
        }
    }
}
