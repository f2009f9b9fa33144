use std::path::PathBuf;

use server_api::ApiContext;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) api: ApiContext,
    /// Directory served for every path outside `/api` and `/healthz`.
    pub(crate) static_dir: PathBuf,
}
