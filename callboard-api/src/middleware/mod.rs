/// Middleware modules for the API server
///
/// Session authentication lives in `callboard_shared::auth::middleware`;
/// this module holds middleware that only concerns the HTTP edge.

pub mod security;
