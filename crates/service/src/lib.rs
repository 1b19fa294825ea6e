//! Service layer of the frontend: readiness aggregation, runtime config,
//! the typed backend client and session persistence.
//! - Readiness never fails; probe problems are reported as data.
//! - Backend calls are thin and carry no retry logic.

pub mod errors;
pub mod readiness;
pub mod runtime_config;
pub mod api_client;
pub mod storage;
pub mod session;
pub mod runtime;
