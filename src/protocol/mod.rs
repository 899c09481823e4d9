pub mod request;
pub mod response;

pub use request::{CheckRequest, RequestId};
pub use response::{CheckError, CheckResponse, ErrorCode, ProtocolErrorCode};
