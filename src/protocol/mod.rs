//! Host status protocol
//!
//! - Status code constants
//! - Code/message decoding into domain signals
//! - User-list payload parsing

pub mod constants;
pub mod decoder;
pub mod payload;

pub use decoder::{decode, Decoded, Signal, UserListOp};
pub use payload::{parse_user_list, PayloadError, UserList, UserListItem};
