//! Definitions of constants.

use super::MsgVersion;

/// The only serialization version currently defined.
pub const BASIC_FROST_SERIALIZATION: MsgVersion = MsgVersion(0);

/// The maximum length in bytes of a message to be signed.
///
/// This value is used to calculate safe preallocation limits for some types.
pub const MAX_PROTOCOL_MESSAGE_LEN: usize = 2 * 1024 * 1024;
