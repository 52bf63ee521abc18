//! Hold error types for wire-format conversion.

use skiff_common::{Network, UnsupportedNetwork};

/// Error type for converting backend wire records into canonical values.
///
/// Conversion failures are always fatal for the single record being
/// converted and are never papered over with defaults.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Transaction id or previous-output reference that is not a valid
    /// 32-byte hex hash.
    #[error("invalid transaction id: {0:?}")]
    InvalidTxid(String),

    /// Script bytes that are not valid hex.
    #[error("invalid script hex: {0}")]
    InvalidScript(#[from] hex::FromHexError),

    /// Output value that does not parse as a bitcoin amount.
    #[error("invalid output value: {0}")]
    InvalidValue(#[from] bitcoin::amount::ParseAmountError),

    /// Address hash payload of the wrong length for its type.
    #[error("invalid address hash: {0}")]
    InvalidAddressHash(#[from] bitcoin::hashes::FromSliceError),

    /// Script that has no address form on the configured network.
    #[error("script has no address form: {0}")]
    Address(#[from] bitcoin::address::FromScriptError),

    /// Network tag this build does not recognise.
    #[error(transparent)]
    UnsupportedNetwork(#[from] UnsupportedNetwork),

    /// Recognised network tag that contradicts the configured network.
    #[error("address record is tagged {found:?} but the client is configured for {configured:?}")]
    NetworkMismatch {
        /// Network named by the record's tag.
        found: Network,
        /// Network the client was configured with.
        configured: Network,
    },

    /// Address type tag this build does not recognise.
    #[error("unsupported address type: {0:?}")]
    UnsupportedAddressType(String),
}
