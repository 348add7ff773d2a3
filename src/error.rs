use alloy_primitives::{Address, FixedBytes, U256};
use alloy_sol_types::{Revert, SolError};

mod abi {
    use alloy_sol_types::sol;

    sol! {
        // Mutation of an EternalStorage by anyone but its current owner
        error NotOwner();

        // Caller is not in the admin set
        error AdminOnly();

        // Caller is not in the storage owner set
        error StorageOwnerOnly();

        // createStorage() or setStorage() on a consumer that already has storage
        error StorageAlreadySet();

        // Storage accessed before createStorage() or setStorage()
        error StorageNotSet();

        // Ownable guard
        error CallerNotCurrentOwner();

        // Ownable transferOwnership() to the zero address
        error NewOwnerIsZeroAddress();

        // Second initialize() call
        error AlreadyInitialized();

        // Proxy pointed at an address without code
        error NotAContract(address account);

        // Proxy changeAdmin() to the zero address
        error NewAdminIsZeroAddress();

        // The proxy admin called a selector the proxy does not manage
        error AdminCannotFallback();

        // Message call to an address without code
        error NoCode(address account);

        // Selector not exposed by the called contract
        error UnknownSelector(bytes4 selector);

        // Calldata could not be ABI decoded
        error InvalidCalldata();

        // Return data of a sub-call could not be ABI decoded
        error InvalidReturnData();

        // Nested calls went deeper than the ledger allows
        error CallDepthExceeded(uint256 limit);
    }
}

/// Reasons an invocation is reverted. Display strings follow the revert
/// reasons of the deployed contracts so logs stay comparable.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("not current owner")]
    NotOwner,

    #[error("admin only.")]
    AdminOnly,

    #[error("storage owner only.")]
    StorageOwnerOnly,

    #[error("storage is set")]
    StorageAlreadySet,

    #[error("storage is not set")]
    StorageNotSet,

    #[error("Ownable: caller is not the owner")]
    CallerNotCurrentOwner,

    #[error("Ownable: new owner is the zero address")]
    NewOwnerIsZeroAddress,

    #[error("Initializable: contract is already initialized")]
    AlreadyInitialized,

    #[error("ERC1967: new implementation {0} is not a contract")]
    NotAContract(Address),

    #[error("ERC1967: new admin is the zero address")]
    NewAdminIsZeroAddress,

    #[error("TransparentUpgradeableProxy: admin cannot fallback to proxy target")]
    AdminCannotFallback,

    #[error("call to {0}, which has no code")]
    NoCode(Address),

    #[error("unknown selector {0}")]
    UnknownSelector(FixedBytes<4>),

    #[error("invalid calldata")]
    InvalidCalldata,

    #[error("invalid return data")]
    InvalidReturnData,

    #[error("max call depth of {0} exceeded")]
    CallDepthExceeded(usize),

    /// Plain `Error(string)` revert, raised by collaborators such as tokens
    #[error("{0}")]
    Revert(String),
}

pub type LedgerResult<T, E = LedgerError> = core::result::Result<T, E>;

const UNIT_ERRORS: [([u8; 4], LedgerError); 12] = [
    (abi::NotOwner::SELECTOR, LedgerError::NotOwner),
    (abi::AdminOnly::SELECTOR, LedgerError::AdminOnly),
    (abi::StorageOwnerOnly::SELECTOR, LedgerError::StorageOwnerOnly),
    (abi::StorageAlreadySet::SELECTOR, LedgerError::StorageAlreadySet),
    (abi::StorageNotSet::SELECTOR, LedgerError::StorageNotSet),
    (abi::CallerNotCurrentOwner::SELECTOR, LedgerError::CallerNotCurrentOwner),
    (abi::NewOwnerIsZeroAddress::SELECTOR, LedgerError::NewOwnerIsZeroAddress),
    (abi::AlreadyInitialized::SELECTOR, LedgerError::AlreadyInitialized),
    (abi::NewAdminIsZeroAddress::SELECTOR, LedgerError::NewAdminIsZeroAddress),
    (abi::AdminCannotFallback::SELECTOR, LedgerError::AdminCannotFallback),
    (abi::InvalidCalldata::SELECTOR, LedgerError::InvalidCalldata),
    (abi::InvalidReturnData::SELECTOR, LedgerError::InvalidReturnData),
];

impl LedgerError {
    /// Decode ABI revert data back into an error. Returns None for revert data
    /// this crate did not produce.
    pub fn decode(data: &[u8]) -> Option<Self> {
        let selector: [u8; 4] = data.get(0..4)?.try_into().ok()?;

        if let Some((_, error)) = UNIT_ERRORS.iter().find(|(s, _)| *s == selector) {
            return Some(error.clone());
        }

        let error = if selector == abi::NotAContract::SELECTOR {
            LedgerError::NotAContract(abi::NotAContract::abi_decode(data, true).ok()?.account)
        } else if selector == abi::NoCode::SELECTOR {
            LedgerError::NoCode(abi::NoCode::abi_decode(data, true).ok()?.account)
        } else if selector == abi::UnknownSelector::SELECTOR {
            LedgerError::UnknownSelector(
                abi::UnknownSelector::abi_decode(data, true).ok()?.selector,
            )
        } else if selector == abi::CallDepthExceeded::SELECTOR {
            let limit = abi::CallDepthExceeded::abi_decode(data, true).ok()?.limit;
            LedgerError::CallDepthExceeded(limit.try_into().ok()?)
        } else if selector == Revert::SELECTOR {
            LedgerError::Revert(Revert::abi_decode(data, true).ok()?.reason)
        } else {
            return None;
        };

        Some(error)
    }
}

impl From<LedgerError> for Vec<u8> {
    fn from(error: LedgerError) -> Vec<u8> {
        match error {
            LedgerError::NotOwner => abi::NotOwner {}.abi_encode(),
            LedgerError::AdminOnly => abi::AdminOnly {}.abi_encode(),
            LedgerError::StorageOwnerOnly => abi::StorageOwnerOnly {}.abi_encode(),
            LedgerError::StorageAlreadySet => abi::StorageAlreadySet {}.abi_encode(),
            LedgerError::StorageNotSet => abi::StorageNotSet {}.abi_encode(),
            LedgerError::CallerNotCurrentOwner => abi::CallerNotCurrentOwner {}.abi_encode(),
            LedgerError::NewOwnerIsZeroAddress => abi::NewOwnerIsZeroAddress {}.abi_encode(),
            LedgerError::AlreadyInitialized => abi::AlreadyInitialized {}.abi_encode(),
            LedgerError::NotAContract(account) => abi::NotAContract { account }.abi_encode(),
            LedgerError::NewAdminIsZeroAddress => abi::NewAdminIsZeroAddress {}.abi_encode(),
            LedgerError::AdminCannotFallback => abi::AdminCannotFallback {}.abi_encode(),
            LedgerError::NoCode(account) => abi::NoCode { account }.abi_encode(),
            LedgerError::UnknownSelector(selector) => {
                abi::UnknownSelector { selector }.abi_encode()
            }
            LedgerError::InvalidCalldata => abi::InvalidCalldata {}.abi_encode(),
            LedgerError::InvalidReturnData => abi::InvalidReturnData {}.abi_encode(),
            LedgerError::CallDepthExceeded(limit) => abi::CallDepthExceeded {
                limit: U256::from(limit),
            }
            .abi_encode(),
            LedgerError::Revert(reason) => Revert { reason }.abi_encode(),
        }
    }
}

#[macro_export]
macro_rules! require {
    ($invariant:expr, $error:expr) => {
        if !$invariant {
            return Err($error);
        }
    };
}
