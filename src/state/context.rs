//! Context of one call frame: the executing account's storage (SSTORE and
//! SLOAD), the caller, and the host operations a contract may perform
//! (message calls, delegate calls, contract creation, events).

use std::sync::Arc;

use alloy_primitives::{Address, FixedBytes, Log};
use alloy_sol_types::{SolCall, SolEvent, SolInterface};

use crate::{
    error::{LedgerError, LedgerResult},
    ledger::{Contract, Ledger},
};

use super::SlotActions;

pub struct CallContext<'a> {
    ledger: &'a mut Ledger,

    /// Account whose storage and address this frame uses
    address: Address,

    msg_sender: Address,

    depth: usize,
}

pub trait ContextActions: SlotActions {
    /// Caller of the current frame. Preserved across delegate calls.
    fn msg_sender(&self) -> Address;

    /// Address of the executing account. For a delegate call this is the
    /// caller's address, not the address of the code.
    fn address(&self) -> Address;
}

/// First four bytes of the calldata
pub fn selector_of(input: &[u8]) -> LedgerResult<[u8; 4]> {
    input
        .get(0..4)
        .and_then(|selector| selector.try_into().ok())
        .ok_or(LedgerError::InvalidCalldata)
}

/// Decode calldata into a `sol!` interface. Returns None if the selector does
/// not belong to the interface so the caller can try the next one.
pub fn decode_calls<I: SolInterface>(input: &[u8]) -> LedgerResult<Option<I>> {
    let selector = selector_of(input)?;
    if !I::valid_selector(selector) {
        return Ok(None);
    }

    I::abi_decode(input, true)
        .map(Some)
        .map_err(|_| LedgerError::InvalidCalldata)
}

pub fn unknown_selector(input: &[u8]) -> LedgerError {
    match selector_of(input) {
        Ok(selector) => LedgerError::UnknownSelector(FixedBytes(selector)),
        Err(error) => error,
    }
}

impl<'a> CallContext<'a> {
    pub(crate) fn new(
        ledger: &'a mut Ledger,
        address: Address,
        msg_sender: Address,
        depth: usize,
    ) -> Self {
        CallContext {
            ledger,
            address,
            msg_sender,
            depth,
        }
    }

    pub fn has_code(&self, account: Address) -> bool {
        self.ledger.has_code(account)
    }

    /// Message call. The callee sees this account as `msg_sender`.
    pub fn call(&mut self, to: Address, calldata: &[u8]) -> LedgerResult<Vec<u8>> {
        self.ledger
            .execute_frame(self.address, to, to, calldata, self.depth + 1)
    }

    /// Message call with ABI encoded arguments and decoded return values
    pub fn call_sol<C: SolCall>(&mut self, to: Address, call: &C) -> LedgerResult<C::Return> {
        let output = self.call(to, &call.abi_encode())?;

        C::abi_decode_returns(&output, true).map_err(|_| LedgerError::InvalidReturnData)
    }

    /// Run the code of `code_address` against this account's storage,
    /// keeping the current `msg_sender`
    pub fn delegate_call(
        &mut self,
        code_address: Address,
        calldata: &[u8],
    ) -> LedgerResult<Vec<u8>> {
        self.ledger.execute_frame(
            self.msg_sender,
            self.address,
            code_address,
            calldata,
            self.depth + 1,
        )
    }

    /// Create a contract. Its constructor sees this account as `msg_sender`.
    pub fn deploy(&mut self, code: Arc<dyn Contract>, args: &[u8]) -> LedgerResult<Address> {
        self.ledger.create(self.address, code, args, self.depth + 1)
    }

    /// Append an event to the ledger log, attributed to this account
    pub fn emit<E: SolEvent>(&mut self, event: E) {
        self.ledger.push_log(Log {
            address: self.address,
            data: event.encode_log_data(),
        });
    }
}

impl SlotActions for CallContext<'_> {
    fn sstore(&mut self, key: &[u8; 32], value: &[u8; 32]) {
        #[cfg(feature = "debug")]
        tracing::trace!(
            account = %self.address,
            key = %alloy_primitives::B256::from(*key),
            value = %alloy_primitives::B256::from(*value),
            "sstore"
        );

        self.ledger.sstore(self.address, key, value);
    }

    fn sload(&self, key: &[u8; 32]) -> [u8; 32] {
        self.ledger.storage_at(self.address, key)
    }
}

impl ContextActions for CallContext<'_> {
    fn msg_sender(&self) -> Address {
        self.msg_sender
    }

    fn address(&self) -> Address {
        self.address
    }
}
