//! In-process ledger hosting contract accounts.
//!
//! Every account has 32-byte slot storage and optionally a piece of code.
//! Invocations run in frames; a frame that returns an error is rolled back
//! entirely (storage, created accounts, logs and the deployment nonce) before
//! the error reaches its caller. Rollback replays a journal of the slot writes
//! and account creations made since the frame began.

use std::{collections::HashMap, sync::Arc};

use alloy_primitives::{keccak256, Address, Log, B256, U256};
use alloy_sol_types::SolCall;

use crate::{
    error::{LedgerError, LedgerResult},
    parameters::MAX_CALL_DEPTH,
    require,
    state::{CallContext, SlotActions, SlotStorage},
};

/// Logic bound to an account. Implementations are stateless, all state lives
/// in the storage exposed by the `CallContext`.
pub trait Contract {
    /// Name of the code, hashed into the address of every deployment
    fn name(&self) -> &'static str;

    /// Runs once when the account is created
    fn construct(&self, _ctx: &mut CallContext<'_>, _args: &[u8]) -> LedgerResult<()> {
        Ok(())
    }

    /// Handle ABI encoded calldata and return ABI encoded output
    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> LedgerResult<Vec<u8>>;
}

#[derive(Clone, Default)]
pub struct Account {
    pub code: Option<Arc<dyn Contract>>,
    pub storage: SlotStorage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Frames nested deeper than this fail with `CallDepthExceeded`
    pub max_call_depth: usize,

    /// Salt used for the first deployment
    pub initial_nonce: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            max_call_depth: MAX_CALL_DEPTH,
            initial_nonce: 0,
        }
    }
}

/// Undo record of one state change
enum JournalEntry {
    SlotChanged {
        account: Address,
        key: [u8; 32],
        previous: [u8; 32],
    },
    AccountCreated {
        address: Address,
        previous: Option<Account>,
    },
}

struct Checkpoint {
    journal_len: usize,
    logs_len: usize,
    nonce: u64,
}

#[derive(Default)]
pub struct Ledger {
    accounts: HashMap<Address, Account>,
    journal: Vec<JournalEntry>,
    logs: Vec<Log>,
    nonce: u64,
    config: LedgerConfig,
}

/// Address of a created contract. Same derivation as CREATE2, with the
/// ledger nonce as salt and the hash of the code name as init code hash.
pub fn create_address(from: Address, nonce: u64, code_name: &str) -> Address {
    let salt = B256::from(U256::from(nonce));
    let init_code_hash = keccak256(code_name.as_bytes());

    let mut bytes = Vec::with_capacity(1 + 20 + salt.len() + init_code_hash.len());
    bytes.push(0xff);
    bytes.extend_from_slice(from.as_slice());
    bytes.extend_from_slice(salt.as_slice());
    bytes.extend_from_slice(init_code_hash.as_slice());

    let hash = keccak256(bytes.as_slice());

    Address::from_slice(&hash[12..])
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Ledger {
            accounts: HashMap::new(),
            journal: Vec::new(),
            logs: Vec::new(),
            nonce: config.initial_nonce,
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Create a contract account and run its constructor with `from` as sender
    pub fn deploy<C: Contract + 'static>(
        &mut self,
        from: Address,
        code: C,
        constructor_args: &[u8],
    ) -> LedgerResult<Address> {
        self.deploy_shared(from, Arc::new(code), constructor_args)
    }

    /// Like `deploy()`, reusing code already held elsewhere
    pub fn deploy_shared(
        &mut self,
        from: Address,
        code: Arc<dyn Contract>,
        constructor_args: &[u8],
    ) -> LedgerResult<Address> {
        self.create(from, code, constructor_args, 0)
    }

    /// One atomic invocation of `to` by `from`
    pub fn transact(
        &mut self,
        from: Address,
        to: Address,
        calldata: &[u8],
    ) -> LedgerResult<Vec<u8>> {
        self.execute_frame(from, to, to, calldata, 0)
    }

    /// Typed `transact()` for a `sol!` call
    pub fn transact_sol<C: SolCall>(
        &mut self,
        from: Address,
        to: Address,
        call: &C,
    ) -> LedgerResult<C::Return> {
        let output = self.transact(from, to, &call.abi_encode())?;

        C::abi_decode_returns(&output, true).map_err(|_| LedgerError::InvalidReturnData)
    }

    pub fn has_code(&self, account: Address) -> bool {
        self.accounts
            .get(&account)
            .is_some_and(|account| account.code.is_some())
    }

    pub fn code_name(&self, account: Address) -> Option<&'static str> {
        self.accounts
            .get(&account)
            .and_then(|account| account.code.as_ref())
            .map(|code| code.name())
    }

    /// Raw slot of an account. Unknown accounts and unset slots read as zero.
    pub fn storage_at(&self, account: Address, key: &[u8; 32]) -> [u8; 32] {
        self.accounts
            .get(&account)
            .map(|account| account.storage.sload(key))
            .unwrap_or([0u8; 32])
    }

    /// Events of all committed invocations, oldest first
    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    pub(crate) fn sstore(&mut self, account: Address, key: &[u8; 32], value: &[u8; 32]) {
        let storage = &mut self.accounts.entry(account).or_default().storage;

        self.journal.push(JournalEntry::SlotChanged {
            account,
            key: *key,
            previous: storage.sload(key),
        });
        storage.sstore(key, value);
    }

    pub(crate) fn push_log(&mut self, log: Log) {
        self.logs.push(log);
    }

    /// Run the code of `code_address` against the storage of `storage_address`
    pub(crate) fn execute_frame(
        &mut self,
        msg_sender: Address,
        storage_address: Address,
        code_address: Address,
        calldata: &[u8],
        depth: usize,
    ) -> LedgerResult<Vec<u8>> {
        require!(
            depth <= self.config.max_call_depth,
            LedgerError::CallDepthExceeded(self.config.max_call_depth)
        );

        let code = self
            .accounts
            .get(&code_address)
            .and_then(|account| account.code.clone())
            .ok_or(LedgerError::NoCode(code_address))?;

        tracing::debug!(
            %msg_sender,
            %storage_address,
            %code_address,
            code = code.name(),
            depth,
            "call"
        );

        let checkpoint = self.checkpoint();
        let result = {
            let mut ctx = CallContext::new(self, storage_address, msg_sender, depth);
            code.call(&mut ctx, calldata)
        };

        match &result {
            Ok(_) => self.commit(depth),
            Err(error) => {
                tracing::debug!(%storage_address, %error, depth, "call reverted");
                self.restore(checkpoint);
            }
        }

        result
    }

    pub(crate) fn create(
        &mut self,
        from: Address,
        code: Arc<dyn Contract>,
        constructor_args: &[u8],
        depth: usize,
    ) -> LedgerResult<Address> {
        require!(
            depth <= self.config.max_call_depth,
            LedgerError::CallDepthExceeded(self.config.max_call_depth)
        );

        let checkpoint = self.checkpoint();

        let address = create_address(from, self.nonce, code.name());
        self.nonce += 1;

        let previous = self.accounts.insert(
            address,
            Account {
                code: Some(code.clone()),
                storage: SlotStorage::new(),
            },
        );
        self.journal
            .push(JournalEntry::AccountCreated { address, previous });

        let result = {
            let mut ctx = CallContext::new(self, address, from, depth);
            code.construct(&mut ctx, constructor_args)
        };

        match result {
            Ok(()) => {
                tracing::debug!(%from, %address, code = code.name(), "deployed");
                self.commit(depth);
                Ok(address)
            }
            Err(error) => {
                tracing::debug!(%from, code = code.name(), %error, "deployment reverted");
                self.restore(checkpoint);
                Err(error)
            }
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            journal_len: self.journal.len(),
            logs_len: self.logs.len(),
            nonce: self.nonce,
        }
    }

    /// A committed top-level frame can no longer be rolled back
    fn commit(&mut self, depth: usize) {
        if depth == 0 {
            self.journal.clear();
        }
    }

    /// Undo every change made after `checkpoint`, newest first
    fn restore(&mut self, checkpoint: Checkpoint) {
        while self.journal.len() > checkpoint.journal_len {
            match self.journal.pop() {
                Some(JournalEntry::SlotChanged {
                    account,
                    key,
                    previous,
                }) => {
                    if let Some(account) = self.accounts.get_mut(&account) {
                        account.storage.sstore(&key, &previous);
                    }
                }
                Some(JournalEntry::AccountCreated { address, previous }) => match previous {
                    Some(account) => {
                        self.accounts.insert(address, account);
                    }
                    None => {
                        self.accounts.remove(&address);
                    }
                },
                None => break,
            }
        }

        self.logs.truncate(checkpoint.logs_len);
        self.nonce = checkpoint.nonce;
    }
}
