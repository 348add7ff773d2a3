//! Typed key-value store with a single writer.
//!
//! Reads are open to everyone. Setters, deleters and `changeOwner` are
//! restricted to the current owner, which starts out as the deployer. A
//! consumer that owns the store can hand it to its successor with
//! `changeOwner`; the previous owner loses write access in the same call.

use alloy_primitives::{Address, B256, I256, U256};
use alloy_sol_types::{sol, SolCall};

use crate::{
    error::{LedgerError, LedgerResult},
    ledger::Contract,
    require,
    state::{
        decode_calls, unknown_selector, CallContext, ContextActions, FixedSlot, SlotActions,
        SlotKey, SlotValue, WordValue, OWNER_KEY_SEED,
    },
};

sol! {
    interface IEternalStorage {
        event OwnerChanged(address indexed previousOwner, address indexed newOwner);

        function getUint(bytes32 key) external view returns (uint256);
        function setUint(bytes32 key, uint256 value) external;
        function deleteUint(bytes32 key) external;

        function getInt(bytes32 key) external view returns (int256);
        function setInt(bytes32 key, int256 value) external;
        function deleteInt(bytes32 key) external;

        function getAddress(bytes32 key) external view returns (address);
        function setAddress(bytes32 key, address value) external;
        function deleteAddress(bytes32 key) external;

        function getBool(bytes32 key) external view returns (bool);
        function setBool(bytes32 key, bool value) external;
        function deleteBool(bytes32 key) external;

        function getBytes(bytes32 key) external view returns (bytes32);
        function setBytes(bytes32 key, bytes32 value) external;
        function deleteBytes(bytes32 key) external;

        function getString(bytes32 key) external view returns (string);
        function setString(bytes32 key, string value) external;
        function deleteString(bytes32 key) external;

        function changeOwner(address newOwner) external;

        function owner() external view returns (address);
    }
}

use IEternalStorage::IEternalStorageCalls as Calls;

const STORE_OWNER_SLOT: FixedSlot = FixedSlot(OWNER_KEY_SEED);

fn current_owner<S: SlotActions + ?Sized>(storage: &S) -> Address {
    Address::decode(&storage.sload(&STORE_OWNER_SLOT.get_key()))
}

fn only_current_owner(ctx: &CallContext<'_>) -> LedgerResult<()> {
    require!(current_owner(ctx) == ctx.msg_sender(), LedgerError::NotOwner);

    Ok(())
}

fn set<T: SlotValue>(ctx: &mut CallContext<'_>, key: &B256, value: &T) -> LedgerResult<()> {
    only_current_owner(ctx)?;

    #[cfg(feature = "debug")]
    tracing::debug!(store = %ctx.address(), %key, kind = ?T::KIND, "set");

    value.write_to_slot(ctx, key);

    Ok(())
}

fn delete<T: SlotValue>(ctx: &mut CallContext<'_>, key: &B256) -> LedgerResult<()> {
    only_current_owner(ctx)?;

    #[cfg(feature = "debug")]
    tracing::debug!(store = %ctx.address(), %key, kind = ?T::KIND, "delete");

    T::clear_slot(ctx, key);

    Ok(())
}

fn change_owner(ctx: &mut CallContext<'_>, new_owner: Address) -> LedgerResult<()> {
    only_current_owner(ctx)?;

    let previous_owner = current_owner(ctx);
    ctx.sstore(&STORE_OWNER_SLOT.get_key(), &new_owner.encode());

    tracing::info!(store = %ctx.address(), %previous_owner, %new_owner, "store owner changed");
    ctx.emit(IEternalStorage::OwnerChanged {
        previousOwner: previous_owner,
        newOwner: new_owner,
    });

    Ok(())
}

pub struct EternalStorage;

impl Contract for EternalStorage {
    fn name(&self) -> &'static str {
        "EternalStorage"
    }

    fn construct(&self, ctx: &mut CallContext<'_>, _args: &[u8]) -> LedgerResult<()> {
        let creator = ctx.msg_sender();
        ctx.sstore(&STORE_OWNER_SLOT.get_key(), &creator.encode());

        Ok(())
    }

    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> LedgerResult<Vec<u8>> {
        let call = decode_calls::<Calls>(input)?.ok_or_else(|| unknown_selector(input))?;

        let output = match call {
            Calls::getUint(call) => {
                let value = U256::read_from_slot(ctx, &call.key);
                IEternalStorage::getUintCall::abi_encode_returns(&(value,))
            }
            Calls::setUint(call) => {
                set(ctx, &call.key, &call.value)?;
                Vec::new()
            }
            Calls::deleteUint(call) => {
                delete::<U256>(ctx, &call.key)?;
                Vec::new()
            }

            Calls::getInt(call) => {
                let value = I256::read_from_slot(ctx, &call.key);
                IEternalStorage::getIntCall::abi_encode_returns(&(value,))
            }
            Calls::setInt(call) => {
                set(ctx, &call.key, &call.value)?;
                Vec::new()
            }
            Calls::deleteInt(call) => {
                delete::<I256>(ctx, &call.key)?;
                Vec::new()
            }

            Calls::getAddress(call) => {
                let value = Address::read_from_slot(ctx, &call.key);
                IEternalStorage::getAddressCall::abi_encode_returns(&(value,))
            }
            Calls::setAddress(call) => {
                set(ctx, &call.key, &call.value)?;
                Vec::new()
            }
            Calls::deleteAddress(call) => {
                delete::<Address>(ctx, &call.key)?;
                Vec::new()
            }

            Calls::getBool(call) => {
                let value = bool::read_from_slot(ctx, &call.key);
                IEternalStorage::getBoolCall::abi_encode_returns(&(value,))
            }
            Calls::setBool(call) => {
                set(ctx, &call.key, &call.value)?;
                Vec::new()
            }
            Calls::deleteBool(call) => {
                delete::<bool>(ctx, &call.key)?;
                Vec::new()
            }

            Calls::getBytes(call) => {
                let value = B256::read_from_slot(ctx, &call.key);
                IEternalStorage::getBytesCall::abi_encode_returns(&(value,))
            }
            Calls::setBytes(call) => {
                set(ctx, &call.key, &call.value)?;
                Vec::new()
            }
            Calls::deleteBytes(call) => {
                delete::<B256>(ctx, &call.key)?;
                Vec::new()
            }

            Calls::getString(call) => {
                let value = String::read_from_slot(ctx, &call.key);
                IEternalStorage::getStringCall::abi_encode_returns(&(value,))
            }
            Calls::setString(call) => {
                set(ctx, &call.key, &call.value)?;
                Vec::new()
            }
            Calls::deleteString(call) => {
                delete::<String>(ctx, &call.key)?;
                Vec::new()
            }

            Calls::changeOwner(call) => {
                change_owner(ctx, call.newOwner)?;
                Vec::new()
            }
            Calls::owner(_) => {
                IEternalStorage::ownerCall::abi_encode_returns(&(current_owner(ctx),))
            }
        };

        Ok(output)
    }
}

/// Client side of a store, used by consumers from inside their own frames
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreHandle {
    pub address: Address,
}

impl StoreHandle {
    pub fn new(address: Address) -> Self {
        StoreHandle { address }
    }

    pub fn get_uint(&self, ctx: &mut CallContext<'_>, key: B256) -> LedgerResult<U256> {
        let result = ctx.call_sol(self.address, &IEternalStorage::getUintCall { key })?;
        Ok(result._0)
    }

    pub fn set_uint(&self, ctx: &mut CallContext<'_>, key: B256, value: U256) -> LedgerResult<()> {
        ctx.call_sol(self.address, &IEternalStorage::setUintCall { key, value })?;
        Ok(())
    }

    pub fn get_address(&self, ctx: &mut CallContext<'_>, key: B256) -> LedgerResult<Address> {
        let result = ctx.call_sol(self.address, &IEternalStorage::getAddressCall { key })?;
        Ok(result._0)
    }

    pub fn set_address(
        &self,
        ctx: &mut CallContext<'_>,
        key: B256,
        value: Address,
    ) -> LedgerResult<()> {
        ctx.call_sol(self.address, &IEternalStorage::setAddressCall { key, value })?;
        Ok(())
    }

    pub fn change_owner(&self, ctx: &mut CallContext<'_>, new_owner: Address) -> LedgerResult<()> {
        ctx.call_sol(
            self.address,
            &IEternalStorage::changeOwnerCall {
                newOwner: new_owner,
            },
        )?;
        Ok(())
    }
}
