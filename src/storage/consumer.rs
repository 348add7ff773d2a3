//! Storage consumers: contracts that keep their data in an `EternalStorage`
//! and expose the capability operations plus one demonstration slot.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};

use crate::{
    access::{admin, ownable, Role},
    error::LedgerResult,
    ledger::Contract,
    parameters::UINT_SLOT_NAME,
    state::{decode_calls, keccak_key, unknown_selector, CallContext},
};

use super::{CapabilityPolicy, StorageCapability};

sol! {
    interface IUsingStorage {
        function createStorage() external;
        function getStorageAddress() external view returns (address);
        function getEternalStorageAddress() external view returns (address);
        function setStorage(address storageAddress) external;
        function changeOwner(address newOwner) external;

        function getUInt() external view returns (uint256);
        function setUInt(uint256 value) external;
    }
}

use IUsingStorage::IUsingStorageCalls as Calls;

pub struct StorageConsumer {
    pub policy: CapabilityPolicy,
}

impl StorageConsumer {
    /// Gated by the consumer's Ownable owner
    pub fn single_owner() -> Self {
        StorageConsumer {
            policy: CapabilityPolicy::SingleOwner,
        }
    }

    /// Gated by the storage owner set, managed by admins
    pub fn storage_owner_set() -> Self {
        StorageConsumer {
            policy: CapabilityPolicy::StorageOwnerSet,
        }
    }

    fn capability(&self) -> StorageCapability {
        StorageCapability::new(self.policy)
    }

    fn get_uint(ctx: &mut CallContext<'_>) -> LedgerResult<U256> {
        StorageCapability::eternal_storage(ctx)?.get_uint(ctx, keccak_key(UINT_SLOT_NAME))
    }

    fn set_uint(ctx: &mut CallContext<'_>, value: U256) -> LedgerResult<()> {
        StorageCapability::eternal_storage(ctx)?.set_uint(ctx, keccak_key(UINT_SLOT_NAME), value)
    }
}

impl Contract for StorageConsumer {
    fn name(&self) -> &'static str {
        match self.policy {
            CapabilityPolicy::SingleOwner => "UsingStorageSimple",
            CapabilityPolicy::StorageOwnerSet => "UsingStorage",
        }
    }

    fn construct(&self, ctx: &mut CallContext<'_>, _args: &[u8]) -> LedgerResult<()> {
        match self.policy {
            CapabilityPolicy::SingleOwner => ownable::init_owner(ctx),
            CapabilityPolicy::StorageOwnerSet => {
                admin::grant_to_sender(ctx, Role::Admin);
                admin::grant_to_sender(ctx, Role::StorageOwner);
            }
        }

        Ok(())
    }

    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> LedgerResult<Vec<u8>> {
        let Some(call) = decode_calls::<Calls>(input)? else {
            let fallback = match self.policy {
                CapabilityPolicy::SingleOwner => ownable::dispatch(ctx, input)?,
                CapabilityPolicy::StorageOwnerSet => admin::dispatch(ctx, input)?,
            };

            return fallback.ok_or_else(|| unknown_selector(input));
        };

        let output = match call {
            Calls::createStorage(_) => {
                self.capability().create_storage(ctx)?;
                Vec::new()
            }
            Calls::getStorageAddress(_) => {
                let address = StorageCapability::get_storage_address(ctx)?;
                IUsingStorage::getStorageAddressCall::abi_encode_returns(&(address,))
            }
            Calls::getEternalStorageAddress(_) => {
                let address: Address = StorageCapability::eternal_storage(ctx)?.address;
                IUsingStorage::getEternalStorageAddressCall::abi_encode_returns(&(address,))
            }
            Calls::setStorage(call) => {
                self.capability().set_storage(ctx, call.storageAddress)?;
                Vec::new()
            }
            Calls::changeOwner(call) => {
                self.capability().change_owner(ctx, call.newOwner)?;
                Vec::new()
            }
            Calls::getUInt(_) => {
                let value = Self::get_uint(ctx)?;
                IUsingStorage::getUIntCall::abi_encode_returns(&(value,))
            }
            Calls::setUInt(call) => {
                Self::set_uint(ctx, call.value)?;
                Vec::new()
            }
        };

        Ok(output)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        access::admin::IRoleRegistry,
        error::LedgerError,
        ledger::Ledger,
        storage::{EternalStorage, IEternalStorage},
    };
    use alloy_primitives::address;

    const DEPLOYER: Address = address!("1000000000000000000000000000000000000001");
    const NEW_ADMIN: Address = address!("2000000000000000000000000000000000000002");
    const USER: Address = address!("3000000000000000000000000000000000000003");

    fn get_uint(ledger: &mut Ledger, consumer: Address) -> LedgerResult<U256> {
        Ok(ledger
            .transact_sol(DEPLOYER, consumer, &IUsingStorage::getUIntCall {})?
            ._0)
    }

    fn set_uint(ledger: &mut Ledger, consumer: Address, value: u64) -> LedgerResult<()> {
        ledger.transact_sol(
            DEPLOYER,
            consumer,
            &IUsingStorage::setUIntCall {
                value: U256::from(value),
            },
        )?;
        Ok(())
    }

    fn storage_address(ledger: &mut Ledger, consumer: Address) -> LedgerResult<Address> {
        Ok(ledger
            .transact_sol(DEPLOYER, consumer, &IUsingStorage::getStorageAddressCall {})?
            ._0)
    }

    fn create_storage(ledger: &mut Ledger, from: Address, consumer: Address) -> LedgerResult<()> {
        ledger.transact_sol(from, consumer, &IUsingStorage::createStorageCall {})?;
        Ok(())
    }

    fn set_storage(
        ledger: &mut Ledger,
        from: Address,
        consumer: Address,
        store: Address,
    ) -> LedgerResult<()> {
        ledger.transact_sol(
            from,
            consumer,
            &IUsingStorage::setStorageCall {
                storageAddress: store,
            },
        )?;
        Ok(())
    }

    fn change_owner(
        ledger: &mut Ledger,
        from: Address,
        consumer: Address,
        new_owner: Address,
    ) -> LedgerResult<()> {
        ledger.transact_sol(
            from,
            consumer,
            &IUsingStorage::changeOwnerCall {
                newOwner: new_owner,
            },
        )?;
        Ok(())
    }

    fn role_of(ledger: &mut Ledger, consumer: Address, account: Address) -> (bool, bool) {
        let is_admin = ledger
            .transact_sol(DEPLOYER, consumer, &IRoleRegistry::isAdminCall { account })
            .unwrap()
            ._0;
        let is_storage_owner = ledger
            .transact_sol(DEPLOYER, consumer, &IRoleRegistry::isStorageOwnerCall { account })
            .unwrap()
            ._0;

        (is_admin, is_storage_owner)
    }

    /// Two storage-owner-set consumers, the first with a created store holding 1
    fn setup_migration() -> (Ledger, Address, Address) {
        let mut ledger = Ledger::new();
        let current = ledger
            .deploy(DEPLOYER, StorageConsumer::storage_owner_set(), &[])
            .unwrap();
        create_storage(&mut ledger, DEPLOYER, current).unwrap();
        set_uint(&mut ledger, current, 1).unwrap();

        let next = ledger
            .deploy(DEPLOYER, StorageConsumer::storage_owner_set(), &[])
            .unwrap();

        (ledger, current, next)
    }

    #[test]
    fn test_deployer_holds_both_roles() {
        let mut ledger = Ledger::new();
        let consumer = ledger
            .deploy(DEPLOYER, StorageConsumer::storage_owner_set(), &[])
            .unwrap();

        assert_eq!(role_of(&mut ledger, consumer, DEPLOYER), (true, true));
        assert_eq!(role_of(&mut ledger, consumer, NEW_ADMIN), (false, false));

        ledger
            .transact_sol(
                DEPLOYER,
                consumer,
                &IRoleRegistry::addStorageOwnerCall { account: NEW_ADMIN },
            )
            .unwrap();
        assert_eq!(role_of(&mut ledger, consumer, NEW_ADMIN), (false, true));

        ledger
            .transact_sol(
                DEPLOYER,
                consumer,
                &IRoleRegistry::deleteStorageOwnerCall { account: DEPLOYER },
            )
            .unwrap();
        assert_eq!(role_of(&mut ledger, consumer, DEPLOYER), (true, false));

        // Storage owner membership is admin gated, not self gated
        let result = ledger.transact_sol(
            NEW_ADMIN,
            consumer,
            &IRoleRegistry::deleteStorageOwnerCall { account: NEW_ADMIN },
        );
        assert_eq!(result.err(), Some(LedgerError::AdminOnly));
    }

    #[test]
    fn test_create_storage() {
        let mut ledger = Ledger::new();
        let consumer = ledger
            .deploy(DEPLOYER, StorageConsumer::storage_owner_set(), &[])
            .unwrap();

        assert_eq!(
            storage_address(&mut ledger, consumer),
            Err(LedgerError::StorageNotSet)
        );
        assert_eq!(get_uint(&mut ledger, consumer), Err(LedgerError::StorageNotSet));

        assert_eq!(
            create_storage(&mut ledger, USER, consumer),
            Err(LedgerError::StorageOwnerOnly)
        );

        create_storage(&mut ledger, DEPLOYER, consumer).unwrap();
        let store = storage_address(&mut ledger, consumer).unwrap();
        assert_eq!(ledger.code_name(store), Some("EternalStorage"));
        assert_eq!(get_uint(&mut ledger, consumer), Ok(U256::ZERO));

        let eternal_storage_address = ledger
            .transact_sol(DEPLOYER, consumer, &IUsingStorage::getEternalStorageAddressCall {})
            .unwrap()
            ._0;
        assert_eq!(eternal_storage_address, store);

        // The consumer, not its caller, owns the store
        let owner = ledger
            .transact_sol(DEPLOYER, store, &IEternalStorage::ownerCall {})
            .unwrap()
            ._0;
        assert_eq!(owner, consumer);

        assert_eq!(
            create_storage(&mut ledger, DEPLOYER, consumer),
            Err(LedgerError::StorageAlreadySet)
        );
        assert_eq!(
            set_storage(&mut ledger, DEPLOYER, consumer, store),
            Err(LedgerError::StorageAlreadySet)
        );
    }

    #[test]
    fn test_single_owner_policy() {
        let mut ledger = Ledger::new();
        let consumer = ledger
            .deploy(DEPLOYER, StorageConsumer::single_owner(), &[])
            .unwrap();

        assert_eq!(
            create_storage(&mut ledger, USER, consumer),
            Err(LedgerError::CallerNotCurrentOwner)
        );
        create_storage(&mut ledger, DEPLOYER, consumer).unwrap();

        set_uint(&mut ledger, consumer, 5).unwrap();
        assert_eq!(get_uint(&mut ledger, consumer), Ok(U256::from(5)));

        // Ownership of the consumer moves with Ownable
        ledger
            .transact_sol(
                DEPLOYER,
                consumer,
                &ownable::IOwnable::transferOwnershipCall { newOwner: USER },
            )
            .unwrap();

        let store = storage_address(&mut ledger, consumer).unwrap();
        assert_eq!(
            change_owner(&mut ledger, DEPLOYER, consumer, USER),
            Err(LedgerError::CallerNotCurrentOwner)
        );
        change_owner(&mut ledger, USER, consumer, USER).unwrap();

        let owner = ledger
            .transact_sol(DEPLOYER, store, &IEternalStorage::ownerCall {})
            .unwrap()
            ._0;
        assert_eq!(owner, USER);
    }

    #[test]
    fn test_attached_store_is_read_only() {
        let (mut ledger, current, next) = setup_migration();
        let store = storage_address(&mut ledger, current).unwrap();

        assert_eq!(
            set_storage(&mut ledger, USER, next, store),
            Err(LedgerError::StorageOwnerOnly)
        );

        set_storage(&mut ledger, DEPLOYER, next, store).unwrap();
        assert_eq!(get_uint(&mut ledger, next), Ok(U256::from(1)));

        assert_eq!(set_uint(&mut ledger, next, 2), Err(LedgerError::NotOwner));
        assert_eq!(
            change_owner(&mut ledger, DEPLOYER, next, next),
            Err(LedgerError::NotOwner)
        );
    }

    #[test]
    fn test_migration_window_reads_committed_values() {
        let (mut ledger, current, next) = setup_migration();
        let store = storage_address(&mut ledger, current).unwrap();
        set_storage(&mut ledger, DEPLOYER, next, store).unwrap();

        // The previous owner keeps writing until the hand-off, and the attached
        // consumer observes every committed write
        set_uint(&mut ledger, current, 3).unwrap();
        assert_eq!(get_uint(&mut ledger, next), Ok(U256::from(3)));
    }

    #[test]
    fn test_hand_off() {
        let (mut ledger, current, next) = setup_migration();
        let store = storage_address(&mut ledger, current).unwrap();
        set_storage(&mut ledger, DEPLOYER, next, store).unwrap();

        assert_eq!(
            change_owner(&mut ledger, USER, current, next),
            Err(LedgerError::StorageOwnerOnly)
        );

        change_owner(&mut ledger, DEPLOYER, current, next).unwrap();

        set_uint(&mut ledger, next, 2).unwrap();
        assert_eq!(get_uint(&mut ledger, next), Ok(U256::from(2)));
        assert_eq!(get_uint(&mut ledger, current), Ok(U256::from(2)));

        // No dual-write window
        assert_eq!(set_uint(&mut ledger, current, 4), Err(LedgerError::NotOwner));
    }

    #[test]
    fn test_failed_hand_off_changes_nothing() {
        let (mut ledger, current, next) = setup_migration();
        let store = storage_address(&mut ledger, current).unwrap();

        // A store this consumer never owned
        let foreign = ledger.deploy(USER, EternalStorage, &[]).unwrap();
        set_storage(&mut ledger, DEPLOYER, next, foreign).unwrap();

        let logs_before = ledger.logs().len();
        assert_eq!(
            change_owner(&mut ledger, DEPLOYER, next, current),
            Err(LedgerError::NotOwner)
        );
        assert_eq!(ledger.logs().len(), logs_before);

        let owner = ledger
            .transact_sol(DEPLOYER, store, &IEternalStorage::ownerCall {})
            .unwrap()
            ._0;
        assert_eq!(owner, current);
    }
}
