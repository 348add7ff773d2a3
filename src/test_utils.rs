//! Collaborator mocks: a fungible token and a reward supplier.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, sol_data, SolCall, SolType};

use crate::{
    error::{LedgerError, LedgerResult},
    ledger::{Contract, Ledger},
    require,
    state::{
        decode_calls, unknown_selector, CallContext, ContextActions, FixedSlot, SlotActions,
        SlotKey, SlotValue, WordValue, COLLABORATOR_KEY_SEED,
    },
    token_utils::{IWithdraw, IERC20},
};

/// Paid out by `MockWithdraw` on every withdraw, 10 tokens with 18 decimals
pub const REWARD: U256 = U256::from_limbs([10_000_000_000_000_000_000, 0, 0, 0]);

sol! {
    interface IMockToken {
        function mint(address to, uint256 amount) external;
    }
}

fn balance_key(owner: Address) -> B256 {
    B256::left_padding_from(owner.as_slice())
}

pub fn balance(ledger: &mut Ledger, token: Address, owner: Address) -> U256 {
    ledger
        .transact_sol(owner, token, &IERC20::balanceOfCall { owner })
        .unwrap()
        ._0
}

/// ERC20 without allowances. The deployer receives the initial supply.
pub struct MockToken;

impl MockToken {
    pub fn fund(ledger: &mut Ledger, token: Address, from: Address, to: Address, amount: U256) {
        ledger
            .transact_sol(
                from,
                token,
                &IERC20::transferCall {
                    recipient: to,
                    amount,
                },
            )
            .unwrap();
    }

    fn mint(ctx: &mut CallContext<'_>, to: Address, amount: U256) {
        let balance = U256::read_from_slot(ctx, &balance_key(to));
        (balance + amount).write_to_slot(ctx, &balance_key(to));
    }

    fn transfer(ctx: &mut CallContext<'_>, to: Address, amount: U256) -> LedgerResult<()> {
        let from = ctx.msg_sender();
        let from_balance = U256::read_from_slot(ctx, &balance_key(from));
        require!(
            from_balance >= amount,
            LedgerError::Revert("ERC20: transfer amount exceeds balance".to_string())
        );

        (from_balance - amount).write_to_slot(ctx, &balance_key(from));
        Self::mint(ctx, to, amount);

        ctx.emit(IERC20::Transfer {
            from,
            to,
            value: amount,
        });

        Ok(())
    }
}

impl Contract for MockToken {
    fn name(&self) -> &'static str {
        "MockToken"
    }

    fn construct(&self, ctx: &mut CallContext<'_>, _args: &[u8]) -> LedgerResult<()> {
        let deployer = ctx.msg_sender();
        Self::mint(ctx, deployer, REWARD * U256::from(1_000));

        Ok(())
    }

    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> LedgerResult<Vec<u8>> {
        if let Some(call) = decode_calls::<IMockToken::IMockTokenCalls>(input)? {
            let IMockToken::IMockTokenCalls::mint(call) = call;
            Self::mint(ctx, call.to, call.amount);

            return Ok(Vec::new());
        }

        let call = decode_calls::<IERC20::IERC20Calls>(input)?
            .ok_or_else(|| unknown_selector(input))?;

        let output = match call {
            IERC20::IERC20Calls::balanceOf(call) => {
                let balance = U256::read_from_slot(ctx, &balance_key(call.owner));
                IERC20::balanceOfCall::abi_encode_returns(&(balance,))
            }
            IERC20::IERC20Calls::transfer(call) => {
                Self::transfer(ctx, call.recipient, call.amount)?;
                IERC20::transferCall::abi_encode_returns(&(true,))
            }
        };

        Ok(output)
    }
}

const TOKEN_SLOT: FixedSlot = FixedSlot(COLLABORATOR_KEY_SEED);

type WithdrawParams = (sol_data::Address,);

/// Reward supplier paying a fixed `REWARD` of its token to the caller
pub struct MockWithdraw;

impl MockWithdraw {
    pub fn constructor_args(token: Address) -> Vec<u8> {
        WithdrawParams::abi_encode_params(&(token,))
    }
}

impl Contract for MockWithdraw {
    fn name(&self) -> &'static str {
        "MockWithdraw"
    }

    fn construct(&self, ctx: &mut CallContext<'_>, args: &[u8]) -> LedgerResult<()> {
        let (token,) = WithdrawParams::abi_decode_params(args, true)
            .map_err(|_| LedgerError::InvalidCalldata)?;
        ctx.sstore(&TOKEN_SLOT.get_key(), &token.encode());

        Ok(())
    }

    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> LedgerResult<Vec<u8>> {
        let call = decode_calls::<IWithdraw::IWithdrawCalls>(input)?
            .ok_or_else(|| unknown_selector(input))?;
        let IWithdraw::IWithdrawCalls::withdraw(_) = call;

        let token = Address::decode(&ctx.sload(&TOKEN_SLOT.get_key()));
        let recipient = ctx.msg_sender();
        crate::token_utils::transfer(ctx, token, recipient, REWARD)?;

        Ok(Vec::new())
    }
}
