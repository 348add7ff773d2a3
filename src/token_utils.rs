use alloy_primitives::{Address, U256};
use alloy_sol_types::sol;

use crate::{
    error::{LedgerError, LedgerResult},
    require,
    state::{CallContext, ContextActions},
};

sol! {
    interface IERC20 {
        event Transfer(address indexed from, address indexed to, uint256 value);

        function balanceOf(address owner) external view returns (uint256);

        function transfer(address recipient, uint256 amount) external returns (bool);
    }

    /// Reward supplier. Pays the caller the reward accrued for `property`.
    interface IWithdraw {
        function withdraw(address property) external;
    }
}

/// Token balance of `owner`
pub fn balance_of(ctx: &mut CallContext<'_>, token: Address, owner: Address) -> LedgerResult<U256> {
    Ok(ctx.call_sol(token, &IERC20::balanceOfCall { owner })?._0)
}

/// Transfer tokens held by the executing contract. Tokens signalling failure
/// with `false` instead of reverting are treated as a revert.
pub fn transfer(
    ctx: &mut CallContext<'_>,
    token: Address,
    recipient: Address,
    amount: U256,
) -> LedgerResult<()> {
    let success = ctx
        .call_sol(token, &IERC20::transferCall { recipient, amount })?
        ._0;
    require!(
        success,
        LedgerError::Revert("token transfer failed".to_string())
    );

    Ok(())
}

/// Transfer the whole balance of the executing contract if it is greater than 0
pub fn maybe_transfer_all(
    ctx: &mut CallContext<'_>,
    token: Address,
    recipient: Address,
) -> LedgerResult<U256> {
    let this = ctx.address();
    let balance = balance_of(ctx, token, this)?;

    if balance > U256::ZERO {
        transfer(ctx, token, recipient, balance)?;
    }

    Ok(balance)
}

/// Ask the reward supplier to pay out the reward of `property`
pub fn invoke_withdraw(
    ctx: &mut CallContext<'_>,
    supplier: Address,
    property: Address,
) -> LedgerResult<()> {
    ctx.call_sol(supplier, &IWithdraw::withdrawCall { property })?;

    Ok(())
}
