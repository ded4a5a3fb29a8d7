//! Contract interfaces used for reads
//!
//! Only the view functions this crate calls are declared.
use alloy_sol_types::sol;

sol! {
    /// Multicall3 batched reads
    interface IMulticall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Result3 {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calldata calls) external payable returns (Result3[] memory returnData);
    }

    /// Lending pool view used for per-token collateral balances
    interface ILendingPool {
        function getCollateralBalance(address account, address token) external view returns (uint256 balance);
    }
}
