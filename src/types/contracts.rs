//! Contract interfaces the pipeline encodes calls for.

use alloy::sol;

sol! {
    /// The multi-owner account.
    #[sol(rpc)]
    #[derive(Debug)]
    interface IAccount {
        /// Executes a transaction once enough owner signatures are provided.
        function execTransaction(
            address to,
            uint256 value,
            bytes calldata data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address payable refundReceiver,
            bytes memory signatures
        ) external payable returns (bool success);

        /// Initializes a freshly deployed proxy.
        function setup(
            address[] calldata _owners,
            uint256 _threshold,
            address to,
            bytes calldata data,
            address fallbackHandler,
            address paymentToken,
            uint256 payment,
            address payable paymentReceiver
        ) external;

        /// Returns the current account nonce.
        function nonce() external view returns (uint256);

        /// Returns the number of required owner signatures.
        function getThreshold() external view returns (uint256);

        /// Returns the owners.
        function getOwners() external view returns (address[] memory);

        /// Returns the contract version string, eg. `1.3.0`.
        function VERSION() external view returns (string memory);

        /// Marks a hash as approved by `msg.sender`.
        function approveHash(bytes32 hashToApprove) external;
    }

    /// The `setup` call of accounts older than 1.1.0, which has no fallback handler.
    #[derive(Debug)]
    interface ILegacyAccount {
        /// Initializes a freshly deployed proxy.
        function setup(
            address[] calldata _owners,
            uint256 _threshold,
            address to,
            bytes calldata data,
            address paymentToken,
            uint256 payment,
            address payable paymentReceiver
        ) external;
    }

    /// The proxy factory deploying accounts through `CREATE2`.
    #[sol(rpc)]
    #[derive(Debug)]
    interface IProxyFactory {
        /// Deploys a proxy pointing at `_singleton`, calls it with `initializer`.
        function createProxyWithNonce(
            address _singleton,
            bytes memory initializer,
            uint256 saltNonce
        ) external returns (address proxy);

        /// Returns the creation code of the deployed proxies.
        function proxyCreationCode() external pure returns (bytes memory);
    }

    /// The batch execution helper.
    ///
    /// `transactions` is a packed encoding of
    /// `operation (1 byte) | to (20 bytes) | value (32 bytes) | data length (32 bytes) | data`.
    #[sol(rpc)]
    #[derive(Debug)]
    interface IMultiSend {
        /// Executes all packed transactions, reverting if any of them fails.
        function multiSend(bytes memory transactions) external payable;
    }

    /// EIP-1271 signature validator.
    #[sol(rpc)]
    #[derive(Debug)]
    interface ISignatureValidator {
        /// Returns `0x1626ba7e` if `signature` is valid for `hash`.
        function isValidSignature(bytes32 hash, bytes memory signature)
            external
            view
            returns (bytes4 magicValue);
    }

    /// Legacy signature validator used by accounts older than 1.3.0.
    #[sol(rpc)]
    #[derive(Debug)]
    interface ILegacySignatureValidator {
        /// Returns `0x20c13b0b` if `signature` is valid for `data`.
        function isValidSignature(bytes memory data, bytes memory signature)
            external
            view
            returns (bytes4 magicValue);
    }
}
