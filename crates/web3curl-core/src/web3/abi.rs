//! Contract interfaces called during resolution.

use alloy_sol_types::sol;

sol! {
    /// ERC-6860 mode query.
    function resolveMode() external view returns (bytes32);

    /// ENS registry.
    function resolver(bytes32 node) external view returns (address);

    /// ENS public resolver.
    function addr(bytes32 node) external view returns (address);
    function text(bytes32 node, string key) external view returns (string);

    /// ERC-5219 resource request.
    #[derive(Debug, PartialEq, Eq)]
    struct KeyValue {
        string key;
        string value;
    }

    function request(string[] resource, KeyValue[] params)
        external
        view
        returns (uint16 statusCode, string body, KeyValue[] headers);
}
