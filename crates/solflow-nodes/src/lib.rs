//! Standard node library
//!
//! One module per node family: RPC reads, wallet operations, transaction
//! assembly, SPL-token queries, arithmetic, logic, value inputs, display
//! outputs, collection helpers and utilities.

mod collection;
mod input;
mod logic;
mod math;
mod output;
mod rpc;
mod token;
mod transaction;
mod util;
mod wallet;

use solflow_runtime::NodeRegistry;
use std::sync::Arc;

/// Register every built-in node type with a registry.
pub fn register_all(registry: &mut NodeRegistry) {
    registry.register(Arc::new(rpc::RpcConnection));
    registry.register(Arc::new(rpc::GetBalance));
    registry.register(Arc::new(rpc::GetAccountInfo));
    registry.register(Arc::new(rpc::GetSlot));
    registry.register(Arc::new(rpc::GetBlockHeight));
    registry.register(Arc::new(rpc::GetRecentBlockhash));

    registry.register(Arc::new(wallet::WalletConnect));
    registry.register(Arc::new(wallet::WalletSign));
    registry.register(Arc::new(wallet::WalletSignMessage));

    registry.register(Arc::new(transaction::CreateTransaction));
    registry.register(Arc::new(transaction::AddInstruction));
    registry.register(Arc::new(transaction::SendTransaction));
    registry.register(Arc::new(transaction::TransferSol));

    registry.register(Arc::new(token::GetTokenAccounts));
    registry.register(Arc::new(token::GetTokenBalance));
    registry.register(Arc::new(token::TransferToken));
    registry.register(Arc::new(token::GetTokenInfo));
    registry.register(Arc::new(token::CheckSwapRoutes::new()));

    registry.register(Arc::new(math::Add));
    registry.register(Arc::new(math::Subtract));
    registry.register(Arc::new(math::Multiply));
    registry.register(Arc::new(math::Divide));
    registry.register(Arc::new(math::LamportsToSol));
    registry.register(Arc::new(math::SolToLamports));

    registry.register(Arc::new(logic::Compare));
    registry.register(Arc::new(logic::And));
    registry.register(Arc::new(logic::Or));
    registry.register(Arc::new(logic::Not));
    registry.register(Arc::new(logic::Switch));

    registry.register(Arc::new(input::StringInput));
    registry.register(Arc::new(input::NumberInput));
    registry.register(Arc::new(input::PubkeyInput));
    registry.register(Arc::new(input::BooleanInput));

    registry.register(Arc::new(output::Display));
    registry.register(Arc::new(output::Log));

    registry.register(Arc::new(collection::ForEach));
    registry.register(Arc::new(collection::Repeat));
    registry.register(Arc::new(collection::Range));
    registry.register(Arc::new(collection::ArrayLength));
    registry.register(Arc::new(collection::ArrayGetItem));

    registry.register(Arc::new(util::Delay));
    registry.register(Arc::new(util::JsonParse));
    registry.register(Arc::new(util::JsonStringify));
    registry.register(Arc::new(util::GetProperty));
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_the_full_catalog() {
        let mut registry = NodeRegistry::new();
        register_all(&mut registry);
        for node_type in [
            "rpc-connection",
            "get-balance",
            "wallet-connect",
            "create-transaction",
            "send-transaction",
            "transfer-sol",
            "get-token-balance",
            "math-divide",
            "logic-switch",
            "input-number",
            "output-display",
            "loop-for-each",
            "array-get-item",
            "utility-json-parse",
        ] {
            assert!(registry.contains(node_type), "{node_type} not registered");
        }
        assert!(!registry.contains("no-such-node"));
    }
}
