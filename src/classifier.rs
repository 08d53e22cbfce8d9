use crate::rpc::ChainSource;
use alloy_primitives::Address;
use tracing::debug;

/// True iff bytecode is deployed at `address`. Any RPC failure answers
/// false; the callers only act on a positive answer.
pub async fn has_deployed_code<C: ChainSource>(chain: &C, address: Address) -> bool {
    match chain.code_at(address).await {
        Ok(code) => !code.is_empty(),
        Err(e) => {
            debug!("Code lookup for {:?} failed: {}", address, e);
            false
        }
    }
}

/// Heuristic ERC-20 probe: all four read calls must succeed. Returned
/// values are not inspected, and a failure on any single call (including
/// "not a contract") answers false.
pub async fn is_erc20_conformant<C: ChainSource>(chain: &C, address: Address) -> bool {
    let (name, symbol, decimals, total_supply) = tokio::join!(
        chain.token_name(address),
        chain.token_symbol(address),
        chain.token_decimals(address),
        chain.token_total_supply(address),
    );

    name.is_ok() && symbol.is_ok() && decimals.is_ok() && total_supply.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, U256};
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;

    struct FakeChain {
        code: Result<Bytes>,
        name: Result<String>,
        symbol: Result<String>,
        decimals: Result<u8>,
        total_supply: Result<U256>,
    }

    impl FakeChain {
        fn erc20() -> Self {
            FakeChain {
                code: Ok(Bytes::from(vec![0x60, 0x80])),
                name: Ok("Test Token".to_string()),
                symbol: Ok("TST".to_string()),
                decimals: Ok(18),
                total_supply: Ok(U256::from(1_000u64)),
            }
        }
    }

    fn clone_result<T: Clone>(r: &Result<T>) -> Result<T> {
        match r {
            Ok(v) => Ok(v.clone()),
            Err(e) => Err(anyhow!("{}", e)),
        }
    }

    #[async_trait]
    impl ChainSource for FakeChain {
        async fn code_at(&self, _address: Address) -> Result<Bytes> {
            clone_result(&self.code)
        }
        async fn token_name(&self, _address: Address) -> Result<String> {
            clone_result(&self.name)
        }
        async fn token_symbol(&self, _address: Address) -> Result<String> {
            clone_result(&self.symbol)
        }
        async fn token_decimals(&self, _address: Address) -> Result<u8> {
            clone_result(&self.decimals)
        }
        async fn token_total_supply(&self, _address: Address) -> Result<U256> {
            clone_result(&self.total_supply)
        }
    }

    #[tokio::test]
    async fn deployed_code_detected() {
        let chain = FakeChain::erc20();
        assert!(has_deployed_code(&chain, Address::repeat_byte(0x01)).await);
    }

    #[tokio::test]
    async fn empty_code_means_no_contract() {
        let chain = FakeChain {
            code: Ok(Bytes::new()),
            ..FakeChain::erc20()
        };
        assert!(!has_deployed_code(&chain, Address::repeat_byte(0x01)).await);
    }

    #[tokio::test]
    async fn code_lookup_error_fails_closed() {
        let chain = FakeChain {
            code: Err(anyhow!("connection reset")),
            ..FakeChain::erc20()
        };
        assert!(!has_deployed_code(&chain, Address::repeat_byte(0x01)).await);
    }

    #[tokio::test]
    async fn all_four_calls_passing_is_conformant() {
        let chain = FakeChain::erc20();
        assert!(is_erc20_conformant(&chain, Address::repeat_byte(0x01)).await);
    }

    #[tokio::test]
    async fn one_failing_call_is_not_conformant() {
        let chain = FakeChain {
            decimals: Err(anyhow!("execution reverted")),
            ..FakeChain::erc20()
        };
        assert!(!is_erc20_conformant(&chain, Address::repeat_byte(0x01)).await);
    }
}
