use alloy::rpc::types::Log;
use alloy::sol;
use alloy::sol_types::SolEvent;
use alloy_primitives::{Address, B256, Bytes, U256};

sol! {
    event Transfer(address indexed from, address indexed to, uint256 value);

    function name() external view returns (string);
    function symbol() external view returns (string);
    function decimals() external view returns (uint8);
    function totalSupply() external view returns (uint256);
}

/// A Transfer from the zero address, conventionally a token issuance.
#[derive(Debug, Clone)]
pub struct MintEvent {
    pub contract: Address,
    pub recipient: Address,
    pub amount: U256,
}

/// A freshly mined contract that passed the ERC-20 conformance probe.
#[derive(Debug, Clone)]
pub struct DeploymentEvent {
    pub contract: Address,
    pub transaction_hash: B256,
}

pub fn decode_transfer_event(log: &Log) -> anyhow::Result<Transfer> {
    let log_data = log.data();
    let decoded = Transfer::decode_raw_log(log.topics(), &log_data.data)?;
    Ok(decoded)
}

/// Returns `Ok(None)` for a well-formed Transfer whose source is not the
/// zero address; only malformed logs produce an error.
pub fn mint_from_log(log: &Log) -> anyhow::Result<Option<MintEvent>> {
    let transfer = decode_transfer_event(log)?;
    if transfer.from != Address::ZERO {
        return Ok(None);
    }
    Ok(Some(MintEvent {
        contract: log.address(),
        recipient: transfer.to,
        amount: transfer.value,
    }))
}

/// A transaction creates a contract iff it has no recipient and carries
/// init code.
pub fn is_contract_creation(to: Option<Address>, input: &Bytes) -> bool {
    to.is_none() && !input.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::LogData;

    fn transfer_log(from: Address, to: Address, value: U256, contract: Address) -> Log {
        let topics = vec![Transfer::SIGNATURE_HASH, from.into_word(), to.into_word()];
        let data = Bytes::from(value.to_be_bytes::<32>().to_vec());
        Log {
            inner: alloy_primitives::Log {
                address: contract,
                data: LogData::new_unchecked(topics, data),
            },
            ..Default::default()
        }
    }

    #[test]
    fn zero_from_transfer_is_a_mint() {
        let contract = Address::repeat_byte(0x11);
        let recipient = Address::repeat_byte(0x22);
        let amount = U256::from(1_000_000_000_000_000_000u128);

        let log = transfer_log(Address::ZERO, recipient, amount, contract);
        let mint = mint_from_log(&log).unwrap().expect("mint expected");

        assert_eq!(mint.contract, contract);
        assert_eq!(mint.recipient, recipient);
        assert_eq!(mint.amount, amount);
    }

    #[test]
    fn nonzero_from_transfer_is_not_a_mint() {
        let log = transfer_log(
            Address::repeat_byte(0x33),
            Address::repeat_byte(0x22),
            U256::from(5u64),
            Address::repeat_byte(0x11),
        );
        assert!(mint_from_log(&log).unwrap().is_none());
    }

    #[test]
    fn malformed_log_is_an_error() {
        let log = Log {
            inner: alloy_primitives::Log {
                address: Address::repeat_byte(0x11),
                data: LogData::new_unchecked(vec![Transfer::SIGNATURE_HASH], Bytes::new()),
            },
            ..Default::default()
        };
        assert!(mint_from_log(&log).is_err());
    }

    #[test]
    fn creation_requires_missing_to_and_init_code() {
        let payload = Bytes::from(vec![0x60, 0x80]);
        assert!(is_contract_creation(None, &payload));
        assert!(!is_contract_creation(Some(Address::repeat_byte(0x01)), &payload));
        assert!(!is_contract_creation(None, &Bytes::new()));
    }
}
