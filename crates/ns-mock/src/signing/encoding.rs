//! Fixed-width word encoding and the two signed hashes.
//!
//! Every field is one 32-byte big-endian word, the same layout a contract
//! gets from `abi.encodePacked` over `address`/`uint256` values padded to
//! full words.

use ns_crypto::{Address, Hash, Keccak256Hasher};
use primitive_types::U256;

/// Width of one encoded field.
pub const WORD_LENGTH: usize = 32;

/// Signature-type tag folded into every hash.
pub const SIGNATURE_TYPE: u64 = 0;

/// One 32-byte word.
pub type Word = [u8; WORD_LENGTH];

/// Left-pad an address to a word.
pub fn address_word(address: &Address) -> Word {
    let mut word = [0u8; WORD_LENGTH];
    word[WORD_LENGTH - address.len()..].copy_from_slice(address);
    word
}

/// Big-endian word of an unsigned integer.
pub fn uint_word(value: U256) -> Word {
    let mut word = [0u8; WORD_LENGTH];
    value.to_big_endian(&mut word);
    word
}

/// Big-endian word of a `u64`.
pub fn u64_word(value: u64) -> Word {
    uint_word(U256::from(value))
}

/// Hash authorizing `node` on the whitelist contract.
pub fn whitelist_hash(node: &Address, whitelist: &Address, nonce: u64, chain_id: u64) -> Hash {
    let mut hasher = Keccak256Hasher::new();
    hasher
        .update(&address_word(node))
        .update(&address_word(whitelist))
        .update(&u64_word(nonce))
        .update(&u64_word(SIGNATURE_TYPE))
        .update(&u64_word(chain_id));
    hasher.finalize()
}

/// Salt commitment: `keccak(salt || node)`.
pub fn salt_commitment(salt: U256, node: &Address) -> Hash {
    let mut hasher = Keccak256Hasher::new();
    hasher.update(&uint_word(salt)).update(&address_word(node));
    hasher.finalize()
}

/// Inputs of a minipool-deposit hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositSubject {
    pub minipool: Address,
    pub salt: U256,
    pub node: Address,
    pub factory: Address,
    pub nonce: u64,
    pub chain_id: u64,
}

/// Hash authorizing a minipool deposit.
pub fn deposit_hash(subject: &DepositSubject) -> Hash {
    let inner = salt_commitment(subject.salt, &subject.node);
    let mut hasher = Keccak256Hasher::new();
    hasher
        .update(&address_word(&subject.minipool))
        .update(&inner)
        .update(&address_word(&subject.factory))
        .update(&u64_word(subject.nonce))
        .update(&u64_word(SIGNATURE_TYPE))
        .update(&u64_word(subject.chain_id));
    hasher.finalize()
}
