//! Shapes of the phase0 consensus containers.
//!
//! https://github.com/ethereum/consensus-specs/blob/dev/specs/phase0/beacon-chain.md

use crate::preset::{Preset, DEPOSIT_CONTRACT_TREE_DEPTH, JUSTIFICATION_BITS_LENGTH};
use ssz_codec::SszType;

/// Every container name this module can build, in declaration order.
pub const TYPE_NAMES: &[&str] = &[
    "Fork",
    "ForkData",
    "Checkpoint",
    "Validator",
    "AttestationData",
    "IndexedAttestation",
    "PendingAttestation",
    "Eth1Data",
    "Eth1Block",
    "HistoricalBatch",
    "DepositMessage",
    "DepositData",
    "BeaconBlockHeader",
    "SignedBeaconBlockHeader",
    "SigningData",
    "ProposerSlashing",
    "AttesterSlashing",
    "Attestation",
    "Deposit",
    "VoluntaryExit",
    "SignedVoluntaryExit",
    "BeaconBlockBody",
    "BeaconBlock",
    "SignedBeaconBlock",
    "AggregateAndProof",
    "SignedAggregateAndProof",
    "BeaconState",
];

/// Returns the shape of the container called `name`, or `None` if it is not a phase0 container.
pub fn type_by_name(name: &str, preset: &Preset) -> Option<SszType> {
    Some(match name {
        "Fork" => fork(),
        "ForkData" => fork_data(),
        "Checkpoint" => checkpoint(),
        "Validator" => validator(),
        "AttestationData" => attestation_data(),
        "IndexedAttestation" => indexed_attestation(preset),
        "PendingAttestation" => pending_attestation(preset),
        "Eth1Data" => eth1_data(),
        "Eth1Block" => eth1_block(),
        "HistoricalBatch" => historical_batch(preset),
        "DepositMessage" => deposit_message(),
        "DepositData" => deposit_data(),
        "BeaconBlockHeader" => beacon_block_header(),
        "SignedBeaconBlockHeader" => signed_beacon_block_header(),
        "SigningData" => signing_data(),
        "ProposerSlashing" => proposer_slashing(),
        "AttesterSlashing" => attester_slashing(preset),
        "Attestation" => attestation(preset),
        "Deposit" => deposit(),
        "VoluntaryExit" => voluntary_exit(),
        "SignedVoluntaryExit" => signed_voluntary_exit(),
        "BeaconBlockBody" => beacon_block_body(preset),
        "BeaconBlock" => beacon_block(preset),
        "SignedBeaconBlock" => signed_beacon_block(preset),
        "AggregateAndProof" => aggregate_and_proof(preset),
        "SignedAggregateAndProof" => signed_aggregate_and_proof(preset),
        "BeaconState" => beacon_state(preset),
        _ => return None,
    })
}

// Aliases used throughout the consensus containers.

pub fn slot() -> SszType {
    SszType::uint64()
}

pub fn epoch() -> SszType {
    SszType::uint64()
}

pub fn gwei() -> SszType {
    SszType::uint64()
}

pub fn validator_index() -> SszType {
    SszType::uint64()
}

pub fn root() -> SszType {
    SszType::byte_vector(32)
}

pub fn version() -> SszType {
    SszType::byte_vector(4)
}

pub fn bls_pubkey() -> SszType {
    SszType::byte_vector(48)
}

pub fn bls_signature() -> SszType {
    SszType::byte_vector(96)
}

pub fn fork() -> SszType {
    SszType::container([
        ("previous_version", version()),
        ("current_version", version()),
        ("epoch", epoch()),
    ])
}

pub fn fork_data() -> SszType {
    SszType::container([
        ("current_version", version()),
        ("genesis_validators_root", root()),
    ])
}

pub fn checkpoint() -> SszType {
    SszType::container([("epoch", epoch()), ("root", root())])
}

pub fn validator() -> SszType {
    SszType::container([
        ("pubkey", bls_pubkey()),
        ("withdrawal_credentials", root()),
        ("effective_balance", gwei()),
        ("slashed", SszType::Bool),
        ("activation_eligibility_epoch", epoch()),
        ("activation_epoch", epoch()),
        ("exit_epoch", epoch()),
        ("withdrawable_epoch", epoch()),
    ])
}

pub fn attestation_data() -> SszType {
    SszType::container([
        ("slot", slot()),
        ("index", SszType::uint64()),
        ("beacon_block_root", root()),
        ("source", checkpoint()),
        ("target", checkpoint()),
    ])
}

pub fn indexed_attestation(preset: &Preset) -> SszType {
    SszType::container([
        (
            "attesting_indices",
            SszType::list(validator_index(), preset.max_validators_per_committee),
        ),
        ("data", attestation_data()),
        ("signature", bls_signature()),
    ])
}

pub fn pending_attestation(preset: &Preset) -> SszType {
    SszType::container([
        (
            "aggregation_bits",
            SszType::bitlist(preset.max_validators_per_committee),
        ),
        ("data", attestation_data()),
        ("inclusion_delay", slot()),
        ("proposer_index", validator_index()),
    ])
}

pub fn eth1_data() -> SszType {
    SszType::container([
        ("deposit_root", root()),
        ("deposit_count", SszType::uint64()),
        ("block_hash", root()),
    ])
}

pub fn eth1_block() -> SszType {
    SszType::container([
        ("timestamp", SszType::uint64()),
        ("deposit_root", root()),
        ("deposit_count", SszType::uint64()),
    ])
}

pub fn historical_batch(preset: &Preset) -> SszType {
    SszType::container([
        (
            "block_roots",
            SszType::vector(root(), preset.slots_per_historical_root),
        ),
        (
            "state_roots",
            SszType::vector(root(), preset.slots_per_historical_root),
        ),
    ])
}

pub fn deposit_message() -> SszType {
    SszType::container([
        ("pubkey", bls_pubkey()),
        ("withdrawal_credentials", root()),
        ("amount", gwei()),
    ])
}

pub fn deposit_data() -> SszType {
    SszType::container([
        ("pubkey", bls_pubkey()),
        ("withdrawal_credentials", root()),
        ("amount", gwei()),
        ("signature", bls_signature()),
    ])
}

pub fn beacon_block_header() -> SszType {
    SszType::container([
        ("slot", slot()),
        ("proposer_index", validator_index()),
        ("parent_root", root()),
        ("state_root", root()),
        ("body_root", root()),
    ])
}

pub fn signed_beacon_block_header() -> SszType {
    signed(beacon_block_header())
}

pub fn signing_data() -> SszType {
    SszType::container([("object_root", root()), ("domain", root())])
}

pub fn proposer_slashing() -> SszType {
    SszType::container([
        ("signed_header_1", signed_beacon_block_header()),
        ("signed_header_2", signed_beacon_block_header()),
    ])
}

pub fn attester_slashing(preset: &Preset) -> SszType {
    SszType::container([
        ("attestation_1", indexed_attestation(preset)),
        ("attestation_2", indexed_attestation(preset)),
    ])
}

pub fn attestation(preset: &Preset) -> SszType {
    SszType::container([
        (
            "aggregation_bits",
            SszType::bitlist(preset.max_validators_per_committee),
        ),
        ("data", attestation_data()),
        ("signature", bls_signature()),
    ])
}

pub fn deposit() -> SszType {
    SszType::container([
        (
            "proof",
            SszType::vector(root(), DEPOSIT_CONTRACT_TREE_DEPTH + 1),
        ),
        ("data", deposit_data()),
    ])
}

pub fn voluntary_exit() -> SszType {
    SszType::container([("epoch", epoch()), ("validator_index", validator_index())])
}

pub fn signed_voluntary_exit() -> SszType {
    signed(voluntary_exit())
}

pub fn beacon_block_body(preset: &Preset) -> SszType {
    SszType::container([
        ("randao_reveal", bls_signature()),
        ("eth1_data", eth1_data()),
        ("graffiti", root()),
        (
            "proposer_slashings",
            SszType::list(proposer_slashing(), preset.max_proposer_slashings),
        ),
        (
            "attester_slashings",
            SszType::list(attester_slashing(preset), preset.max_attester_slashings),
        ),
        (
            "attestations",
            SszType::list(attestation(preset), preset.max_attestations),
        ),
        ("deposits", SszType::list(deposit(), preset.max_deposits)),
        (
            "voluntary_exits",
            SszType::list(signed_voluntary_exit(), preset.max_voluntary_exits),
        ),
    ])
}

pub fn beacon_block(preset: &Preset) -> SszType {
    SszType::container([
        ("slot", slot()),
        ("proposer_index", validator_index()),
        ("parent_root", root()),
        ("state_root", root()),
        ("body", beacon_block_body(preset)),
    ])
}

pub fn signed_beacon_block(preset: &Preset) -> SszType {
    signed(beacon_block(preset))
}

pub fn aggregate_and_proof(preset: &Preset) -> SszType {
    SszType::container([
        ("aggregator_index", validator_index()),
        ("aggregate", attestation(preset)),
        ("selection_proof", bls_signature()),
    ])
}

pub fn signed_aggregate_and_proof(preset: &Preset) -> SszType {
    signed(aggregate_and_proof(preset))
}

pub fn beacon_state(preset: &Preset) -> SszType {
    SszType::container([
        // Versioning
        ("genesis_time", SszType::uint64()),
        ("genesis_validators_root", root()),
        ("slot", slot()),
        ("fork", fork()),
        // History
        ("latest_block_header", beacon_block_header()),
        (
            "block_roots",
            SszType::vector(root(), preset.slots_per_historical_root),
        ),
        (
            "state_roots",
            SszType::vector(root(), preset.slots_per_historical_root),
        ),
        (
            "historical_roots",
            SszType::list(root(), preset.historical_roots_limit),
        ),
        // Eth1
        ("eth1_data", eth1_data()),
        (
            "eth1_data_votes",
            SszType::list(eth1_data(), preset.eth1_data_votes_limit()),
        ),
        ("eth1_deposit_index", SszType::uint64()),
        // Registry
        (
            "validators",
            SszType::list(validator(), preset.validator_registry_limit),
        ),
        (
            "balances",
            SszType::list(gwei(), preset.validator_registry_limit),
        ),
        // Randomness
        (
            "randao_mixes",
            SszType::vector(root(), preset.epochs_per_historical_vector),
        ),
        // Slashings
        (
            "slashings",
            SszType::vector(gwei(), preset.epochs_per_slashings_vector),
        ),
        // Attestations
        (
            "previous_epoch_attestations",
            SszType::list(
                pending_attestation(preset),
                preset.pending_attestations_limit(),
            ),
        ),
        (
            "current_epoch_attestations",
            SszType::list(
                pending_attestation(preset),
                preset.pending_attestations_limit(),
            ),
        ),
        // Finality
        (
            "justification_bits",
            SszType::bitvector(JUSTIFICATION_BITS_LENGTH),
        ),
        ("previous_justified_checkpoint", checkpoint()),
        ("current_justified_checkpoint", checkpoint()),
        ("finalized_checkpoint", checkpoint()),
    ])
}

/// A `message` paired with a BLS `signature` over it.
fn signed(message: SszType) -> SszType {
    SszType::container([("message", message), ("signature", bls_signature())])
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn every_name_resolves() {
        for preset in [Preset::mainnet(), Preset::minimal()] {
            for name in TYPE_NAMES {
                assert!(type_by_name(name, &preset).is_some(), "{}", name);
            }
        }
        assert_eq!(type_by_name("BlobSidecar", &Preset::mainnet()), None);
    }

    #[test]
    fn fixed_sizes() {
        assert_eq!(checkpoint().ssz_fixed_len(), 40);
        assert_eq!(fork().ssz_fixed_len(), 16);
        assert_eq!(validator().ssz_fixed_len(), 121);
        assert_eq!(attestation_data().ssz_fixed_len(), 128);
        assert_eq!(beacon_block_header().ssz_fixed_len(), 112);
        assert_eq!(signed_beacon_block_header().ssz_fixed_len(), 208);
        assert_eq!(deposit().ssz_fixed_len(), 33 * 32 + 184);
        assert!(!attestation(&Preset::mainnet()).is_ssz_fixed_len());
        assert!(!beacon_state(&Preset::minimal()).is_ssz_fixed_len());
    }

    #[test]
    fn historical_batch_is_sized_by_preset() {
        assert_eq!(
            historical_batch(&Preset::minimal()).ssz_fixed_len(),
            2 * 64 * 32
        );
        assert_eq!(
            historical_batch(&Preset::mainnet()).ssz_fixed_len(),
            2 * 8192 * 32
        );
    }
}
