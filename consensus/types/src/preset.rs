use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Value-level representation of the consensus constants that size the phase0 containers.
///
/// Field names follow the upper-case keys of the `phase0.yaml` preset files, so a preset file
/// can be deserialized directly (unknown keys are ignored).
///
/// https://github.com/ethereum/consensus-specs/blob/dev/presets/mainnet/phase0.yaml
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Preset {
    pub slots_per_epoch: usize,
    pub max_validators_per_committee: usize,
    pub slots_per_historical_root: usize,
    pub epochs_per_historical_vector: usize,
    pub epochs_per_slashings_vector: usize,
    pub epochs_per_eth1_voting_period: usize,
    pub historical_roots_limit: usize,
    pub validator_registry_limit: usize,
    pub max_proposer_slashings: usize,
    pub max_attester_slashings: usize,
    pub max_attestations: usize,
    pub max_deposits: usize,
    pub max_voluntary_exits: usize,
}

/// Constants fixed across presets.
pub const DEPOSIT_CONTRACT_TREE_DEPTH: usize = 32;
pub const JUSTIFICATION_BITS_LENGTH: usize = 4;

impl Preset {
    pub fn mainnet() -> Self {
        Self {
            slots_per_epoch: 32,
            max_validators_per_committee: 2048,
            slots_per_historical_root: 8192,
            epochs_per_historical_vector: 65_536,
            epochs_per_slashings_vector: 8192,
            epochs_per_eth1_voting_period: 64,
            historical_roots_limit: 16_777_216,
            validator_registry_limit: 1_099_511_627_776,
            max_proposer_slashings: 16,
            max_attester_slashings: 2,
            max_attestations: 128,
            max_deposits: 16,
            max_voluntary_exits: 16,
        }
    }

    pub fn minimal() -> Self {
        Self {
            slots_per_epoch: 8,
            slots_per_historical_root: 64,
            epochs_per_historical_vector: 64,
            epochs_per_slashings_vector: 64,
            epochs_per_eth1_voting_period: 4,
            ..Self::mainnet()
        }
    }

    /// The limit of `BeaconState.eth1_data_votes`.
    pub fn eth1_data_votes_limit(&self) -> usize {
        self.epochs_per_eth1_voting_period * self.slots_per_epoch
    }

    /// The limit of the pending attestation lists in `BeaconState`.
    pub fn pending_attestations_limit(&self) -> usize {
        self.max_attestations * self.slots_per_epoch
    }
}

/// The presets for which test vectors are published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetName {
    Mainnet,
    Minimal,
}

impl PresetName {
    pub fn list_all() -> Vec<PresetName> {
        vec![PresetName::Mainnet, PresetName::Minimal]
    }

    pub fn preset(self) -> Preset {
        match self {
            PresetName::Mainnet => Preset::mainnet(),
            PresetName::Minimal => Preset::minimal(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PresetName::Mainnet => "mainnet",
            PresetName::Minimal => "minimal",
        }
    }
}

impl FromStr for PresetName {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, String> {
        Ok(match name {
            "mainnet" => PresetName::Mainnet,
            "minimal" => PresetName::Minimal,
            other => return Err(format!("unknown preset: {}", other)),
        })
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names_round_trip() {
        for name in PresetName::list_all() {
            assert_eq!(name.to_string().parse::<PresetName>(), Ok(name));
        }
        assert!("gnosis".parse::<PresetName>().is_err());
    }

    #[test]
    fn minimal_differs_from_mainnet() {
        let minimal = PresetName::Minimal.preset();
        assert_eq!(minimal.slots_per_epoch, 8);
        assert_eq!(minimal.eth1_data_votes_limit(), 32);
        assert_eq!(minimal.validator_registry_limit, 1 << 40);
        assert_eq!(Preset::mainnet().eth1_data_votes_limit(), 2048);
        assert_eq!(Preset::mainnet().pending_attestations_limit(), 4096);
    }

    #[test]
    fn parses_preset_yaml() {
        // Excerpt of `presets/minimal/phase0.yaml`.
        let yaml = "
MAX_COMMITTEES_PER_SLOT: 4
TARGET_COMMITTEE_SIZE: 4
MAX_VALIDATORS_PER_COMMITTEE: 2048
SHUFFLE_ROUND_COUNT: 10
SLOTS_PER_EPOCH: 8
EPOCHS_PER_ETH1_VOTING_PERIOD: 4
SLOTS_PER_HISTORICAL_ROOT: 64
EPOCHS_PER_HISTORICAL_VECTOR: 64
EPOCHS_PER_SLASHINGS_VECTOR: 64
HISTORICAL_ROOTS_LIMIT: 16777216
VALIDATOR_REGISTRY_LIMIT: 1099511627776
MAX_PROPOSER_SLASHINGS: 16
MAX_ATTESTER_SLASHINGS: 2
MAX_ATTESTATIONS: 128
MAX_DEPOSITS: 16
MAX_VOLUNTARY_EXITS: 16
";
        let preset: Preset = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(preset, Preset::minimal());
    }
}
