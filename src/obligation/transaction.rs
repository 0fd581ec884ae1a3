//! Transactions in an obligation's origin and revision lineages
//!
//! Every element kind is typed, so an element that the host cannot load back
//! makes the whole record corrupt. Missing keys and `null` values inside a
//! transaction take their zero value.

use super::currency::Currency;
use super::encoding::{Bytes, Hash256, Segment, SiaPublicKey, UnlockHash};

/// Block height at which something happened or becomes valid.
pub type BlockHeight = u64;

schema_struct! {
    /// Spend conditions: time lock, keys and signature threshold.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct UnlockConditions (defaulted) {
        "timelock" => pub timelock: BlockHeight,
        "publickeys" => pub public_keys: Vec<SiaPublicKey>,
        "signaturesrequired" => pub signatures_required: u64,
    }
}

schema_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct SiacoinInput (defaulted) {
        "parentid" => pub parent_id: Hash256,
        "unlockconditions" => pub unlock_conditions: UnlockConditions,
    }
}

schema_struct! {
    /// Coin output created by a transaction.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct SiacoinOutput (defaulted) {
        "value" => pub value: Currency,
        "unlockhash" => pub unlock_hash: UnlockHash,
    }
}

schema_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct FileContract (defaulted) {
        "filesize" => pub file_size: u64,
        "filemerkleroot" => pub file_merkle_root: Hash256,
        "windowstart" => pub window_start: BlockHeight,
        "windowend" => pub window_end: BlockHeight,
        "payout" => pub payout: Currency,
        "validproofoutputs" => pub valid_proof_outputs: Vec<SiacoinOutput>,
        "missedproofoutputs" => pub missed_proof_outputs: Vec<SiacoinOutput>,
        "unlockhash" => pub unlock_hash: UnlockHash,
        "revisionnumber" => pub revision_number: u64,
    }
}

schema_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct FileContractRevision (defaulted) {
        "parentid" => pub parent_id: Hash256,
        "unlockconditions" => pub unlock_conditions: UnlockConditions,
        "newrevisionnumber" => pub new_revision_number: u64,
        "newfilesize" => pub new_file_size: u64,
        "newfilemerkleroot" => pub new_file_merkle_root: Hash256,
        "newwindowstart" => pub new_window_start: BlockHeight,
        "newwindowend" => pub new_window_end: BlockHeight,
        "newvalidproofoutputs" => pub new_valid_proof_outputs: Vec<SiacoinOutput>,
        "newmissedproofoutputs" => pub new_missed_proof_outputs: Vec<SiacoinOutput>,
        "newunlockhash" => pub new_unlock_hash: UnlockHash,
    }
}

schema_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct StorageProof (defaulted) {
        "parentid" => pub parent_id: Hash256,
        "segment" => pub segment: Segment,
        "hashset" => pub hash_set: Vec<Hash256>,
    }
}

schema_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct SiafundInput (defaulted) {
        "parentid" => pub parent_id: Hash256,
        "unlockconditions" => pub unlock_conditions: UnlockConditions,
        "claimunlockhash" => pub claim_unlock_hash: UnlockHash,
    }
}

schema_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct SiafundOutput (defaulted) {
        "value" => pub value: Currency,
        "unlockhash" => pub unlock_hash: UnlockHash,
        "claimstart" => pub claim_start: Currency,
    }
}

schema_struct! {
    /// Indices of the transaction parts a signature commits to.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct CoveredFields (defaulted) {
        "wholetransaction" => pub whole_transaction: bool,
        "siacoininputs" => pub siacoin_inputs: Vec<u64>,
        "siacoinoutputs" => pub siacoin_outputs: Vec<u64>,
        "filecontracts" => pub file_contracts: Vec<u64>,
        "filecontractrevisions" => pub file_contract_revisions: Vec<u64>,
        "storageproofs" => pub storage_proofs: Vec<u64>,
        "siafundinputs" => pub siafund_inputs: Vec<u64>,
        "siafundoutputs" => pub siafund_outputs: Vec<u64>,
        "minerfees" => pub miner_fees: Vec<u64>,
        "arbitrarydata" => pub arbitrary_data: Vec<u64>,
        "transactionsignatures" => pub transaction_signatures: Vec<u64>,
    }
}

schema_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct TransactionSignature (defaulted) {
        "parentid" => pub parent_id: Hash256,
        "publickeyindex" => pub public_key_index: u64,
        "timelock" => pub timelock: BlockHeight,
        "coveredfields" => pub covered_fields: CoveredFields,
        "signature" => pub signature: Bytes,
    }
}

schema_struct! {
    /// One transaction in an origin or revision lineage.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Transaction (defaulted) {
        "siacoininputs" => pub siacoin_inputs: Vec<SiacoinInput>,
        "siacoinoutputs" => pub siacoin_outputs: Vec<SiacoinOutput>,
        "filecontracts" => pub file_contracts: Vec<FileContract>,
        "filecontractrevisions" => pub file_contract_revisions: Vec<FileContractRevision>,
        "storageproofs" => pub storage_proofs: Vec<StorageProof>,
        "siafundinputs" => pub siafund_inputs: Vec<SiafundInput>,
        "siafundoutputs" => pub siafund_outputs: Vec<SiafundOutput>,
        "minerfees" => pub miner_fees: Vec<Currency>,
        "arbitrarydata" => pub arbitrary_data: Vec<Bytes>,
        "transactionsignatures" => pub transaction_signatures: Vec<TransactionSignature>,
    }
}
