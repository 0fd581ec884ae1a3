//! Storage obligation record shape
//!
//! Values in the obligation bucket are JSON objects keyed by the PascalCase
//! field names below, matched without regard to case. Decoding checks
//! structure only: every field must be present with the right type and
//! encoding, though `null` stands for the field's zero value. Amounts of
//! zero, empty transaction sets and unknown statuses are all accepted.
//!
//! ```text
//! {
//!   "SectorRoots": ["<64 hex>", ...] | null,
//!   "ContractCost": "<integer>",          (x8 currency fields)
//!   "NegotiationHeight": <u64>,
//!   "OriginTransactionSet": [<txn>, ...] | null,
//!   "RevisionTransactionSet": [<txn>, ...] | null,
//!   "ObligationStatus": <u64>,
//!   "OriginConfirmed": <bool>,            (x5 flags)
//! }
//! ```

use super::currency::Currency;
use super::encoding::SectorRoot;
use super::status::ObligationStatus;
use super::transaction::{BlockHeight, Transaction};

schema_struct! {
    /// Accounting entry for one file contract.
    #[derive(Debug, Clone, PartialEq)]
    pub struct StorageObligation (required) {
        /// Merkle roots of every sector stored under the contract, in order
        "SectorRoots" => pub sector_roots: Vec<SectorRoot>,

        "ContractCost" => pub contract_cost: Currency,
        "LockedCollateral" => pub locked_collateral: Currency,
        "PotentialAccountFunding" => pub potential_account_funding: Currency,
        "PotentialDownloadRevenue" => pub potential_download_revenue: Currency,
        "PotentialStorageRevenue" => pub potential_storage_revenue: Currency,
        "PotentialUploadRevenue" => pub potential_upload_revenue: Currency,
        "RiskedCollateral" => pub risked_collateral: Currency,
        "TransactionFeesAdded" => pub transaction_fees_added: Currency,

        "NegotiationHeight" => pub negotiation_height: BlockHeight,
        /// Contract formation transactions, including unconfirmed parents
        "OriginTransactionSet" => pub origin_transaction_set: Vec<Transaction>,
        /// Latest revision transactions, including unconfirmed parents
        "RevisionTransactionSet" => pub revision_transaction_set: Vec<Transaction>,

        "ObligationStatus" => pub obligation_status: ObligationStatus,
        "OriginConfirmed" => pub origin_confirmed: bool,
        "ProofConfirmed" => pub proof_confirmed: bool,
        "ProofConstructed" => pub proof_constructed: bool,
        "RevisionConfirmed" => pub revision_confirmed: bool,
        "RevisionConstructed" => pub revision_constructed: bool,
    }
}

impl StorageObligation {
    /// An obligation with no sectors, zero amounts and empty transaction sets.
    pub fn empty(negotiation_height: BlockHeight) -> Self {
        Self {
            sector_roots: Vec::new(),
            contract_cost: Currency::zero(),
            locked_collateral: Currency::zero(),
            potential_account_funding: Currency::zero(),
            potential_download_revenue: Currency::zero(),
            potential_storage_revenue: Currency::zero(),
            potential_upload_revenue: Currency::zero(),
            risked_collateral: Currency::zero(),
            transaction_fees_added: Currency::zero(),
            negotiation_height,
            origin_transaction_set: Vec::new(),
            revision_transaction_set: Vec::new(),
            obligation_status: ObligationStatus::Unresolved,
            origin_confirmed: false,
            proof_confirmed: false,
            proof_constructed: false,
            revision_confirmed: false,
            revision_constructed: false,
        }
    }
}
