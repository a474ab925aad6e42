//! Protocol epochs. Ordering gates opcode availability, gas-cost variants, and
//! warm/cold access-list rules throughout the engine.

/// A totally ordered enumeration of Ethereum protocol upgrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Revision {
    Frontier,
    Homestead,
    Tangerine,
    Spurious,
    Byzantium,
    Constantinople,
    Petersburg,
    Istanbul,
    Berlin,
    London,
    Paris,
    Shanghai,
    Cancun,
    Prague,
}

impl Revision {
    pub const LATEST: Revision = Revision::Prague;

    pub fn at_least(self, other: Revision) -> bool {
        self >= other
    }

    /// EIP-2929 access lists (cold/warm surcharges) apply from Berlin onward.
    pub fn has_access_lists(self) -> bool {
        self.at_least(Revision::Berlin)
    }

    /// EIP-3529 caps and shrinks SSTORE/SELFDESTRUCT refunds from London onward.
    pub fn has_reduced_refunds(self) -> bool {
        self.at_least(Revision::London)
    }

    /// EIP-3860 initcode word cost and size cap, from Shanghai onward.
    pub fn has_initcode_cost(self) -> bool {
        self.at_least(Revision::Shanghai)
    }

    /// EIP-1153 transient storage (TLOAD/TSTORE), from Cancun onward.
    pub fn has_transient_storage(self) -> bool {
        self.at_least(Revision::Cancun)
    }

    /// EIP-5656 MCOPY, from Cancun onward.
    pub fn has_mcopy(self) -> bool {
        self.at_least(Revision::Cancun)
    }

    /// EIP-4844 BLOBHASH/BLOBBASEFEE, from Cancun onward.
    pub fn has_blob_opcodes(self) -> bool {
        self.at_least(Revision::Cancun)
    }

    /// PUSH0, from Shanghai onward (EIP-3855).
    pub fn has_push0(self) -> bool {
        self.at_least(Revision::Shanghai)
    }

    /// Contract size limit (EIP-170), from Spurious Dragon onward.
    pub fn has_max_code_size(self) -> bool {
        self.at_least(Revision::Spurious)
    }

    /// PREVRANDAO replaces DIFFICULTY's meaning from Paris (the Merge) onward.
    pub fn has_prevrandao(self) -> bool {
        self.at_least(Revision::Paris)
    }
}
