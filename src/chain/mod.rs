//! Region-aware node pairing engine.
//!
//! # Data Flow
//! ```text
//! ChainConfig (nodes + groups, indexed by name)
//!     → pairing.rs (landing detection, per node)
//!         → region.rs (classify name → region ids)
//!         → resolver.rs (region → front group, else single bare node)
//!     → Vec<PairCandidate>          (suggestions for an operator)
//!
//! Vec<PairCandidate> (manual or suggested)
//!     → applier.rs (set dialer-proxy, drop landing from front group)
//!     → mutated ChainConfig + ApplyReport
//!
//! Every step appends to an OperationLog returned to the caller.
//! ```
//!
//! # Design Decisions
//! - Pure, request-scoped computation; no shared mutable state
//! - Region table and landing keywords are passed in, never global
//! - Names are the only references between entities

pub mod applier;
pub mod keyword;
pub mod model;
pub mod oplog;
pub mod pairing;
pub mod region;
pub mod resolver;

pub use applier::{apply_pairs, ApplyReport};
pub use keyword::Keyword;
pub use model::{ChainConfig, PairCandidate, ProxyGroup, ProxyNode};
pub use oplog::{LogEntry, LogLevel, OperationLog};
pub use pairing::auto_detect;
pub use region::{classify, PairingRules, RegionDefinition, RegionSpec};
pub use resolver::{resolve_front, Resolution};
