// Combat system
//
// Weapon arming, hit deduplication, strike/clash/execute resolution and the
// events they report.

pub mod events;
pub mod ledger;
pub mod resolver;
pub mod weapon;

pub use events::{CombatEvent, LockReleaseReason};
pub use ledger::HitLedger;
pub use resolver::{execute, resolve_clash, resolve_strike, StrikeOutcome, StrikeRejection};
pub use weapon::{AttackStateKind, AttackWindow, WeaponState};
