//! iOS 9 overlay (§4.4): the base pack already speaks the iOS 9+ selector
//! list shape and carries no `"error"` webkit filter, so this overlay is a
//! deliberate no-op kept as an explicit version entry point, grounded on
//! `iOS9.go`'s near-empty `Init`.
use crate::rules::RulePack;

pub fn install(_pack: &mut RulePack) {}
