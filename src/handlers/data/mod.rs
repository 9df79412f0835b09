// handlers/data/mod.rs - Customer and contract records
//
// Plain passthrough to the record store. Guarded by the bearer check only
// when `security.require_auth_for_records` is set.

pub mod contracts;
pub mod customers;
