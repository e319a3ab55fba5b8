//! Post-deployment pruning of artifacts whose click-through rate is significantly below target.

pub mod binomial;
