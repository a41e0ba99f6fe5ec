#[path = "property/chain_order.rs"]
mod chain_order;

#[path = "property/tamper_isolation.rs"]
mod tamper_isolation;
