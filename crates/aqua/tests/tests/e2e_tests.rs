#[path = "e2e/sign_and_witness.rs"]
mod sign_and_witness;

#[path = "e2e/linking.rs"]
mod linking;

#[path = "e2e/deep_links.rs"]
mod deep_links;

#[path = "e2e/tree_integrity.rs"]
mod tree_integrity;
