//! Topology fingerprints for design point compatibility.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// What an offdesign run must share with its design point: component
/// labels and kinds, and every connection with its ports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopologySignature {
    pub components: Vec<(String, String)>,
    /// `(label, from, outlet port, to, inlet port)`
    pub connections: Vec<(String, String, usize, String, usize)>,
}

pub fn topology_fingerprint(signature: &TopologySignature) -> String {
    let mut components = signature.components.clone();
    components.sort();
    let mut connections = signature.connections.clone();
    connections.sort();

    let mut hasher = Sha256::new();
    let json = serde_json::to_string(&(components, connections)).unwrap_or_default();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}
