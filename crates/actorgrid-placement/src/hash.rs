//! Name hashing for placement.

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// FNV-1 64-bit: multiply, then xor each byte.
///
/// Placement across releases depends on this exact function; changing it
/// reshuffles every actor in the cluster.
pub fn fnv1_64(s: &str) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in s.bytes() {
        hash = hash.wrapping_mul(FNV_PRIME);
        hash ^= u64::from(byte);
    }
    hash
}

/// Pick `peers[hash(name) % len]`. `peers` must already be sorted.
pub(crate) fn pick<'a>(name: &str, peers: &'a [String]) -> Option<&'a str> {
    if peers.is_empty() {
        return None;
    }
    let idx = fnv1_64(name) % peers.len() as u64;
    Some(peers[idx as usize].as_str())
}
