//! Representative submissions from each built-in source.
//!
//! Shapes follow what the upstream teams actually send: team_a uses
//! near-canonical names, team_b capitalised names with RAM strings, team_c
//! inconsistent OS keys, CPU lists, and memory in KiB.

use serde_json::{json, Value};

pub fn team_a_batch() -> Value {
    json!([
        {"os": "Ubuntu 20.04", "cpu_model": "Xeon E5", "memory_gb": 64},
        {"os": "Ubuntu 22.04", "cpu_model": "Xeon Gold", "memory_gb": "128"}
    ])
}

pub fn team_b_batch() -> Value {
    json!([
        {"OperatingSystem": "Debian 12", "CPU": "Ryzen 7", "RAM": "32 GB"},
        {"OperatingSystem": "Ubuntu 22.04", "CPU": "Intel i9", "RAM": "16 GB"}
    ])
}

pub fn team_c_batch() -> Value {
    json!([
        {"osName": "CentOS 7", "processor": "Xeon", "mem": 32768},
        {"OSName": "Fedora 34", "processor": "Core i5", "mem": 16384},
        {"OSName": "Windows Server 2022", "processor": ["Xeon Platinum", "Xeon Platinum"], "mem": 262144}
    ])
}

/// A team_b batch mixing every outcome: two good items, a bad RAM string,
/// a non-object, and an item without os.
pub fn team_b_mixed_batch() -> Value {
    json!([
        {"OperatingSystem": "Debian 12", "CPU": "Intel i7", "RAM": "16 GB"},
        {"operatingsystem": "Ubuntu 22.04", "cpu": "Ryzen 7", "ram": 32},
        {"OperatingSystem": "Alpine 3.19", "CPU": "ARM", "RAM": "bad"},
        42,
        {"CPU": "Xeon", "RAM": "8 GB"}
    ])
}

/// `n` synthetic team_a items, every tenth one missing its cpu.
pub fn team_a_corpus(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            if i % 10 == 9 {
                json!({"os": format!("Ubuntu {}.04", 18 + i % 3 * 2), "memory_gb": 8})
            } else {
                json!({
                    "os": format!("Ubuntu {}.04", 18 + i % 3 * 2),
                    "cpu_model": format!("Xeon E{}", i % 7),
                    "memory_gb": (i % 16 + 1) * 8,
                })
            }
        })
        .collect()
}
