//! End-to-end switch scenarios against real processes.
//!
//! Real binaries are copied into a tempdir under application-specific names
//! so the family resolver can tell the apps apart by process name.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use seatswitch_core::ApplicationDescriptor;
use seatswitch_runtime::{Orchestrator, ProcessRegistry, ProcessSeatStrategy, Systemctl};

fn find_binary(name: &str) -> PathBuf {
    for dir in ["/bin", "/usr/bin"] {
        let candidate = Path::new(dir).join(name);
        if candidate.exists() {
            return candidate;
        }
    }
    panic!("{name} not found in /bin or /usr/bin");
}

fn install_as(dir: &Path, source: &Path, name: &str) -> PathBuf {
    let target = dir.join(name);
    std::fs::copy(source, &target).expect("copy binary");
    std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o755))
        .expect("make executable");
    target
}

fn sleeper_app(id: &str, program: &Path) -> ApplicationDescriptor {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "process_names": [id],
        "launch": { "spawn": { "program": program.to_str().unwrap(), "args": ["300"] } },
        "grace_secs": 3,
        "force_secs": 2,
        "settle_ms": 500
    }))
    .expect("descriptor")
}

fn orchestrator(apps: Vec<ApplicationDescriptor>) -> Orchestrator {
    Orchestrator::new(
        apps,
        Arc::new(ProcessSeatStrategy::new(Systemctl::default())),
    )
}

#[tokio::test]
async fn switching_leaves_exactly_the_target_running() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sleep_bin = find_binary("sleep");
    let alpha_bin = install_as(dir.path(), &sleep_bin, "alphaseat");
    let beta_bin = install_as(dir.path(), &sleep_bin, "betaseat");

    let orch = orchestrator(vec![
        sleeper_app("alphaseat", &alpha_bin),
        sleeper_app("betaseat", &beta_bin),
    ]);
    let registry = ProcessRegistry::new();

    let first = orch.switch("alphaseat").await.expect("first switch");
    assert!(first.is_running(), "alpha not observed: {:?}", first.outcome);
    assert!(registry.any_alive(&["alphaseat".to_string()]));

    let second = orch.switch("betaseat").await.expect("second switch");
    assert!(second.is_running(), "beta not observed: {:?}", second.outcome);
    assert!(second.survivors.is_empty());
    assert!(!registry.any_alive(&["alphaseat".to_string()]));
    assert!(registry.any_alive(&["betaseat".to_string()]));

    orch.stop("betaseat").await.expect("cleanup stop");
    assert!(!registry.any_alive(&["betaseat".to_string()]));
}

#[tokio::test]
async fn whole_process_family_is_terminated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sh_bin = find_binary("sh");
    let sleep_bin = find_binary("sleep");
    let gamma_bin = install_as(dir.path(), &sh_bin, "gammaseat");
    let delta_bin = install_as(dir.path(), &sleep_bin, "deltaseat");

    // Two commands force the shell to fork rather than exec, giving a
    // parent named gammaseat with a sleep child.
    let gamma: ApplicationDescriptor = serde_json::from_value(serde_json::json!({
        "id": "gammaseat",
        "process_names": ["gammaseat"],
        "launch": { "spawn": {
            "program": gamma_bin.to_str().unwrap(),
            "args": ["-c", "sleep 300; sleep 300"]
        } },
        "grace_secs": 3,
        "force_secs": 2,
        "settle_ms": 500
    }))
    .unwrap();

    let orch = orchestrator(vec![gamma, sleeper_app("deltaseat", &delta_bin)]);
    let registry = ProcessRegistry::new();

    let launched = orch.switch("gammaseat").await.expect("launch gamma");
    assert!(launched.is_running());
    let family = registry.family(&["gammaseat".to_string()]);
    assert!(
        family.len() >= 2,
        "expected shell and its sleep child, got {family:?}"
    );

    let switched = orch.switch("deltaseat").await.expect("switch to delta");
    assert!(switched.is_running());
    assert!(switched.survivors.is_empty());
    // Parent and child are both gone.
    assert!(registry.family(&["gammaseat".to_string()]).is_empty());

    orch.stop("deltaseat").await.expect("cleanup stop");
}
