//! Process registry and family resolver.
//!
//! Given an application's canonical process name(s), finds the live
//! processes and all transitive descendants, ordered leaves first so that
//! terminating in order never leaves a running child under a dead parent.
//! Everything is recomputed from a fresh process-table snapshot on every
//! call; pids are never cached across switches because the OS may reuse
//! them.

use std::collections::{HashMap, HashSet, VecDeque};

use sysinfo::{ProcessesToUpdate, System};
use tracing::trace;

/// The kernel truncates a process's comm name at 15 bytes on Linux, so a
/// configured name like `emulationstation` shows up as `emulationstatio`.
const COMM_MAX: usize = 15;

/// Ephemeral view of one live process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    pub pid: u32,
    pub ppid: Option<u32>,
    pub name: String,
}

/// Does a live process name match a configured canonical name?
///
/// Exact match, plus the comm-truncation case where the table reports only
/// the first 15 bytes of a longer configured name.
fn name_matches(name: &str, pattern: &str) -> bool {
    if name == pattern {
        return true;
    }
    name.len() == COMM_MAX && pattern.len() > COMM_MAX && pattern.starts_with(name)
}

/// Resolve the process family for `patterns` out of a process-table
/// snapshot: every matching process plus all transitive descendants, with
/// `exclude` pids filtered out of the result, ordered leaves first.
///
/// Zero matches is a valid, non-error result; the application may simply
/// not be running.
#[must_use]
pub fn resolve_family(
    table: &[ProcessHandle],
    patterns: &[String],
    exclude: &[u32],
) -> Vec<ProcessHandle> {
    let mut children: HashMap<u32, Vec<&ProcessHandle>> = HashMap::new();
    let mut by_pid: HashMap<u32, &ProcessHandle> = HashMap::new();
    for handle in table {
        by_pid.insert(handle.pid, handle);
        if let Some(ppid) = handle.ppid {
            children.entry(ppid).or_default().push(handle);
        }
    }

    // Membership first: breadth-first from every matching process. Discovery
    // order survives only as the stable tie-break among equal depths.
    let mut members: Vec<&ProcessHandle> = Vec::new();
    let mut member_pids: HashSet<u32> = HashSet::new();
    let mut queue: VecDeque<&ProcessHandle> = table
        .iter()
        .filter(|h| patterns.iter().any(|p| name_matches(&h.name, p)))
        .collect();
    while let Some(handle) = queue.pop_front() {
        if !member_pids.insert(handle.pid) {
            continue;
        }
        members.push(handle);
        if let Some(kids) = children.get(&handle.pid) {
            queue.extend(kids.iter().copied());
        }
    }

    // Depth comes from actual ancestry within the family, not from BFS
    // discovery: a process that matches a pattern itself can still be the
    // live child of another match (emulationstation spawning retroarch,
    // kodi spawning kodi) and must be signalled before its parent.
    let mut ordered: Vec<(&ProcessHandle, usize)> = members
        .iter()
        .filter(|h| !exclude.contains(&h.pid))
        .map(|&h| (h, ancestors_in_family(h, &member_pids, &by_pid)))
        .collect();
    // Stable by depth, deepest first: children always precede their parent.
    ordered.sort_by(|a, b| b.1.cmp(&a.1));
    ordered.into_iter().map(|(h, _)| h.clone()).collect()
}

/// How many of a process's ancestors are themselves family members. The
/// walk up the ppid chain is bounded by the table size in case a snapshot
/// ever contains a parent cycle.
fn ancestors_in_family(
    handle: &ProcessHandle,
    family: &HashSet<u32>,
    by_pid: &HashMap<u32, &ProcessHandle>,
) -> usize {
    let mut depth = 0;
    let mut cursor = handle.ppid;
    let mut hops = 0;
    while let Some(pid) = cursor {
        hops += 1;
        if hops > by_pid.len() {
            break;
        }
        if family.contains(&pid) {
            depth += 1;
        }
        cursor = by_pid.get(&pid).and_then(|h| h.ppid);
    }
    depth
}

/// Live process-table access.
///
/// A registry instance carries no state; each query takes a fresh snapshot.
#[derive(Debug, Default)]
pub struct ProcessRegistry;

impl ProcessRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Snapshot the current process table.
    #[must_use]
    pub fn snapshot() -> Vec<ProcessHandle> {
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::All, true);
        system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessHandle {
                pid: pid.as_u32(),
                ppid: process.parent().map(|p| p.as_u32()),
                name: process.name().to_string_lossy().into_owned(),
            })
            .collect()
    }

    /// The process family for an application's canonical names, leaves
    /// first. The switcher's own pid and its parent are excluded even if a
    /// broad pattern would match them, so a switch can never terminate the
    /// shell or service that invoked it.
    #[must_use]
    pub fn family(&self, patterns: &[String]) -> Vec<ProcessHandle> {
        let table = Self::snapshot();
        let own_pid = std::process::id();
        let mut exclude = vec![own_pid];
        if let Some(parent) = table
            .iter()
            .find(|h| h.pid == own_pid)
            .and_then(|h| h.ppid)
        {
            exclude.push(parent);
        }
        let family = resolve_family(&table, patterns, &exclude);
        trace!(?patterns, members = family.len(), "resolved process family");
        family
    }

    /// True if any process matching the patterns is visible. Used as the
    /// process-presence readiness probe.
    #[must_use]
    pub fn any_alive(&self, patterns: &[String]) -> bool {
        !self.family(patterns).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(pid: u32, ppid: Option<u32>, name: &str) -> ProcessHandle {
        ProcessHandle {
            pid,
            ppid,
            name: name.to_string(),
        }
    }

    fn patterns(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn zero_matches_is_empty_not_error() {
        let table = vec![handle(1, None, "systemd")];
        assert!(resolve_family(&table, &patterns(&["kodi.bin"]), &[]).is_empty());
    }

    #[test]
    fn descendants_are_included_leaves_first() {
        // kodi(10) -> kodi-x11(11) -> helper(12); unrelated(20)
        let table = vec![
            handle(10, Some(1), "kodi"),
            handle(11, Some(10), "kodi-x11"),
            handle(12, Some(11), "helper"),
            handle(20, Some(1), "unrelated"),
        ];
        let family = resolve_family(&table, &patterns(&["kodi"]), &[]);
        let pids: Vec<u32> = family.iter().map(|h| h.pid).collect();
        assert_eq!(pids, vec![12, 11, 10]);
    }

    #[test]
    fn children_precede_parents_across_multiple_roots() {
        let table = vec![
            handle(10, Some(1), "kodi"),
            handle(30, Some(1), "kodi.bin"),
            handle(11, Some(10), "worker"),
            handle(31, Some(30), "worker"),
        ];
        let family = resolve_family(&table, &patterns(&["kodi", "kodi.bin"]), &[]);
        let pids: Vec<u32> = family.iter().map(|h| h.pid).collect();
        // Both workers (depth 1) come before both roots (depth 0).
        assert_eq!(&pids[..2], &[11, 31]);
        assert_eq!(&pids[2..], &[10, 30]);
    }

    #[test]
    fn excluded_pids_never_appear_even_when_matched() {
        let table = vec![
            handle(10, Some(1), "kodi"),
            handle(11, Some(10), "kodi"),
        ];
        let family = resolve_family(&table, &patterns(&["kodi"]), &[10]);
        let pids: Vec<u32> = family.iter().map(|h| h.pid).collect();
        assert_eq!(pids, vec![11]);
    }

    #[test]
    fn matched_descendant_is_not_duplicated() {
        // Child matches the pattern AND is a descendant of a matching root.
        let table = vec![
            handle(10, Some(1), "kodi"),
            handle(11, Some(10), "kodi"),
        ];
        let family = resolve_family(&table, &patterns(&["kodi"]), &[]);
        let pids: Vec<u32> = family.iter().map(|h| h.pid).collect();
        assert_eq!(pids, vec![11, 10]);
    }

    #[test]
    fn matched_child_still_precedes_its_matched_parent() {
        // Both names configured, and one is a live child of the other. The
        // child must be signalled first even though it matched a pattern in
        // its own right rather than being discovered as a descendant.
        let table = vec![
            handle(10, Some(1), "emulationstatio"),
            handle(11, Some(10), "retroarch"),
        ];
        let family = resolve_family(
            &table,
            &patterns(&["emulationstation", "retroarch"]),
            &[],
        );
        let pids: Vec<u32> = family.iter().map(|h| h.pid).collect();
        assert_eq!(pids, vec![11, 10]);
    }

    #[test]
    fn ancestry_depth_orders_a_matched_chain() {
        // Three generations, every one of them matching. Leaves-first must
        // hold across the whole chain regardless of snapshot order.
        let table = vec![
            handle(12, Some(11), "kodi"),
            handle(10, Some(1), "kodi"),
            handle(11, Some(10), "kodi"),
        ];
        let family = resolve_family(&table, &patterns(&["kodi"]), &[]);
        let pids: Vec<u32> = family.iter().map(|h| h.pid).collect();
        assert_eq!(pids, vec![12, 11, 10]);
    }

    #[test]
    fn comm_truncation_matches_long_names() {
        let table = vec![handle(10, Some(1), "emulationstatio")];
        let family = resolve_family(&table, &patterns(&["emulationstation"]), &[]);
        assert_eq!(family.len(), 1);
        // But a short table name must not match a shorter pattern prefix.
        let table = vec![handle(10, Some(1), "kodi-x11")];
        assert!(resolve_family(&table, &patterns(&["kodi"]), &[]).is_empty());
    }

    #[test]
    fn own_process_is_excluded_from_live_lookup() {
        // Match our own process name against the live table; the resolver
        // must filter the test runner's pid out.
        let own_pid = std::process::id();
        let table = ProcessRegistry::snapshot();
        let own_name = table
            .iter()
            .find(|h| h.pid == own_pid)
            .map(|h| h.name.clone())
            .expect("own process visible in snapshot");

        let registry = ProcessRegistry::new();
        let family = registry.family(&[own_name]);
        assert!(family.iter().all(|h| h.pid != own_pid));
    }
}
