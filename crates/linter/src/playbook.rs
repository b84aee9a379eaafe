//! Playbook shape helpers: play/task discovery and keyword tables.

use playlint_syntax::{Document, NodeRef};

/// Task-level keywords understood by the runtime; any other top-level task
/// key is the action (module reference).
pub const TASK_KEYWORDS: &[&str] = &[
    "name",
    "action",
    "args",
    "vars",
    "when",
    "tags",
    "register",
    "loop",
    "loop_control",
    "until",
    "retries",
    "delay",
    "notify",
    "listen",
    "delegate_to",
    "delegate_facts",
    "become",
    "become_user",
    "become_method",
    "environment",
    "changed_when",
    "failed_when",
    "ignore_errors",
    "no_log",
    "run_once",
    "check_mode",
    "diff",
    "throttle",
    "timeout",
    "any_errors_fatal",
    "collections",
    "module_defaults",
    "local_action",
    "block",
    "rescue",
    "always",
];

/// Mapping keys whose sequence values contain tasks.
pub const TASK_LIST_KEYS: &[&str] = &[
    "tasks",
    "pre_tasks",
    "post_tasks",
    "handlers",
    "block",
    "rescue",
    "always",
];

#[must_use]
pub fn is_task_keyword(key: &str) -> bool {
    TASK_KEYWORDS.contains(&key) || key.starts_with("with_")
}

/// A play: a mapping item of the root sequence that targets hosts.
#[must_use]
pub fn is_play(node: NodeRef<'_>) -> bool {
    node.is_mapping()
        && node.get("hosts").is_some()
        && node
            .parent()
            .is_some_and(|p| p.is_sequence() && p.parent().is_none())
}

/// A task: a mapping inside a task-list sequence, or an item of a root
/// sequence that is not a play (tasks-file layout).
#[must_use]
pub fn is_task(node: NodeRef<'_>) -> bool {
    if !node.is_mapping() {
        return false;
    }
    let Some(parent) = node.parent() else {
        return false;
    };
    if !parent.is_sequence() {
        return false;
    }
    match parent.key() {
        Some(key) => TASK_LIST_KEYS.contains(&key),
        // Root sequence: tasks file unless the item targets hosts.
        None => parent.parent().is_none() && node.get("hosts").is_none(),
    }
}

/// A handler: a task under a `handlers` section.
#[must_use]
pub fn is_handler(node: NodeRef<'_>) -> bool {
    is_task(node) && node.parent().and_then(|p| p.key()) == Some("handlers")
}

/// All plays in document order.
#[must_use]
pub fn plays(doc: &Document) -> Vec<NodeRef<'_>> {
    doc.nodes().filter(|n| is_play(*n)).collect()
}

/// All tasks (including handlers and nested block tasks) in document order.
#[must_use]
pub fn tasks(doc: &Document) -> Vec<NodeRef<'_>> {
    doc.nodes().filter(|n| is_task(*n)).collect()
}

/// The task's action: the first entry whose key is not a task keyword.
/// Block wrapper tasks have no action.
#[must_use]
pub fn action_of<'a>(task: NodeRef<'a>) -> Option<(&'a str, NodeRef<'a>)> {
    task.entries().find(|(key, _)| !is_task_keyword(key))
}

/// The task's `name` value, if present and a non-empty string.
#[must_use]
pub fn task_name<'a>(task: NodeRef<'a>) -> Option<&'a str> {
    task.get("name")?.as_str().filter(|s| !s.is_empty())
}
