//! Builds reply forests from flat comment lists.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::ThreadNode;
use crate::comment::{Comment, CommentId};

/// Sibling order: newest first, larger id first on equal timestamps.
pub fn newest_first(a: &Comment, b: &Comment) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// Reply order: oldest first, smaller id first on equal timestamps.
pub fn oldest_first(a: &Comment, b: &Comment) -> Ordering {
    newest_first(b, a)
}

/// Assembles the comments of one target into an ordered forest.
///
/// A comment becomes a child of its parent whenever the parent is part of
/// `comments`; a reply whose parent is missing (another target, a stale
/// reference) is kept as a root. Parent links that loop back on themselves
/// can only come from corrupted rows: the member of each loop with the
/// smallest id is cut loose and becomes a root. Every input comment appears
/// exactly once in the output and every sibling list is ordered by
/// [`newest_first`].
pub fn assemble(comments: Vec<Comment>) -> Vec<ThreadNode> {
    let len = comments.len();

    let mut index: HashMap<CommentId, usize> = HashMap::with_capacity(len);
    for (position, comment) in comments.iter().enumerate() {
        index.entry(comment.id).or_insert(position);
    }

    let mut parents: Vec<Option<usize>> = comments
        .iter()
        .map(|comment| {
            comment
                .parent_id
                .and_then(|parent_id| index.get(&parent_id).copied())
        })
        .collect();
    break_cycles(&comments, &mut parents);

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); len];
    let mut roots = Vec::new();
    for (position, parent) in parents.iter().enumerate() {
        match parent {
            Some(parent) => children[*parent].push(position),
            None => roots.push(position),
        }
    }

    // Pre-order from the roots, reversed: every child precedes its parent.
    let mut order = Vec::with_capacity(len);
    let mut stack = roots.clone();
    while let Some(position) = stack.pop() {
        order.push(position);
        stack.extend_from_slice(&children[position]);
    }
    order.reverse();

    let mut pending: Vec<Option<Comment>> = comments.into_iter().map(Some).collect();
    let mut built: Vec<Option<ThreadNode>> = std::iter::repeat_with(|| None).take(len).collect();

    for position in order {
        let Some(comment) = pending[position].take() else {
            continue;
        };

        let mut replies: Vec<ThreadNode> = std::mem::take(&mut children[position])
            .into_iter()
            .filter_map(|child| built[child].take())
            .collect();
        sort_siblings(&mut replies);

        built[position] = Some(ThreadNode { comment, replies });
    }

    let mut forest: Vec<ThreadNode> = roots
        .into_iter()
        .filter_map(|root| built[root].take())
        .collect();
    sort_siblings(&mut forest);
    forest
}

/// Cuts every loop in the parent links, turning `parents` into a forest.
///
/// Each position is walked at most once, so this stays linear.
fn break_cycles(comments: &[Comment], parents: &mut [Option<usize>]) {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; parents.len()];
    let mut path = Vec::new();

    for start in 0..parents.len() {
        let mut current = start;
        loop {
            match marks[current] {
                Mark::Unvisited => {
                    marks[current] = Mark::OnPath;
                    path.push(current);
                    match parents[current] {
                        Some(parent) => current = parent,
                        None => break,
                    }
                }
                Mark::OnPath => {
                    // `current` closes a loop over the tail of `path`.
                    if let Some(begin) = path.iter().rposition(|&p| p == current) {
                        let cut = path[begin..]
                            .iter()
                            .copied()
                            .min_by_key(|&p| (comments[p].id, p));
                        if let Some(cut) = cut {
                            parents[cut] = None;
                        }
                    }
                    break;
                }
                Mark::Done => break,
            }
        }

        for position in path.drain(..) {
            marks[position] = Mark::Done;
        }
    }
}

fn sort_siblings(nodes: &mut [ThreadNode]) {
    nodes.sort_by(|a, b| newest_first(&a.comment, &b.comment));
}
