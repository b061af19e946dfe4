//! Nested reply nodes.
//!
//! Threads have no depth limit, so nothing here recurses through `replies`:
//! cloning, comparing, formatting and dropping all walk the tree with an
//! explicit stack.

use std::fmt;

use crate::comment::{Comment, CommentId};

/// A comment together with its ordered replies.
pub struct ThreadNode {
    pub comment: Comment,
    pub replies: Vec<ThreadNode>,
}

impl ThreadNode {
    /// Creates a node without replies.
    pub fn new(comment: Comment) -> Self {
        Self {
            comment,
            replies: Vec::new(),
        }
    }

    /// Returns the id of the comment at this node.
    #[inline]
    pub fn id(&self) -> CommentId {
        self.comment.id
    }

    /// Counts this node and all of its descendants.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Returns the number of levels below and including this node.
    pub fn depth(&self) -> usize {
        self.iter().map(|(depth, _)| depth + 1).max().unwrap_or(1)
    }

    /// Walks the subtree in pre-order, yielding each node with its depth
    /// relative to this one.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![(0, self)] }
    }

    /// Walks a whole forest in pre-order.
    pub fn iter_forest(forest: &[ThreadNode]) -> Iter<'_> {
        Iter {
            stack: forest.iter().rev().map(|node| (0, node)).collect(),
        }
    }

    /// Folds a forest bottom-up.
    ///
    /// `f` receives each comment, its depth and the already folded replies, in
    /// the same order as the replies themselves.
    pub fn fold_forest<T>(
        forest: &[ThreadNode],
        mut f: impl FnMut(&Comment, usize, Vec<T>) -> T,
    ) -> Vec<T> {
        struct Frame<'a, T> {
            node: &'a ThreadNode,
            depth: usize,
            next: usize,
            folded: Vec<T>,
        }

        let mut output = Vec::with_capacity(forest.len());
        for root in forest {
            let mut stack = vec![Frame {
                node: root,
                depth: 0,
                next: 0,
                folded: Vec::with_capacity(root.replies.len()),
            }];

            while let Some(frame) = stack.last_mut() {
                let node: &ThreadNode = frame.node;
                if let Some(child) = node.replies.get(frame.next) {
                    frame.next += 1;
                    let depth = frame.depth + 1;
                    stack.push(Frame {
                        node: child,
                        depth,
                        next: 0,
                        folded: Vec::with_capacity(child.replies.len()),
                    });
                    continue;
                }

                let Some(done) = stack.pop() else { break };
                let value = f(&done.node.comment, done.depth, done.folded);
                match stack.last_mut() {
                    Some(parent) => parent.folded.push(value),
                    None => output.push(value),
                }
            }
        }

        output
    }
}

impl Clone for ThreadNode {
    fn clone(&self) -> Self {
        let mut cloned = Self::fold_forest(std::slice::from_ref(self), |comment, _, replies| {
            ThreadNode {
                comment: comment.clone(),
                replies,
            }
        });

        match cloned.pop() {
            Some(node) => node,
            None => Self::new(self.comment.clone()),
        }
    }
}

impl PartialEq for ThreadNode {
    fn eq(&self, other: &Self) -> bool {
        // Pre-order with depths pins down the shape of the tree.
        let mut left = self.iter();
        let mut right = other.iter();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some((a_depth, a)), Some((b_depth, b))) => {
                    if a_depth != b_depth || a.comment != b.comment {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }
}

impl Eq for ThreadNode {}

impl fmt::Debug for ThreadNode {
    /// Formats the subtree as a flat pre-order list of `(depth, comment)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|(depth, node)| (depth, &node.comment)))
            .finish()
    }
}

impl Drop for ThreadNode {
    fn drop(&mut self) {
        // Unlink descendants first so dropping a long chain does not recurse.
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.replies);
        }
    }
}

/// Pre-order iterator over a thread.
#[derive(Debug)]
pub struct Iter<'a> {
    stack: Vec<(usize, &'a ThreadNode)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a ThreadNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.replies.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::comment::{Target, UserId};

    fn comment(id: i64, parent: Option<i64>) -> Comment {
        Comment {
            id: CommentId(id),
            target: Target::Vehicle(1),
            author_id: UserId(1),
            author_name: "alice".into(),
            parent_id: parent.map(CommentId),
            body: format!("comment {id}"),
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn chain(len: i64) -> ThreadNode {
        let mut node = ThreadNode::new(comment(len, Some(len - 1)));
        for id in (1..len).rev() {
            let mut parent = ThreadNode::new(comment(id, (id > 1).then_some(id - 1)));
            parent.replies.push(node);
            node = parent;
        }
        node
    }

    #[test]
    fn iterates_in_pre_order() {
        let mut root = ThreadNode::new(comment(1, None));
        let mut first = ThreadNode::new(comment(2, Some(1)));
        first.replies.push(ThreadNode::new(comment(4, Some(2))));
        root.replies.push(first);
        root.replies.push(ThreadNode::new(comment(3, Some(1))));

        let visited: Vec<(usize, i64)> = root.iter().map(|(d, n)| (d, n.id().0)).collect();
        assert_eq!(visited, vec![(0, 1), (1, 2), (2, 4), (1, 3)]);
        assert_eq!(root.node_count(), 4);
        assert_eq!(root.depth(), 3);
    }

    #[test]
    fn fold_sees_children_before_parents() {
        let mut root = ThreadNode::new(comment(1, None));
        root.replies.push(ThreadNode::new(comment(2, Some(1))));
        root.replies.push(ThreadNode::new(comment(3, Some(1))));
        let forest = vec![root, ThreadNode::new(comment(5, None))];

        let rendered = ThreadNode::fold_forest(&forest, |comment, depth, replies: Vec<String>| {
            format!("{}@{}[{}]", comment.id, depth, replies.join(","))
        });

        assert_eq!(rendered, vec!["1@0[2@1[],3@1[]]", "5@0[]"]);
    }

    #[test]
    fn deep_chain_is_stack_safe() {
        let root = chain(200_000);
        assert_eq!(root.node_count(), 200_000);
        assert_eq!(root.depth(), 200_000);

        let deepest = ThreadNode::fold_forest(std::slice::from_ref(&root), |_, depth, below: Vec<usize>| {
            below.into_iter().max().unwrap_or(depth)
        });
        assert_eq!(deepest, vec![199_999]);

        let copy = root.clone();
        assert!(copy == root);
        assert_eq!(copy.node_count(), 200_000);

        let rendered = format!("{root:?}");
        assert!(rendered.starts_with("[(0, "));

        drop(copy);
        drop(root);
    }

    #[test]
    fn equality_follows_shape() {
        let mut nested = ThreadNode::new(comment(1, None));
        let mut middle = ThreadNode::new(comment(2, Some(1)));
        middle.replies.push(ThreadNode::new(comment(3, Some(2))));
        nested.replies.push(middle);

        let mut flat = ThreadNode::new(comment(1, None));
        flat.replies.push(ThreadNode::new(comment(2, Some(1))));
        flat.replies.push(ThreadNode::new(comment(3, Some(2))));

        assert_ne!(nested, flat);
        assert_eq!(nested.clone(), nested);
    }
}
