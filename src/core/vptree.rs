//! Vantage-point tree for nearest-neighbor queries
//!
//! Built once from a fixed point set and an integer metric, then queried
//! read-only. Every node splits the points below it at the median distance
//! from its pivot, so partitions stay balanced regardless of how the points
//! are laid out in space. Queries use the triangle inequality to skip
//! partitions that cannot hold anything closer than the best match so far.
//!
//! Used to score route risk: the points are the doubled-grid midpoints of
//! blocked streets and the metric is Manhattan distance.

use butterfly_common::{Error, Result};

use crate::core::grid::Coord;

/// Distance reported by [`VpTree::nearest`] when the tree is empty
pub const NO_DISTANCE: u64 = u64::MAX;

/// A distance function over points of type `P`
pub trait Metric<P> {
    fn distance(&self, a: &P, b: &P) -> u64;
}

impl<P, F> Metric<P> for F
where
    F: Fn(&P, &P) -> u64,
{
    fn distance(&self, a: &P, b: &P) -> u64 {
        self(a, b)
    }
}

/// Manhattan distance between grid coordinates
#[derive(Debug, Clone, Copy, Default)]
pub struct Manhattan;

impl Metric<Coord> for Manhattan {
    fn distance(&self, a: &Coord, b: &Coord) -> u64 {
        a.manhattan(*b)
    }
}

struct VpNode<P> {
    pivot: P,
    radius: u64,
    inside: Option<Box<VpNode<P>>>,
    outside: Option<Box<VpNode<P>>>,
}

impl<P> VpNode<P> {
    fn is_leaf(&self) -> bool {
        self.inside.is_none() && self.outside.is_none()
    }
}

/// Static nearest-neighbor index
pub struct VpTree<P, M> {
    root: Option<Box<VpNode<P>>>,
    metric: M,
    len: usize,
}

impl<P, M> Drop for VpTree<P, M> {
    // Unlink nodes one by one so a degenerate, list-like tree does not
    // recurse through nested boxes.
    fn drop(&mut self) {
        let mut stack: Vec<Box<VpNode<P>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.inside.take());
            stack.extend(node.outside.take());
        }
    }
}

/// Explicit-stack frame for the query loop. `Deferred` holds the partition
/// that was not visited first, together with what is needed to decide later
/// whether it can still contain a closer point.
enum Frame<'a, P> {
    Visit(&'a VpNode<P>),
    Deferred {
        node: &'a VpNode<P>,
        distance: u64,
        radius: u64,
        outside: bool,
    },
}

/// Node under construction. Children are indices into the build arena and
/// always come after their parent.
struct PendingNode<P> {
    pivot: P,
    radius: u64,
    inside: Option<usize>,
    outside: Option<usize>,
}

impl<P, M: Metric<P>> VpTree<P, M> {
    /// Build the tree. Point order only affects which points become pivots.
    ///
    /// Points at distance 0 from a pivot are folded into that pivot: they
    /// can never be strictly closer to a query, so nearest distances are
    /// unchanged and a multiset full of duplicates stays shallow.
    pub fn build(points: Vec<P>, metric: M) -> Self {
        let len = points.len();
        let root = Self::build_root(points, &metric);
        Self { root, metric, len }
    }

    fn build_root(points: Vec<P>, metric: &M) -> Option<Box<VpNode<P>>> {
        let mut arena: Vec<PendingNode<P>> = Vec::new();
        // (points, parent index, goes to the parent's outside slot)
        let mut jobs: Vec<(Vec<P>, Option<(usize, bool)>)> = vec![(points, None)];

        while let Some((mut points, parent)) = jobs.pop() {
            let Some(pivot) = points.pop() else {
                continue;
            };
            let idx = arena.len();
            if let Some((parent, outside)) = parent {
                let slot = &mut arena[parent];
                if outside {
                    slot.outside = Some(idx);
                } else {
                    slot.inside = Some(idx);
                }
            }

            let mut by_distance: Vec<(u64, P)> = points
                .into_iter()
                .map(|p| (metric.distance(&pivot, &p), p))
                .filter(|(d, _)| *d > 0)
                .collect();
            if by_distance.is_empty() {
                arena.push(PendingNode {
                    pivot,
                    radius: 0,
                    inside: None,
                    outside: None,
                });
                continue;
            }

            by_distance.sort_by_key(|(d, _)| *d);
            let radius = by_distance[by_distance.len() / 2].0;
            let (inside, outside): (Vec<_>, Vec<_>) =
                by_distance.into_iter().partition(|(d, _)| *d <= radius);

            arena.push(PendingNode {
                pivot,
                radius,
                inside: None,
                outside: None,
            });
            jobs.push((outside.into_iter().map(|(_, p)| p).collect(), Some((idx, true))));
            jobs.push((inside.into_iter().map(|(_, p)| p).collect(), Some((idx, false))));
        }

        // children sit at higher indices, so assembling from the back always
        // finds them already boxed
        let mut built: Vec<Option<Box<VpNode<P>>>> = Vec::with_capacity(arena.len());
        built.resize_with(arena.len(), || None);
        while let Some(pending) = arena.pop() {
            let idx = arena.len();
            let inside = pending.inside.and_then(|c| built[c].take());
            let outside = pending.outside.and_then(|c| built[c].take());
            built[idx] = Some(Box::new(VpNode {
                pivot: pending.pivot,
                radius: pending.radius,
                inside,
                outside,
            }));
        }
        built.into_iter().next().flatten()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Closest indexed point to `query` and its distance.
    ///
    /// Returns `(None, NO_DISTANCE)` on an empty tree. Among equidistant
    /// points any one may be returned.
    pub fn nearest(&self, query: &P) -> (Option<&P>, u64) {
        let Some(root) = self.root.as_deref() else {
            return (None, NO_DISTANCE);
        };

        let mut best_point: Option<&P> = None;
        let mut best = NO_DISTANCE;
        let mut stack = vec![Frame::Visit(root)];

        while let Some(frame) = stack.pop() {
            let node = match frame {
                Frame::Visit(node) => node,
                Frame::Deferred {
                    node,
                    distance,
                    radius,
                    outside,
                } => {
                    let reachable = if outside {
                        distance.saturating_add(best) > radius
                    } else {
                        distance.saturating_sub(best) <= radius
                    };
                    if !reachable {
                        continue;
                    }
                    node
                }
            };

            let d = self.metric.distance(query, &node.pivot);
            if d < best {
                best = d;
                best_point = Some(&node.pivot);
            }
            if node.is_leaf() {
                continue;
            }

            let (first, second, second_is_outside) = if d <= node.radius {
                (node.inside.as_deref(), node.outside.as_deref(), true)
            } else {
                (node.outside.as_deref(), node.inside.as_deref(), false)
            };

            // LIFO: the deferred partition is pushed first so it is examined
            // only after the whole first partition has been searched.
            if let Some(second) = second {
                stack.push(Frame::Deferred {
                    node: second,
                    distance: d,
                    radius: node.radius,
                    outside: second_is_outside,
                });
            }
            if let Some(first) = first {
                stack.push(Frame::Visit(first));
            }
        }

        (best_point, best)
    }

    /// Like [`nearest`](Self::nearest) but treats an empty tree as misuse
    pub fn nearest_point(&self, query: &P) -> Result<(&P, u64)> {
        match self.nearest(query) {
            (Some(p), d) => Ok((p, d)),
            (None, _) => Err(Error::EmptyStructure("proximity index")),
        }
    }
}
