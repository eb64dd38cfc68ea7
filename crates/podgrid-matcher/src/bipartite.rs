//! Maximum bipartite assignment by augmenting paths (Kuhn's algorithm).
//!
//! Requested items are the left side, available items the right side. Two
//! identical requests are still two distinct left nodes and must be
//! assigned two distinct available items.

/// Compute a maximum assignment. Entry `i` of the result is the index of the
/// available item assigned to requested item `i`, if any.
pub fn maximum_assignment(
    requested: usize,
    available: usize,
    mut compatible: impl FnMut(usize, usize) -> bool,
) -> Vec<Option<usize>> {
    let edges: Vec<Vec<usize>> = (0..requested)
        .map(|r| (0..available).filter(|&a| compatible(r, a)).collect())
        .collect();

    let mut owner: Vec<Option<usize>> = vec![None; available];
    for r in 0..requested {
        let mut visited = vec![false; available];
        augment(r, &edges, &mut visited, &mut owner);
    }

    let mut assignment = vec![None; requested];
    for (a, r) in owner.iter().enumerate() {
        if let Some(r) = r {
            assignment[*r] = Some(a);
        }
    }
    assignment
}

/// Whether every requested item can be assigned a distinct compatible
/// available item.
pub fn is_saturating(
    requested: usize,
    available: usize,
    compatible: impl FnMut(usize, usize) -> bool,
) -> bool {
    if requested == 0 {
        return true;
    }
    if requested > available {
        return false;
    }
    maximum_assignment(requested, available, compatible)
        .iter()
        .all(Option::is_some)
}

fn augment(r: usize, edges: &[Vec<usize>], visited: &mut [bool], owner: &mut [Option<usize>]) -> bool {
    for &a in &edges[r] {
        if visited[a] {
            continue;
        }
        visited[a] = true;
        let free = match owner[a] {
            None => true,
            Some(holder) => augment(holder, edges, visited, owner),
        };
        if free {
            owner[a] = Some(r);
            return true;
        }
    }
    false
}
