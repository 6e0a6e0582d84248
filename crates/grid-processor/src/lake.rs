//! Removal of disconnected wet bodies.
//!
//! Wet cells are labelled by 4-connected flood fill (wrapping in longitude on
//! global grids). Depending on the tolerance the smaller bodies are dried.

use std::collections::VecDeque;

use gridgen_common::GridField;
use serde::Serialize;
use tracing::{debug, info};

/// Connected-component labelling of the wet mask.
#[derive(Debug, Clone, Serialize)]
pub struct LakeResult {
    /// `-1` for dry cells, otherwise the 1-based body number. Cells dried by
    /// this pass are reset to `-1`.
    pub label: GridField<i32>,
    /// Cell count per body; `sizes[b - 1]` belongs to label `b`.
    pub sizes: Vec<usize>,
    /// Labels of the bodies that were dried.
    pub removed: Vec<i32>,
}

impl LakeResult {
    pub fn num_bodies(&self) -> usize {
        self.sizes.len()
    }
}

/// Bodies to dry under `lake_tol`.
///
/// Negative keeps only the largest body (the first found wins a tie), zero
/// keeps everything, positive dries bodies with fewer cells than the tolerance.
fn bodies_to_remove(sizes: &[usize], lake_tol: i64) -> Vec<i32> {
    if lake_tol == 0 || sizes.is_empty() {
        return Vec::new();
    }
    if lake_tol < 0 {
        let mut largest = 0;
        for (i, &s) in sizes.iter().enumerate() {
            if s > sizes[largest] {
                largest = i;
            }
        }
        return (0..sizes.len())
            .filter(|&i| i != largest)
            .map(|i| i as i32 + 1)
            .collect();
    }
    sizes
        .iter()
        .enumerate()
        .filter(|&(_, &s)| (s as i64) < lake_tol)
        .map(|(i, _)| i as i32 + 1)
        .collect()
}

/// Label wet bodies in `mask` and dry the ones `lake_tol` rejects.
pub fn remove_lake(mask: &mut GridField<u8>, lake_tol: i64, is_global: bool) -> LakeResult {
    let (nx, ny) = (mask.nx, mask.ny);
    // 0 unvisited wet, -1 dry
    let mut label = mask.map(|&m| i32::from(m) - 1);
    let mut sizes = Vec::new();
    let mut queue = VecDeque::new();

    for k in 0..ny {
        for j in 0..nx {
            if label[(k, j)] != 0 {
                continue;
            }
            let id = sizes.len() as i32 + 1;
            let mut size = 0usize;
            label[(k, j)] = id;
            queue.push_back((k, j));

            while let Some((ck, cj)) = queue.pop_front() {
                size += 1;
                let mut neighbors = [None; 4];
                if ck > 0 {
                    neighbors[0] = Some((ck - 1, cj));
                }
                if ck + 1 < ny {
                    neighbors[1] = Some((ck + 1, cj));
                }
                if cj > 0 {
                    neighbors[2] = Some((ck, cj - 1));
                } else if is_global && nx > 1 {
                    neighbors[2] = Some((ck, nx - 1));
                }
                if cj + 1 < nx {
                    neighbors[3] = Some((ck, cj + 1));
                } else if is_global && nx > 1 {
                    neighbors[3] = Some((ck, 0));
                }
                for (nk, nj) in neighbors.into_iter().flatten() {
                    if label[(nk, nj)] == 0 {
                        label[(nk, nj)] = id;
                        queue.push_back((nk, nj));
                    }
                }
            }
            debug!(body = id, size, "Wet body labelled");
            sizes.push(size);
        }
    }

    let removed = bodies_to_remove(&sizes, lake_tol);
    let mut dried = 0usize;
    if !removed.is_empty() {
        let mut drop = vec![false; sizes.len() + 1];
        for &id in &removed {
            drop[id as usize] = true;
        }
        for (l, m) in label.data.iter_mut().zip(mask.data.iter_mut()) {
            if *l > 0 && drop[*l as usize] {
                *l = -1;
                *m = 0;
                dried += 1;
            }
        }
    }

    info!(
        bodies = sizes.len(),
        removed = removed.len(),
        dried,
        lake_tol,
        "Wet bodies processed"
    );
    LakeResult {
        label,
        sizes,
        removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(nx: usize, rows: &[&[u8]]) -> GridField<u8> {
        GridField::from_vec(nx, rows.len(), rows.concat()).unwrap()
    }

    #[test]
    fn test_labels_and_sizes() {
        let mut mask = field(5, &[&[1, 1, 0, 1, 0], &[1, 0, 0, 1, 0], &[0, 0, 0, 0, 1]]);
        let result = remove_lake(&mut mask, 0, false);
        assert_eq!(result.sizes, vec![3, 2, 1]);
        assert_eq!(result.label.row(0), &[1, 1, -1, 2, -1]);
        assert_eq!(result.label.row(2), &[-1, -1, -1, -1, 3]);
        assert!(result.removed.is_empty());
    }

    #[test]
    fn test_negative_tolerance_keeps_largest() {
        let mut mask = field(5, &[&[1, 1, 0, 1, 0], &[1, 0, 0, 1, 0], &[0, 0, 0, 0, 1]]);
        let result = remove_lake(&mut mask, -1, false);
        assert_eq!(result.removed, vec![2, 3]);
        assert_eq!(mask.data.iter().filter(|&&m| m == 1).count(), 3);
        assert_eq!(result.label[(0, 3)], -1);
    }

    #[test]
    fn test_positive_tolerance() {
        let mut mask = field(5, &[&[1, 1, 0, 1, 0], &[1, 0, 0, 1, 0], &[0, 0, 0, 0, 1]]);
        let result = remove_lake(&mut mask, 2, false);
        assert_eq!(result.removed, vec![3]);
        assert_eq!(mask[(2, 4)], 0);
        assert_eq!(mask[(0, 3)], 1);
    }

    #[test]
    fn test_global_wrap_joins_edges() {
        let mut mask = field(4, &[&[1, 0, 0, 1]]);
        let regional = remove_lake(&mut mask.clone(), 0, false);
        assert_eq!(regional.num_bodies(), 2);
        let global = remove_lake(&mut mask, 0, true);
        assert_eq!(global.num_bodies(), 1);
        assert_eq!(global.sizes, vec![2]);
    }

    #[test]
    fn test_tie_keeps_first_body() {
        assert_eq!(bodies_to_remove(&[2, 2, 1], -1), vec![2, 3]);
        assert!(bodies_to_remove(&[], -1).is_empty());
    }
}
